use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::models::admin::{Admin, CreateAdmin};
use super::models::author::{Author, CreateAuthor};
use super::models::conference::{Conference, CreateConference};
use super::models::editor::{CreateEditor, Editor};
use super::DbPool;

/// In-memory pool bootstrapped with the real migrations. A single connection
/// keeps every query on the same database.
pub(crate) async fn setup_test_pool() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("invalid sqlite config")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to open sqlite memory db");

    super::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    Arc::new(pool)
}

pub(crate) async fn seed_conference(pool: &DbPool) -> Conference {
    let mut conn = pool.acquire().await.expect("acquire");
    Conference::create(
        &mut conn,
        CreateConference {
            name: "International Methods Conference".into(),
            organized_by: "Methods Society".into(),
            start_date: "2026-11-02".into(),
        },
    )
    .await
    .expect("failed to seed conference")
}

pub(crate) async fn seed_author(pool: &DbPool, email: &str) -> Author {
    let mut conn = pool.acquire().await.expect("acquire");
    Author::create(
        &mut conn,
        CreateAuthor {
            first_name: "Ada".into(),
            last_name: "Wells".into(),
            email: email.into(),
        },
    )
    .await
    .expect("failed to seed author")
}

pub(crate) async fn seed_admin(pool: &DbPool) -> Admin {
    let mut conn = pool.acquire().await.expect("acquire");
    Admin::create(
        &mut conn,
        CreateAdmin {
            name: "Site Admin".into(),
            email: "admin@example.org".into(),
        },
    )
    .await
    .expect("failed to seed admin")
}

pub(crate) async fn seed_editor(pool: &DbPool, email: &str) -> Editor {
    let mut conn = pool.acquire().await.expect("acquire");
    Editor::create(
        &mut conn,
        CreateEditor {
            first_name: "Ed".into(),
            last_name: "Reyes".into(),
            email: email.into(),
            specialization: Some("statistics".into()),
        },
    )
    .await
    .expect("failed to seed editor")
}
