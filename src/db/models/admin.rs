use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateAdmin {
    pub name: String,
    pub email: String,
}

impl Admin {
    pub async fn create(conn: &mut SqliteConnection, data: CreateAdmin) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (name, email, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(
        ex: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(r#"SELECT * FROM admins WHERE id = ?1 AND deleted_at IS NULL"#)
            .bind(id)
            .fetch_optional(ex)
            .await
    }
}
