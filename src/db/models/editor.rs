use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Editor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateEditor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialization: Option<String>,
}

impl Editor {
    pub async fn create(
        conn: &mut SqliteConnection,
        data: CreateEditor,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Editor>(
            r#"
            INSERT INTO editors (first_name, last_name, email, specialization, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.specialization)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(
        ex: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Editor>(r#"SELECT * FROM editors WHERE id = ?1 AND deleted_at IS NULL"#)
            .bind(id)
            .fetch_optional(ex)
            .await
    }

    /// Editors must be active to receive new assignments.
    pub async fn find_active_by_id(
        ex: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Editor>(
            r#"SELECT * FROM editors WHERE id = ?1 AND is_active = 1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(ex)
        .await
    }
}
