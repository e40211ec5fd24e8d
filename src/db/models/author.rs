use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateAuthor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Author {
    pub async fn create(
        conn: &mut SqliteConnection,
        data: CreateAuthor,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, email, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(
        ex: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Author>(
            r#"SELECT * FROM authors WHERE id = ?1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(ex)
        .await
    }
}
