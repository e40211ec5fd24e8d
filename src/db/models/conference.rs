use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conference {
    pub id: i64,
    pub name: String,
    pub organized_by: String,
    pub start_date: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateConference {
    pub name: String,
    pub organized_by: String,
    pub start_date: String,
}

impl Conference {
    pub async fn create(
        conn: &mut SqliteConnection,
        data: CreateConference,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Conference>(
            r#"
            INSERT INTO conferences (name, organized_by, start_date, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.organized_by)
        .bind(&data.start_date)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(
        ex: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Conference>(
            r#"SELECT * FROM conferences WHERE id = ?1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(ex)
        .await
    }
}
