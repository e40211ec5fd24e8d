use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

/// Post-acceptance file intake. Rows are append-only; re-uploads add new rows
/// rather than replacing earlier ones.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FullPaperFile {
    pub id: i64,
    pub abstract_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_path: String,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateFullPaperFile {
    pub abstract_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_path: String,
    pub uploaded_by: i64,
}

impl FullPaperFile {
    pub async fn insert(
        conn: &mut SqliteConnection,
        data: CreateFullPaperFile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FullPaperFile>(
            r#"
            INSERT INTO full_paper_files
                (abstract_id, file_name, file_type, file_path, uploaded_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(data.abstract_id)
        .bind(&data.file_name)
        .bind(&data.file_type)
        .bind(&data.file_path)
        .bind(data.uploaded_by)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    pub async fn list_by_abstract(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FullPaperFile>(
            r#"
            SELECT * FROM full_paper_files
            WHERE abstract_id = ?1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(abstract_id)
        .fetch_all(ex)
        .await
    }
}
