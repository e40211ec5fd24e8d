use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, Type};
use std::fmt;

/// Lifecycle of an abstract submission. Mutated only by the workflow engine;
/// `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AbstractStatus {
    Submitted,
    AssignedToEditor,
    ReviewedByEditor,
    AssignedToConferenceEditor,
    ReviewedByConferenceEditor,
    Accepted,
    Rejected,
}

impl AbstractStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AbstractStatus::Accepted | AbstractStatus::Rejected)
    }
}

impl fmt::Display for AbstractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbstractStatus::Submitted => "Submitted",
            AbstractStatus::AssignedToEditor => "Assigned to Editor",
            AbstractStatus::ReviewedByEditor => "Reviewed by Editor",
            AbstractStatus::AssignedToConferenceEditor => "Assigned to Conference Editor",
            AbstractStatus::ReviewedByConferenceEditor => "Reviewed by Conference Editor",
            AbstractStatus::Accepted => "Accepted",
            AbstractStatus::Rejected => "Rejected",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AbstractSubmission {
    pub id: i64,
    pub conference_id: i64,
    pub author_id: i64,
    pub title: Option<String>,
    pub abstract_file: String,
    pub status: AbstractStatus,
    pub current_editor_id: Option<i64>,
    pub current_conference_editor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateAbstractSubmission {
    pub conference_id: i64,
    pub author_id: i64,
    pub title: Option<String>,
    pub abstract_file: String,
}

impl AbstractSubmission {
    pub async fn insert(
        conn: &mut SqliteConnection,
        data: CreateAbstractSubmission,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            INSERT INTO abstract_submissions
                (conference_id, author_id, title, abstract_file, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(data.conference_id)
        .bind(data.author_id)
        .bind(&data.title)
        .bind(&data.abstract_file)
        .bind(AbstractStatus::Submitted)
        .bind(now)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(
        ex: impl SqliteExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"SELECT * FROM abstract_submissions WHERE id = ?1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(ex)
        .await
    }

    pub async fn find_by_conference_and_author(
        ex: impl SqliteExecutor<'_>,
        conference_id: i64,
        author_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            SELECT * FROM abstract_submissions
            WHERE conference_id = ?1 AND author_id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(conference_id)
        .bind(author_id)
        .fetch_optional(ex)
        .await
    }

    pub async fn list_by_conference(
        ex: impl SqliteExecutor<'_>,
        conference_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            SELECT * FROM abstract_submissions
            WHERE conference_id = ?1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(conference_id)
        .fetch_all(ex)
        .await
    }

    pub async fn list_by_author(
        ex: impl SqliteExecutor<'_>,
        author_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            SELECT * FROM abstract_submissions
            WHERE author_id = ?1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(ex)
        .await
    }

    pub async fn list_accepted_by_author(
        ex: impl SqliteExecutor<'_>,
        author_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            SELECT * FROM abstract_submissions
            WHERE author_id = ?1 AND status = ?2 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .bind(AbstractStatus::Accepted)
        .fetch_all(ex)
        .await
    }

    /// Abstracts an editor is responsible for: current editor at either stage
    /// while that stage is in flight, plus rejected abstracts the editor
    /// handled at any stage.
    pub async fn list_assigned_to_editor(
        ex: impl SqliteExecutor<'_>,
        editor_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            SELECT s.* FROM abstract_submissions s
            WHERE s.deleted_at IS NULL
              AND (
                (s.current_editor_id = ?1 AND s.status IN (?2, ?3))
                OR (s.current_conference_editor_id = ?1 AND s.status IN (?4, ?5))
                OR (s.status = ?6 AND EXISTS (
                    SELECT 1 FROM abstract_assignments a
                    WHERE a.abstract_id = s.id
                      AND a.editor_id = ?1
                      AND a.deleted_at IS NULL
                ))
              )
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(editor_id)
        .bind(AbstractStatus::AssignedToEditor)
        .bind(AbstractStatus::ReviewedByEditor)
        .bind(AbstractStatus::AssignedToConferenceEditor)
        .bind(AbstractStatus::ReviewedByConferenceEditor)
        .bind(AbstractStatus::Rejected)
        .fetch_all(ex)
        .await
    }

    /// Guarded status change. The `from` check makes concurrent transitions
    /// race-safe: the loser matches zero rows and gets `None` back.
    pub async fn transition_status(
        conn: &mut SqliteConnection,
        id: i64,
        from: AbstractStatus,
        to: AbstractStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractSubmission>(
            r#"
            UPDATE abstract_submissions
            SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await
    }

    pub async fn set_current_editor(
        conn: &mut SqliteConnection,
        id: i64,
        editor_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE abstract_submissions SET current_editor_id = ?2, updated_at = ?3 WHERE id = ?1"#,
        )
        .bind(id)
        .bind(editor_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn set_current_conference_editor(
        conn: &mut SqliteConnection,
        id: i64,
        editor_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE abstract_submissions SET current_conference_editor_id = ?2, updated_at = ?3 WHERE id = ?1"#,
        )
        .bind(id)
        .bind(editor_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;
        Ok(())
    }
}
