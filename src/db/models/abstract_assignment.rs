use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, Type};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStage {
    Editor,
    ConferenceEditor,
}

impl fmt::Display for AssignmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStage::Editor => write!(f, "editor"),
            AssignmentStage::ConferenceEditor => write!(f, "conference_editor"),
        }
    }
}

/// `Reassigned` and `Cancelled` are stored but no workflow transition
/// currently produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Reviewed,
    Reassigned,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AbstractAssignment {
    pub id: i64,
    pub abstract_id: i64,
    pub editor_id: i64,
    pub stage: AssignmentStage,
    pub assigned_by: i64,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateAssignment {
    pub abstract_id: i64,
    pub editor_id: i64,
    pub stage: AssignmentStage,
    pub assigned_by: i64,
    pub notes: Option<String>,
}

impl AbstractAssignment {
    pub async fn insert(
        conn: &mut SqliteConnection,
        data: CreateAssignment,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, AbstractAssignment>(
            r#"
            INSERT INTO abstract_assignments
                (abstract_id, editor_id, stage, assigned_by, status, assigned_at, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6)
            RETURNING *
            "#,
        )
        .bind(data.abstract_id)
        .bind(data.editor_id)
        .bind(data.stage)
        .bind(data.assigned_by)
        .bind(AssignmentStatus::Assigned)
        .bind(now)
        .bind(&data.notes)
        .fetch_one(conn)
        .await
    }

    /// The active assignment for a stage: the most recently created row still
    /// in `assigned` status.
    pub async fn find_active(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
        stage: AssignmentStage,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractAssignment>(
            r#"
            SELECT * FROM abstract_assignments
            WHERE abstract_id = ?1 AND stage = ?2 AND status = ?3 AND deleted_at IS NULL
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(abstract_id)
        .bind(stage)
        .bind(AssignmentStatus::Assigned)
        .fetch_optional(ex)
        .await
    }

    /// Latest assignment for a stage regardless of status, for hydration.
    pub async fn find_latest(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
        stage: AssignmentStage,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractAssignment>(
            r#"
            SELECT * FROM abstract_assignments
            WHERE abstract_id = ?1 AND stage = ?2 AND deleted_at IS NULL
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(abstract_id)
        .bind(stage)
        .fetch_optional(ex)
        .await
    }

    pub async fn list_by_abstract(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractAssignment>(
            r#"
            SELECT * FROM abstract_assignments
            WHERE abstract_id = ?1 AND deleted_at IS NULL
            ORDER BY assigned_at ASC, id ASC
            "#,
        )
        .bind(abstract_id)
        .fetch_all(ex)
        .await
    }

    pub async fn mark_reviewed(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AbstractAssignment>(
            r#"
            UPDATE abstract_assignments
            SET status = ?2, completed_at = ?3
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(AssignmentStatus::Reviewed)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }
}
