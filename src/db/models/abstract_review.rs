use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, Type};
use std::fmt;

use super::abstract_submission::AbstractStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewerType {
    Editor,
    ConferenceEditor,
    Admin,
}

impl fmt::Display for ReviewerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewerType::Editor => write!(f, "editor"),
            ReviewerType::ConferenceEditor => write!(f, "conference_editor"),
            ReviewerType::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Accepted,
    Rejected,
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Accepted => write!(f, "accepted"),
            ReviewDecision::Rejected => write!(f, "rejected"),
        }
    }
}

/// One row per review action, immutable once written. `assignment_id` is
/// NULL for the admin's final decision, which has no assignment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AbstractReview {
    pub id: i64,
    pub abstract_id: i64,
    pub assignment_id: Option<i64>,
    pub reviewer_type: ReviewerType,
    pub reviewer_id: i64,
    pub decision: ReviewDecision,
    pub comment: String,
    pub status_before: AbstractStatus,
    pub status_after: AbstractStatus,
    pub reviewed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CreateReview {
    pub abstract_id: i64,
    pub assignment_id: Option<i64>,
    pub reviewer_type: ReviewerType,
    pub reviewer_id: i64,
    pub decision: ReviewDecision,
    pub comment: String,
    pub status_before: AbstractStatus,
    pub status_after: AbstractStatus,
}

impl AbstractReview {
    pub async fn insert(
        conn: &mut SqliteConnection,
        data: CreateReview,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, AbstractReview>(
            r#"
            INSERT INTO abstract_reviews
                (abstract_id, assignment_id, reviewer_type, reviewer_id, decision,
                 comment, status_before, status_after, reviewed_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING *
            "#,
        )
        .bind(data.abstract_id)
        .bind(data.assignment_id)
        .bind(data.reviewer_type)
        .bind(data.reviewer_id)
        .bind(data.decision)
        .bind(&data.comment)
        .bind(data.status_before)
        .bind(data.status_after)
        .bind(now)
        .fetch_one(conn)
        .await
    }

    pub async fn find_latest_by_type(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
        reviewer_type: ReviewerType,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractReview>(
            r#"
            SELECT * FROM abstract_reviews
            WHERE abstract_id = ?1 AND reviewer_type = ?2 AND deleted_at IS NULL
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(abstract_id)
        .bind(reviewer_type)
        .fetch_optional(ex)
        .await
    }

    pub async fn list_by_abstract(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractReview>(
            r#"
            SELECT * FROM abstract_reviews
            WHERE abstract_id = ?1 AND deleted_at IS NULL
            ORDER BY reviewed_at ASC, id ASC
            "#,
        )
        .bind(abstract_id)
        .fetch_all(ex)
        .await
    }
}
