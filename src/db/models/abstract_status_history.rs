use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, Type};

use super::abstract_submission::AbstractStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChangedByType {
    System,
    Admin,
    Editor,
    ConferenceEditor,
    Author,
}

/// Append-only ledger of status changes. Rows are written in the same
/// transaction as the status mutation they record, exactly one per change.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AbstractStatusHistory {
    pub id: i64,
    pub abstract_id: i64,
    pub status_from: Option<AbstractStatus>,
    pub status_to: AbstractStatus,
    pub changed_by_type: ChangedByType,
    pub changed_by_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub review_id: Option<i64>,
    pub remarks: Option<String>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewStatusHistory {
    pub abstract_id: i64,
    pub status_from: Option<AbstractStatus>,
    pub status_to: AbstractStatus,
    pub changed_by_type: ChangedByType,
    pub changed_by_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub review_id: Option<i64>,
    pub remarks: Option<String>,
}

impl AbstractStatusHistory {
    pub async fn append(
        conn: &mut SqliteConnection,
        entry: NewStatusHistory,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AbstractStatusHistory>(
            r#"
            INSERT INTO abstract_status_history
                (abstract_id, status_from, status_to, changed_by_type, changed_by_id,
                 assignment_id, review_id, remarks, changed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING *
            "#,
        )
        .bind(entry.abstract_id)
        .bind(entry.status_from)
        .bind(entry.status_to)
        .bind(entry.changed_by_type)
        .bind(entry.changed_by_id)
        .bind(entry.assignment_id)
        .bind(entry.review_id)
        .bind(&entry.remarks)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    pub async fn list_by_abstract(
        ex: impl SqliteExecutor<'_>,
        abstract_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AbstractStatusHistory>(
            r#"
            SELECT * FROM abstract_status_history
            WHERE abstract_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(abstract_id)
        .fetch_all(ex)
        .await
    }
}
