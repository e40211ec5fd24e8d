//! Best-effort notifications fired after a workflow transaction commits.
//! Delivery transport is external; this module resolves recipients, renders
//! the message, and hands it off. A failure here is logged and never reaches
//! the caller.

use thiserror::Error;

use crate::db::models::abstract_review::ReviewDecision;
use crate::db::models::abstract_submission::AbstractSubmission;
use crate::db::models::author::Author;
use crate::db::models::editor::Editor;
use crate::db::DbPool;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("recipient for abstract {0} not found")]
    MissingRecipient(i64),
}

#[derive(Debug, Clone)]
pub enum NotificationEvent {
    AbstractSubmitted { abstract_id: i64 },
    EditorAssigned { abstract_id: i64, editor_id: i64 },
    DecisionRecorded { abstract_id: i64, decision: ReviewDecision },
}

#[derive(Clone)]
pub struct Notifier {
    pool: DbPool,
}

impl Notifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Detach delivery from the request. Must only be called after the
    /// workflow transaction has committed.
    pub fn enqueue(&self, event: NotificationEvent) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&event).await {
                tracing::error!(?event, error = %e, "notification delivery failed");
            }
        });
    }

    async fn deliver(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let pool = self.pool.as_ref();
        let (to, subject) = match event {
            NotificationEvent::AbstractSubmitted { abstract_id } => {
                let author = self.submission_author(*abstract_id).await?;
                (author.email, "Abstract received".to_string())
            }
            NotificationEvent::EditorAssigned { abstract_id, editor_id } => {
                let editor = Editor::find_by_id(pool, *editor_id)
                    .await?
                    .ok_or(NotifyError::MissingRecipient(*abstract_id))?;
                (editor.email, "New abstract assigned for review".to_string())
            }
            NotificationEvent::DecisionRecorded { abstract_id, decision } => {
                let author = self.submission_author(*abstract_id).await?;
                (author.email, format!("Your abstract has been {}", decision))
            }
        };

        tracing::info!(%to, %subject, "notification handed off");
        Ok(())
    }

    async fn submission_author(&self, abstract_id: i64) -> Result<Author, NotifyError> {
        let pool = self.pool.as_ref();
        let submission = AbstractSubmission::find_by_id(pool, abstract_id)
            .await?
            .ok_or(NotifyError::MissingRecipient(abstract_id))?;
        Author::find_by_id(pool, submission.author_id)
            .await?
            .ok_or(NotifyError::MissingRecipient(abstract_id))
    }
}
