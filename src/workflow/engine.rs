use sqlx::SqliteConnection;

use crate::db::models::abstract_assignment::{
    AbstractAssignment, AssignmentStage, CreateAssignment,
};
use crate::db::models::abstract_review::{AbstractReview, CreateReview, ReviewDecision, ReviewerType};
use crate::db::models::abstract_status_history::{
    AbstractStatusHistory, ChangedByType, NewStatusHistory,
};
use crate::db::models::abstract_submission::{
    AbstractStatus, AbstractSubmission, CreateAbstractSubmission,
};
use crate::db::models::admin::Admin;
use crate::db::models::author::Author;
use crate::db::models::conference::Conference;
use crate::db::models::editor::Editor;
use crate::db::models::full_paper_file::{CreateFullPaperFile, FullPaperFile};
use crate::db::DbPool;
use crate::storage::StoredFile;

use super::read_model::{self, AbstractDetail};
use super::transition::{self, WorkflowAction};
use super::WorkflowError;

#[derive(Debug)]
pub struct SubmitAbstract {
    pub conference_id: i64,
    pub author_id: i64,
    pub title: Option<String>,
    pub abstract_file: String,
}

/// Executes workflow actions against the store. Every action is one
/// transaction: status mutation, assignment/review writes, and the history
/// append commit together or not at all.
#[derive(Clone)]
pub struct WorkflowEngine {
    pool: DbPool,
}

impl WorkflowEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn submit(&self, input: SubmitAbstract) -> Result<AbstractSubmission, WorkflowError> {
        let pool = self.pool.as_ref();

        Author::find_by_id(pool, input.author_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Author not found".into()))?;
        Conference::find_by_id(pool, input.conference_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Conference not found".into()))?;

        if AbstractSubmission::find_by_conference_and_author(
            pool,
            input.conference_id,
            input.author_id,
        )
        .await?
        .is_some()
        {
            return Err(WorkflowError::Conflict(
                "An abstract has already been submitted for this conference.".into(),
            ));
        }

        let mut tx = pool.begin().await?;

        let submission = AbstractSubmission::insert(
            &mut tx,
            CreateAbstractSubmission {
                conference_id: input.conference_id,
                author_id: input.author_id,
                title: input.title,
                abstract_file: input.abstract_file,
            },
        )
        .await
        .map_err(duplicate_to_conflict)?;

        AbstractStatusHistory::append(
            &mut tx,
            NewStatusHistory {
                abstract_id: submission.id,
                status_from: None,
                status_to: AbstractStatus::Submitted,
                changed_by_type: ChangedByType::Author,
                changed_by_id: Some(submission.author_id),
                assignment_id: None,
                review_id: None,
                remarks: Some("Abstract submitted".into()),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            abstract_id = submission.id,
            author_id = submission.author_id,
            conference_id = submission.conference_id,
            "abstract submitted"
        );
        Ok(submission)
    }

    pub async fn assign_editor(
        &self,
        abstract_id: i64,
        editor_id: i64,
        admin_id: i64,
    ) -> Result<AbstractDetail, WorkflowError> {
        self.assign(abstract_id, editor_id, admin_id, AssignmentStage::Editor)
            .await
    }

    pub async fn assign_conference_editor(
        &self,
        abstract_id: i64,
        editor_id: i64,
        admin_id: i64,
    ) -> Result<AbstractDetail, WorkflowError> {
        self.assign(
            abstract_id,
            editor_id,
            admin_id,
            AssignmentStage::ConferenceEditor,
        )
        .await
    }

    async fn assign(
        &self,
        abstract_id: i64,
        editor_id: i64,
        admin_id: i64,
        stage: AssignmentStage,
    ) -> Result<AbstractDetail, WorkflowError> {
        let pool = self.pool.as_ref();

        Admin::find_by_id(pool, admin_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Admin not found".into()))?;
        let editor = Editor::find_active_by_id(pool, editor_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Editor not found".into()))?;

        let action = match stage {
            AssignmentStage::Editor => WorkflowAction::AssignEditor,
            AssignmentStage::ConferenceEditor => WorkflowAction::AssignConferenceEditor,
        };

        let mut tx = pool.begin().await?;

        let submission = AbstractSubmission::find_by_id(&mut *tx, abstract_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Abstract not found".into()))?;
        let next = transition::apply(submission.status, action)?;

        guarded_transition(&mut tx, abstract_id, submission.status, next).await?;

        let assignment = AbstractAssignment::insert(
            &mut tx,
            CreateAssignment {
                abstract_id,
                editor_id,
                stage,
                assigned_by: admin_id,
                notes: None,
            },
        )
        .await?;

        match stage {
            AssignmentStage::Editor => {
                AbstractSubmission::set_current_editor(&mut tx, abstract_id, editor_id).await?;
            }
            AssignmentStage::ConferenceEditor => {
                AbstractSubmission::set_current_conference_editor(&mut tx, abstract_id, editor_id)
                    .await?;
            }
        }

        AbstractStatusHistory::append(
            &mut tx,
            NewStatusHistory {
                abstract_id,
                status_from: Some(submission.status),
                status_to: next,
                changed_by_type: ChangedByType::Admin,
                changed_by_id: Some(admin_id),
                assignment_id: Some(assignment.id),
                review_id: None,
                remarks: Some(format!(
                    "Assigned to {} {} ({})",
                    editor.first_name, editor.last_name, stage
                )),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(abstract_id, editor_id, admin_id, %stage, status = %next, "editor assigned");
        read_model::load_detail(pool, abstract_id, false).await
    }

    /// Record the currently-assigned editor's decision. The stage is inferred
    /// from the abstract's status; the actor must match the current assignee
    /// for that stage.
    pub async fn review(
        &self,
        abstract_id: i64,
        editor_id: i64,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<AbstractDetail, WorkflowError> {
        if comment.trim().is_empty() {
            return Err(WorkflowError::Validation("Review comment is required.".into()));
        }

        let pool = self.pool.as_ref();
        let mut tx = pool.begin().await?;

        let submission = AbstractSubmission::find_by_id(&mut *tx, abstract_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Abstract not found".into()))?;

        let (stage, action, reviewer_type, changed_by_type) = match submission.status {
            AbstractStatus::AssignedToEditor => (
                AssignmentStage::Editor,
                WorkflowAction::EditorReview(decision),
                ReviewerType::Editor,
                ChangedByType::Editor,
            ),
            AbstractStatus::AssignedToConferenceEditor => (
                AssignmentStage::ConferenceEditor,
                WorkflowAction::ConferenceEditorReview(decision),
                ReviewerType::ConferenceEditor,
                ChangedByType::ConferenceEditor,
            ),
            other => {
                return Err(WorkflowError::InvalidTransition {
                    expected: format!(
                        "{}' or '{}",
                        AbstractStatus::AssignedToEditor,
                        AbstractStatus::AssignedToConferenceEditor
                    ),
                    actual: other.to_string(),
                })
            }
        };

        let current_assignee = match stage {
            AssignmentStage::Editor => submission.current_editor_id,
            AssignmentStage::ConferenceEditor => submission.current_conference_editor_id,
        };
        if current_assignee != Some(editor_id) {
            return Err(WorkflowError::Unauthorized(format!(
                "Editor {} is not authorized to review this abstract at the {} stage.",
                editor_id, stage
            )));
        }

        let next = transition::apply(submission.status, action)?;
        guarded_transition(&mut tx, abstract_id, submission.status, next).await?;

        let assignment = AbstractAssignment::find_active(&mut *tx, abstract_id, stage)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Active assignment not found".into()))?;
        let assignment = AbstractAssignment::mark_reviewed(&mut tx, assignment.id).await?;

        let review = AbstractReview::insert(
            &mut tx,
            CreateReview {
                abstract_id,
                assignment_id: Some(assignment.id),
                reviewer_type,
                reviewer_id: editor_id,
                decision,
                comment: comment.trim().to_string(),
                status_before: submission.status,
                status_after: next,
            },
        )
        .await?;

        AbstractStatusHistory::append(
            &mut tx,
            NewStatusHistory {
                abstract_id,
                status_from: Some(submission.status),
                status_to: next,
                changed_by_type,
                changed_by_id: Some(editor_id),
                assignment_id: Some(assignment.id),
                review_id: Some(review.id),
                remarks: Some(format!("{} review: {}", stage, decision)),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(abstract_id, editor_id, %decision, status = %next, "review recorded");
        read_model::load_detail(pool, abstract_id, false).await
    }

    /// The admin's final call on an abstract that has cleared both review
    /// stages. Rejection requires a comment; acceptance may omit it.
    pub async fn admin_decision(
        &self,
        abstract_id: i64,
        admin_id: i64,
        decision: ReviewDecision,
        comment: Option<&str>,
    ) -> Result<AbstractDetail, WorkflowError> {
        let action = WorkflowAction::AdminDecision(decision);
        let comment = comment.unwrap_or("").trim().to_string();
        if action.comment_required() && comment.is_empty() {
            return Err(WorkflowError::Validation(
                "A comment is required when rejecting an abstract.".into(),
            ));
        }

        let pool = self.pool.as_ref();
        Admin::find_by_id(pool, admin_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Admin not found".into()))?;

        let mut tx = pool.begin().await?;

        let submission = AbstractSubmission::find_by_id(&mut *tx, abstract_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Abstract not found".into()))?;
        let next = transition::apply(submission.status, action)?;

        guarded_transition(&mut tx, abstract_id, submission.status, next).await?;

        let review = AbstractReview::insert(
            &mut tx,
            CreateReview {
                abstract_id,
                assignment_id: None,
                reviewer_type: ReviewerType::Admin,
                reviewer_id: admin_id,
                decision,
                comment,
                status_before: submission.status,
                status_after: next,
            },
        )
        .await?;

        AbstractStatusHistory::append(
            &mut tx,
            NewStatusHistory {
                abstract_id,
                status_from: Some(submission.status),
                status_to: next,
                changed_by_type: ChangedByType::Admin,
                changed_by_id: Some(admin_id),
                assignment_id: None,
                review_id: Some(review.id),
                remarks: Some(format!("Final decision: {}", decision)),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(abstract_id, admin_id, %decision, status = %next, "final decision recorded");
        read_model::load_detail(pool, abstract_id, false).await
    }

    /// Attach already-persisted full-paper files to an accepted abstract.
    /// Appends rows; earlier uploads are never replaced.
    pub async fn attach_full_paper(
        &self,
        abstract_id: i64,
        author_id: i64,
        files: Vec<StoredFile>,
    ) -> Result<Vec<FullPaperFile>, WorkflowError> {
        if files.is_empty() {
            return Err(WorkflowError::Validation("At least one file is required.".into()));
        }

        let pool = self.pool.as_ref();
        let mut tx = pool.begin().await?;

        let submission = AbstractSubmission::find_by_id(&mut *tx, abstract_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Abstract not found".into()))?;

        if submission.author_id != author_id {
            return Err(WorkflowError::Unauthorized(
                "Only the submitting author may upload the full paper.".into(),
            ));
        }
        if submission.status != AbstractStatus::Accepted {
            return Err(WorkflowError::InvalidState(format!(
                "Full paper uploads require status '{}', found '{}'.",
                AbstractStatus::Accepted,
                submission.status
            )));
        }

        let mut rows = Vec::with_capacity(files.len());
        for file in files {
            rows.push(
                FullPaperFile::insert(
                    &mut tx,
                    CreateFullPaperFile {
                        abstract_id,
                        file_name: file.file_name,
                        file_type: file.file_type,
                        file_path: file.file_path,
                        uploaded_by: author_id,
                    },
                )
                .await?,
            );
        }

        tx.commit().await?;

        tracing::info!(abstract_id, author_id, count = rows.len(), "full paper files attached");
        Ok(rows)
    }
}

/// Compare-and-swap on the status column. When the guard misses (a concurrent
/// transition won), report the state the loser actually sees.
async fn guarded_transition(
    conn: &mut SqliteConnection,
    abstract_id: i64,
    from: AbstractStatus,
    to: AbstractStatus,
) -> Result<AbstractSubmission, WorkflowError> {
    match AbstractSubmission::transition_status(conn, abstract_id, from, to).await? {
        Some(submission) => Ok(submission),
        None => {
            let actual = AbstractSubmission::find_by_id(&mut *conn, abstract_id)
                .await?
                .map(|s| s.status.to_string())
                .unwrap_or_else(|| "deleted".into());
            Err(WorkflowError::InvalidTransition {
                expected: from.to_string(),
                actual,
            })
        }
    }
}

fn duplicate_to_conflict(err: sqlx::Error) -> WorkflowError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => WorkflowError::Conflict(
            "An abstract has already been submitted for this conference.".into(),
        ),
        _ => WorkflowError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{
        seed_admin, seed_author, seed_conference, seed_editor, setup_test_pool,
    };
    use crate::db::models::abstract_assignment::AssignmentStatus;

    struct Fixture {
        pool: DbPool,
        engine: WorkflowEngine,
        conference: Conference,
        author: Author,
        admin: Admin,
        editor: Editor,
        conference_editor: Editor,
    }

    async fn fixture() -> Fixture {
        let pool = setup_test_pool().await;
        let conference = seed_conference(&pool).await;
        let author = seed_author(&pool, "author@example.org").await;
        let admin = seed_admin(&pool).await;
        let editor = seed_editor(&pool, "editor@example.org").await;
        let conference_editor = seed_editor(&pool, "conf-editor@example.org").await;
        let engine = WorkflowEngine::new(pool.clone());
        Fixture {
            pool,
            engine,
            conference,
            author,
            admin,
            editor,
            conference_editor,
        }
    }

    async fn submit(fx: &Fixture) -> AbstractSubmission {
        fx.engine
            .submit(SubmitAbstract {
                conference_id: fx.conference.id,
                author_id: fx.author.id,
                title: Some("Sampling under bias".into()),
                abstract_file: "uploads/abstracts/test.pdf".into(),
            })
            .await
            .unwrap()
    }

    /// Drives an abstract through the full accept pipeline, ending Accepted.
    async fn accept_through_pipeline(fx: &Fixture) -> i64 {
        let submission = submit(fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();
        fx.engine
            .review(submission.id, fx.editor.id, ReviewDecision::Accepted, "Strong methods")
            .await
            .unwrap();
        fx.engine
            .assign_conference_editor(submission.id, fx.conference_editor.id, fx.admin.id)
            .await
            .unwrap();
        fx.engine
            .review(
                submission.id,
                fx.conference_editor.id,
                ReviewDecision::Accepted,
                "Fits the track",
            )
            .await
            .unwrap();
        fx.engine
            .admin_decision(submission.id, fx.admin.id, ReviewDecision::Accepted, None)
            .await
            .unwrap();
        submission.id
    }

    fn paper(name: &str) -> StoredFile {
        StoredFile {
            file_name: name.to_string(),
            file_type: "application/pdf".to_string(),
            file_path: format!("uploads/full_papers/{}", name),
        }
    }

    #[tokio::test]
    async fn submit_then_assign_editor() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        assert_eq!(submission.status, AbstractStatus::Submitted);

        let detail = fx
            .engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();
        assert_eq!(detail.status, AbstractStatus::AssignedToEditor);

        let stored = AbstractSubmission::find_by_id(fx.pool.as_ref(), submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AbstractStatus::AssignedToEditor);
        assert_eq!(stored.current_editor_id, Some(fx.editor.id));

        let assignments = AbstractAssignment::list_by_abstract(fx.pool.as_ref(), submission.id)
            .await
            .unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].stage, AssignmentStage::Editor);
        assert_eq!(assignments[0].status, AssignmentStatus::Assigned);

        let history = AbstractStatusHistory::list_by_abstract(fx.pool.as_ref(), submission.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status_from, None);
        assert_eq!(history[0].status_to, AbstractStatus::Submitted);
        assert_eq!(history[1].status_from, Some(AbstractStatus::Submitted));
        assert_eq!(history[1].status_to, AbstractStatus::AssignedToEditor);
    }

    #[tokio::test]
    async fn editor_accept_marks_assignment_reviewed() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();

        let detail = fx
            .engine
            .review(submission.id, fx.editor.id, ReviewDecision::Accepted, "Looks good")
            .await
            .unwrap();
        assert_eq!(detail.status, AbstractStatus::ReviewedByEditor);

        let assignments = AbstractAssignment::list_by_abstract(fx.pool.as_ref(), submission.id)
            .await
            .unwrap();
        assert_eq!(assignments[0].status, AssignmentStatus::Reviewed);
        assert!(assignments[0].completed_at.is_some());

        let reviews = AbstractReview::list_by_abstract(fx.pool.as_ref(), submission.id)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].reviewer_type, ReviewerType::Editor);
        assert_eq!(reviews[0].decision, ReviewDecision::Accepted);
        assert_eq!(reviews[0].comment, "Looks good");
        assert_eq!(reviews[0].assignment_id, Some(assignments[0].id));
    }

    #[tokio::test]
    async fn editor_reject_is_terminal() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();

        let detail = fx
            .engine
            .review(submission.id, fx.editor.id, ReviewDecision::Rejected, "Out of scope")
            .await
            .unwrap();
        assert_eq!(detail.status, AbstractStatus::Rejected);

        let err = fx
            .engine
            .assign_conference_editor(submission.id, fx.conference_editor.id, fx.admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn full_accept_pipeline_writes_six_history_rows() {
        let fx = fixture().await;
        let abstract_id = accept_through_pipeline(&fx).await;

        let stored = AbstractSubmission::find_by_id(fx.pool.as_ref(), abstract_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AbstractStatus::Accepted);

        let history = AbstractStatusHistory::list_by_abstract(fx.pool.as_ref(), abstract_id)
            .await
            .unwrap();
        assert_eq!(history.len(), 6);

        // The ledger chains: each row's status_from is the previous row's
        // status_to, starting from the creation row.
        assert_eq!(history[0].status_from, None);
        for pair in history.windows(2) {
            assert_eq!(pair[1].status_from, Some(pair[0].status_to));
        }
        assert_eq!(history[5].status_to, AbstractStatus::Accepted);

        let reviews = AbstractReview::list_by_abstract(fx.pool.as_ref(), abstract_id)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[2].reviewer_type, ReviewerType::Admin);
        assert_eq!(reviews[2].assignment_id, None);
    }

    #[tokio::test]
    async fn full_paper_gated_on_acceptance_and_ownership() {
        let fx = fixture().await;
        let submission = submit(&fx).await;

        let err = fx
            .engine
            .attach_full_paper(submission.id, fx.author.id, vec![paper("early.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();
        fx.engine
            .review(submission.id, fx.editor.id, ReviewDecision::Accepted, "ok")
            .await
            .unwrap();
        fx.engine
            .assign_conference_editor(submission.id, fx.conference_editor.id, fx.admin.id)
            .await
            .unwrap();
        fx.engine
            .review(
                submission.id,
                fx.conference_editor.id,
                ReviewDecision::Accepted,
                "ok",
            )
            .await
            .unwrap();
        fx.engine
            .admin_decision(submission.id, fx.admin.id, ReviewDecision::Accepted, None)
            .await
            .unwrap();
        let abstract_id = submission.id;

        let err = fx
            .engine
            .attach_full_paper(abstract_id, fx.author.id + 99, vec![paper("theirs.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Unauthorized(_)));

        let first = fx
            .engine
            .attach_full_paper(abstract_id, fx.author.id, vec![paper("final.pdf")])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        // Re-upload appends rather than replacing.
        fx.engine
            .attach_full_paper(abstract_id, fx.author.id, vec![paper("final-v2.pdf")])
            .await
            .unwrap();
        let files = FullPaperFile::list_by_abstract(fx.pool.as_ref(), abstract_id)
            .await
            .unwrap();
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_submission_conflicts_every_time() {
        let fx = fixture().await;
        submit(&fx).await;

        for _ in 0..2 {
            let err = fx
                .engine
                .submit(SubmitAbstract {
                    conference_id: fx.conference.id,
                    author_id: fx.author.id,
                    title: None,
                    abstract_file: "uploads/abstracts/again.pdf".into(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, WorkflowError::Conflict(_)));
        }
    }

    #[tokio::test]
    async fn assign_editor_outside_submitted_fails_and_leaves_state() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();

        let err = fx
            .engine
            .assign_editor(submission.id, fx.conference_editor.id, fx.admin.id)
            .await
            .unwrap_err();
        match err {
            WorkflowError::InvalidTransition { expected, actual } => {
                assert_eq!(expected, "Submitted");
                assert_eq!(actual, "Assigned to Editor");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let stored = AbstractSubmission::find_by_id(fx.pool.as_ref(), submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AbstractStatus::AssignedToEditor);
        assert_eq!(stored.current_editor_id, Some(fx.editor.id));

        let assignments = AbstractAssignment::list_by_abstract(fx.pool.as_ref(), submission.id)
            .await
            .unwrap();
        assert_eq!(assignments.len(), 1);
    }

    #[tokio::test]
    async fn review_by_wrong_editor_is_unauthorized() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();

        let err = fx
            .engine
            .review(
                submission.id,
                fx.conference_editor.id,
                ReviewDecision::Accepted,
                "not mine",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Unauthorized(_)));

        let stored = AbstractSubmission::find_by_id(fx.pool.as_ref(), submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AbstractStatus::AssignedToEditor);
    }

    #[tokio::test]
    async fn blank_comments_are_rejected_except_admin_accept() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();

        let err = fx
            .engine
            .review(submission.id, fx.editor.id, ReviewDecision::Accepted, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        fx.engine
            .review(submission.id, fx.editor.id, ReviewDecision::Accepted, "fine")
            .await
            .unwrap();
        fx.engine
            .assign_conference_editor(submission.id, fx.conference_editor.id, fx.admin.id)
            .await
            .unwrap();
        fx.engine
            .review(
                submission.id,
                fx.conference_editor.id,
                ReviewDecision::Accepted,
                "fine",
            )
            .await
            .unwrap();

        // Admin rejection insists on a comment; admin acceptance does not.
        let err = fx
            .engine
            .admin_decision(submission.id, fx.admin.id, ReviewDecision::Rejected, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let detail = fx
            .engine
            .admin_decision(submission.id, fx.admin.id, ReviewDecision::Accepted, None)
            .await
            .unwrap();
        assert_eq!(detail.status, AbstractStatus::Accepted);
    }

    #[tokio::test]
    async fn assigning_unknown_or_inactive_editor_is_not_found() {
        let fx = fixture().await;
        let submission = submit(&fx).await;

        let err = fx
            .engine
            .assign_editor(submission.id, 9999, fx.admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));

        sqlx::query("UPDATE editors SET is_active = 0 WHERE id = ?1")
            .bind(fx.editor.id)
            .execute(fx.pool.as_ref())
            .await
            .unwrap();
        let err = fx
            .engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));

        let stored = AbstractSubmission::find_by_id(fx.pool.as_ref(), submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AbstractStatus::Submitted);
    }

    #[tokio::test]
    async fn stale_status_guard_misses_after_transition() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();

        // A writer still holding the pre-transition status loses the race.
        let mut conn = fx.pool.acquire().await.unwrap();
        let result = AbstractSubmission::transition_status(
            &mut conn,
            submission.id,
            AbstractStatus::Submitted,
            AbstractStatus::AssignedToEditor,
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn rejected_abstract_stays_visible_to_its_editor() {
        let fx = fixture().await;
        let submission = submit(&fx).await;
        fx.engine
            .assign_editor(submission.id, fx.editor.id, fx.admin.id)
            .await
            .unwrap();
        fx.engine
            .review(submission.id, fx.editor.id, ReviewDecision::Rejected, "Out of scope")
            .await
            .unwrap();

        let listed = read_model::list_assigned_to_editor(fx.pool.as_ref(), fx.editor.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, submission.id);
        assert_eq!(listed[0].status, AbstractStatus::Rejected);

        // An editor who never touched it sees nothing.
        let listed = read_model::list_assigned_to_editor(fx.pool.as_ref(), fx.conference_editor.id)
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn hydrated_detail_carries_latest_reviews_and_files() {
        let fx = fixture().await;
        let abstract_id = accept_through_pipeline(&fx).await;
        fx.engine
            .attach_full_paper(abstract_id, fx.author.id, vec![paper("camera-ready.pdf")])
            .await
            .unwrap();

        let listed = read_model::list_accepted_for_author(fx.pool.as_ref(), fx.author.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        let detail = &listed[0];

        assert_eq!(detail.conference_name, fx.conference.name);
        assert_eq!(detail.author_email, fx.author.email);
        assert_eq!(
            detail.editor_review.as_ref().unwrap().comment,
            "Strong methods"
        );
        assert_eq!(
            detail.conference_editor_review.as_ref().unwrap().comment,
            "Fits the track"
        );
        assert_eq!(
            detail.admin_review.as_ref().unwrap().decision,
            ReviewDecision::Accepted
        );
        assert_eq!(
            detail
                .editor_assignment
                .as_ref()
                .unwrap()
                .editor_email,
            fx.editor.email
        );
        assert_eq!(detail.full_papers.as_ref().unwrap().len(), 1);
    }
}
