//! Hydrated views over the abstract aggregate. Each builder assembles a fixed
//! DTO from explicit child-table queries rather than ad-hoc joins, so the
//! response shape is the same everywhere it is returned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::models::abstract_assignment::{AbstractAssignment, AssignmentStage, AssignmentStatus};
use crate::db::models::abstract_review::{AbstractReview, ReviewDecision, ReviewerType};
use crate::db::models::abstract_submission::{AbstractStatus, AbstractSubmission};
use crate::db::models::author::Author;
use crate::db::models::conference::Conference;
use crate::db::models::editor::Editor;
use crate::db::models::full_paper_file::FullPaperFile;

use super::WorkflowError;

#[derive(Debug, Serialize)]
pub struct AssignmentView {
    pub id: i64,
    pub editor_id: i64,
    pub editor_name: String,
    pub editor_email: String,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: i64,
    pub reviewer_type: ReviewerType,
    pub reviewer_id: i64,
    pub decision: ReviewDecision,
    pub comment: String,
    pub reviewed_at: DateTime<Utc>,
}

/// The full response shape for one abstract: submission core, conference and
/// author references, the latest assignment per stage, the latest review per
/// reviewer type, and (when requested) the attached full-paper files.
#[derive(Debug, Serialize)]
pub struct AbstractDetail {
    pub id: i64,
    pub conference_id: i64,
    pub conference_name: String,
    pub author_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub title: Option<String>,
    pub abstract_file: String,
    pub status: AbstractStatus,
    pub editor_assignment: Option<AssignmentView>,
    pub conference_editor_assignment: Option<AssignmentView>,
    pub editor_review: Option<ReviewView>,
    pub conference_editor_review: Option<ReviewView>,
    pub admin_review: Option<ReviewView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_papers: Option<Vec<FullPaperFile>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn load_detail(
    pool: &SqlitePool,
    abstract_id: i64,
    include_files: bool,
) -> Result<AbstractDetail, WorkflowError> {
    let submission = AbstractSubmission::find_by_id(pool, abstract_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Abstract not found".into()))?;
    hydrate(pool, submission, include_files).await
}

pub async fn list_for_conference(
    pool: &SqlitePool,
    conference_id: i64,
) -> Result<Vec<AbstractDetail>, WorkflowError> {
    Conference::find_by_id(pool, conference_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Conference not found".into()))?;

    let submissions = AbstractSubmission::list_by_conference(pool, conference_id).await?;
    hydrate_all(pool, submissions, true).await
}

pub async fn list_for_author(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<AbstractDetail>, WorkflowError> {
    Author::find_by_id(pool, author_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Author not found".into()))?;

    let submissions = AbstractSubmission::list_by_author(pool, author_id).await?;
    hydrate_all(pool, submissions, false).await
}

pub async fn list_assigned_to_editor(
    pool: &SqlitePool,
    editor_id: i64,
) -> Result<Vec<AbstractDetail>, WorkflowError> {
    Editor::find_by_id(pool, editor_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Editor not found".into()))?;

    let submissions = AbstractSubmission::list_assigned_to_editor(pool, editor_id).await?;
    hydrate_all(pool, submissions, false).await
}

pub async fn list_accepted_for_author(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<AbstractDetail>, WorkflowError> {
    Author::find_by_id(pool, author_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Author not found".into()))?;

    let submissions = AbstractSubmission::list_accepted_by_author(pool, author_id).await?;
    hydrate_all(pool, submissions, true).await
}

async fn hydrate_all(
    pool: &SqlitePool,
    submissions: Vec<AbstractSubmission>,
    include_files: bool,
) -> Result<Vec<AbstractDetail>, WorkflowError> {
    let mut details = Vec::with_capacity(submissions.len());
    for submission in submissions {
        details.push(hydrate(pool, submission, include_files).await?);
    }
    Ok(details)
}

async fn hydrate(
    pool: &SqlitePool,
    submission: AbstractSubmission,
    include_files: bool,
) -> Result<AbstractDetail, WorkflowError> {
    let conference = Conference::find_by_id(pool, submission.conference_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Conference not found".into()))?;
    let author = Author::find_by_id(pool, submission.author_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Author not found".into()))?;

    let editor_assignment =
        assignment_view(pool, submission.id, AssignmentStage::Editor).await?;
    let conference_editor_assignment =
        assignment_view(pool, submission.id, AssignmentStage::ConferenceEditor).await?;

    let editor_review = review_view(pool, submission.id, ReviewerType::Editor).await?;
    let conference_editor_review =
        review_view(pool, submission.id, ReviewerType::ConferenceEditor).await?;
    let admin_review = review_view(pool, submission.id, ReviewerType::Admin).await?;

    let full_papers = if include_files {
        Some(FullPaperFile::list_by_abstract(pool, submission.id).await?)
    } else {
        None
    };

    Ok(AbstractDetail {
        id: submission.id,
        conference_id: conference.id,
        conference_name: conference.name,
        author_id: author.id,
        author_name: format!("{} {}", author.first_name, author.last_name),
        author_email: author.email,
        title: submission.title,
        abstract_file: submission.abstract_file,
        status: submission.status,
        editor_assignment,
        conference_editor_assignment,
        editor_review,
        conference_editor_review,
        admin_review,
        full_papers,
        created_at: submission.created_at,
        updated_at: submission.updated_at,
    })
}

async fn assignment_view(
    pool: &SqlitePool,
    abstract_id: i64,
    stage: AssignmentStage,
) -> Result<Option<AssignmentView>, WorkflowError> {
    let Some(assignment) = AbstractAssignment::find_latest(pool, abstract_id, stage).await? else {
        return Ok(None);
    };
    let editor = Editor::find_by_id(pool, assignment.editor_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound("Editor not found".into()))?;

    Ok(Some(AssignmentView {
        id: assignment.id,
        editor_id: editor.id,
        editor_name: format!("{} {}", editor.first_name, editor.last_name),
        editor_email: editor.email,
        status: assignment.status,
        assigned_at: assignment.assigned_at,
        completed_at: assignment.completed_at,
    }))
}

async fn review_view(
    pool: &SqlitePool,
    abstract_id: i64,
    reviewer_type: ReviewerType,
) -> Result<Option<ReviewView>, WorkflowError> {
    let review = AbstractReview::find_latest_by_type(pool, abstract_id, reviewer_type).await?;
    Ok(review.map(|r| ReviewView {
        id: r.id,
        reviewer_type: r.reviewer_type,
        reviewer_id: r.reviewer_id,
        decision: r.decision,
        comment: r.comment,
        reviewed_at: r.reviewed_at,
    }))
}
