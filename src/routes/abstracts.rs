use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::models::abstract_review::ReviewDecision;
use crate::db::models::abstract_submission::{AbstractStatus, AbstractSubmission};
use crate::db::models::full_paper_file::FullPaperFile;
use crate::error::ApiError;
use crate::notify::NotificationEvent;
use crate::response::ApiResponse;
use crate::routes::JsonBody;
use crate::state::AppState;
use crate::storage;
use crate::workflow::engine::SubmitAbstract;
use crate::workflow::read_model::{self, AbstractDetail};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Accept,
    Reject,
}

impl ReviewAction {
    fn decision(self) -> ReviewDecision {
        match self {
            ReviewAction::Accept => ReviewDecision::Accepted,
            ReviewAction::Reject => ReviewDecision::Rejected,
        }
    }
}

pub async fn submit_abstract(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AbstractSubmission>>), ApiError> {
    let mut conference_id: Option<i64> = None;
    let mut author_id: Option<i64> = None;
    let mut title: Option<String> = None;
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            "conference_id" => conference_id = field.text().await?.trim().parse().ok(),
            "author_id" => author_id = field.text().await?.trim().parse().ok(),
            "title" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    title = Some(text.trim().to_string());
                }
            }
            "abstract" => {
                let file_name = field.file_name().unwrap_or("abstract.pdf").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                upload = Some((file_name, content_type, field.bytes().await?.to_vec()));
            }
            _ => {}
        }
    }

    let conference_id = conference_id
        .ok_or_else(|| ApiError::BadRequest("conference_id is required.".into()))?;
    let author_id =
        author_id.ok_or_else(|| ApiError::BadRequest("author_id is required.".into()))?;
    let (file_name, content_type, data) = upload
        .filter(|(_, _, data)| !data.is_empty())
        .ok_or_else(|| ApiError::BadRequest("An abstract file is required.".into()))?;

    let stored = storage::save_upload(
        &state.config.upload_folder,
        &file_name,
        content_type.as_deref(),
        storage::ABSTRACT_MIME_TYPES,
        &data,
    )?;

    let submission = match state
        .engine
        .submit(SubmitAbstract {
            conference_id,
            author_id,
            title,
            abstract_file: stored.file_path.clone(),
        })
        .await
    {
        Ok(submission) => submission,
        Err(e) => {
            storage::discard(std::slice::from_ref(&stored));
            return Err(e.into());
        }
    };

    state.notifier.enqueue(NotificationEvent::AbstractSubmitted {
        abstract_id: submission.id,
    });

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            submission,
            "Abstract submitted successfully.",
        )),
    ))
}

pub async fn list_for_conference(
    State(state): State<Arc<AppState>>,
    Path(conference_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<AbstractDetail>>>, ApiError> {
    let abstracts = read_model::list_for_conference(state.pool.as_ref(), conference_id).await?;
    Ok(Json(ApiResponse::success(
        abstracts,
        "Abstracts retrieved successfully.",
    )))
}

pub async fn list_for_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<AbstractDetail>>>, ApiError> {
    let abstracts = read_model::list_for_author(state.pool.as_ref(), author_id).await?;
    Ok(Json(ApiResponse::success(
        abstracts,
        "Abstracts retrieved successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct AssignPayload {
    pub editor_id: i64,
    pub admin_id: i64,
}

pub async fn assign_editor(
    State(state): State<Arc<AppState>>,
    Path(abstract_id): Path<i64>,
    JsonBody(payload): JsonBody<AssignPayload>,
) -> Result<Json<ApiResponse<AbstractDetail>>, ApiError> {
    let detail = state
        .engine
        .assign_editor(abstract_id, payload.editor_id, payload.admin_id)
        .await?;

    state.notifier.enqueue(NotificationEvent::EditorAssigned {
        abstract_id,
        editor_id: payload.editor_id,
    });

    Ok(Json(ApiResponse::success(
        detail,
        "Editor assigned successfully.",
    )))
}

pub async fn assign_conference_editor(
    State(state): State<Arc<AppState>>,
    Path(abstract_id): Path<i64>,
    JsonBody(payload): JsonBody<AssignPayload>,
) -> Result<Json<ApiResponse<AbstractDetail>>, ApiError> {
    let detail = state
        .engine
        .assign_conference_editor(abstract_id, payload.editor_id, payload.admin_id)
        .await?;

    state.notifier.enqueue(NotificationEvent::EditorAssigned {
        abstract_id,
        editor_id: payload.editor_id,
    });

    Ok(Json(ApiResponse::success(
        detail,
        "Conference editor assigned successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub editor_id: i64,
    pub action: ReviewAction,
    pub comment: String,
}

pub async fn review(
    State(state): State<Arc<AppState>>,
    Path(abstract_id): Path<i64>,
    JsonBody(payload): JsonBody<ReviewPayload>,
) -> Result<Json<ApiResponse<AbstractDetail>>, ApiError> {
    let decision = payload.action.decision();
    let detail = state
        .engine
        .review(abstract_id, payload.editor_id, decision, &payload.comment)
        .await?;

    // A reject at either review stage is the final word for the author.
    if detail.status == AbstractStatus::Rejected {
        state.notifier.enqueue(NotificationEvent::DecisionRecorded {
            abstract_id,
            decision,
        });
    }

    Ok(Json(ApiResponse::success(
        detail,
        "Review recorded successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct AdminDecisionPayload {
    pub admin_id: i64,
    pub action: ReviewAction,
    pub comment: Option<String>,
}

pub async fn admin_decision(
    State(state): State<Arc<AppState>>,
    Path(abstract_id): Path<i64>,
    JsonBody(payload): JsonBody<AdminDecisionPayload>,
) -> Result<Json<ApiResponse<AbstractDetail>>, ApiError> {
    let decision = payload.action.decision();
    let detail = state
        .engine
        .admin_decision(abstract_id, payload.admin_id, decision, payload.comment.as_deref())
        .await?;

    state.notifier.enqueue(NotificationEvent::DecisionRecorded {
        abstract_id,
        decision,
    });

    Ok(Json(ApiResponse::success(
        detail,
        "Final decision recorded successfully.",
    )))
}

pub async fn upload_full_paper(
    State(state): State<Arc<AppState>>,
    Path(abstract_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<FullPaperFile>>>), ApiError> {
    let mut author_id: Option<i64> = None;
    let mut stored = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            "author_id" => author_id = field.text().await?.trim().parse().ok(),
            "files" => {
                let file_name = field.file_name().unwrap_or("paper.pdf").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                let file = match storage::save_upload(
                    &state.config.full_paper_folder,
                    &file_name,
                    content_type.as_deref(),
                    storage::FULL_PAPER_MIME_TYPES,
                    &data,
                ) {
                    Ok(file) => file,
                    Err(e) => {
                        storage::discard(&stored);
                        return Err(e.into());
                    }
                };
                stored.push(file);
            }
            _ => {}
        }
    }

    let author_id =
        author_id.ok_or_else(|| ApiError::BadRequest("author_id is required.".into()))?;
    if stored.is_empty() {
        return Err(ApiError::BadRequest("At least one file is required.".into()));
    }

    let files = match state
        .engine
        .attach_full_paper(abstract_id, author_id, stored.clone())
        .await
    {
        Ok(files) => files,
        Err(e) => {
            storage::discard(&stored);
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            files,
            "Full paper uploaded successfully.",
        )),
    ))
}

#[derive(Debug, Deserialize)]
pub struct EditorQuery {
    pub editor_id: i64,
}

pub async fn assigned_to_editor(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EditorQuery>,
) -> Result<Json<ApiResponse<Vec<AbstractDetail>>>, ApiError> {
    let abstracts =
        read_model::list_assigned_to_editor(state.pool.as_ref(), query.editor_id).await?;
    Ok(Json(ApiResponse::success(
        abstracts,
        "Assigned abstracts retrieved successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub author_id: i64,
}

pub async fn accepted_for_author(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthorQuery>,
) -> Result<Json<ApiResponse<Vec<AbstractDetail>>>, ApiError> {
    let abstracts =
        read_model::list_accepted_for_author(state.pool.as_ref(), query.author_id).await?;
    Ok(Json(ApiResponse::success(
        abstracts,
        "Accepted abstracts retrieved successfully.",
    )))
}
