pub mod abstracts;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use crate::error::ApiError;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "service": "ponencia", "status": "ok" }))
}

/// `Json` extractor that surfaces malformed bodies as 400 through the error
/// envelope instead of axum's default 422 rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
