//! The abstract review workflow: a state machine over
//! [`AbstractStatus`](crate::db::models::abstract_submission::AbstractStatus)
//! driven through sequential editor, conference-editor, and admin stages.
//!
//! `transition` is the pure rule table: which action is legal from which
//! status, and where it leads. `engine` executes actions against the store,
//! one transaction per transition, writing the assignment/review/history
//! records alongside the status mutation. `read_model` assembles the
//! hydrated views the HTTP surface returns.

pub mod engine;
pub mod read_model;
pub mod transition;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid transition: expected status '{expected}', found '{actual}'")]
    InvalidTransition { expected: String, actual: String },
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
}
