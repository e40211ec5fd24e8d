//! Pure transition rules for the abstract review state machine. No I/O here;
//! the engine consults this table and the store enforces the outcome.

use crate::db::models::abstract_review::ReviewDecision;
use crate::db::models::abstract_submission::AbstractStatus;

use super::WorkflowError;

/// An action an actor can take against an abstract already in the system.
/// Submission itself is creation, not a transition, and is handled directly
/// by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    AssignEditor,
    EditorReview(ReviewDecision),
    AssignConferenceEditor,
    ConferenceEditorReview(ReviewDecision),
    AdminDecision(ReviewDecision),
}

impl WorkflowAction {
    /// The only status from which this action is legal.
    pub fn required_status(&self) -> AbstractStatus {
        match self {
            WorkflowAction::AssignEditor => AbstractStatus::Submitted,
            WorkflowAction::EditorReview(_) => AbstractStatus::AssignedToEditor,
            WorkflowAction::AssignConferenceEditor => AbstractStatus::ReviewedByEditor,
            WorkflowAction::ConferenceEditorReview(_) => {
                AbstractStatus::AssignedToConferenceEditor
            }
            WorkflowAction::AdminDecision(_) => AbstractStatus::ReviewedByConferenceEditor,
        }
    }

    /// Where this action lands. A reject at any review step is terminal.
    pub fn next_status(&self) -> AbstractStatus {
        match self {
            WorkflowAction::AssignEditor => AbstractStatus::AssignedToEditor,
            WorkflowAction::EditorReview(ReviewDecision::Accepted) => {
                AbstractStatus::ReviewedByEditor
            }
            WorkflowAction::EditorReview(ReviewDecision::Rejected) => AbstractStatus::Rejected,
            WorkflowAction::AssignConferenceEditor => AbstractStatus::AssignedToConferenceEditor,
            WorkflowAction::ConferenceEditorReview(ReviewDecision::Accepted) => {
                AbstractStatus::ReviewedByConferenceEditor
            }
            WorkflowAction::ConferenceEditorReview(ReviewDecision::Rejected) => {
                AbstractStatus::Rejected
            }
            WorkflowAction::AdminDecision(ReviewDecision::Accepted) => AbstractStatus::Accepted,
            WorkflowAction::AdminDecision(ReviewDecision::Rejected) => AbstractStatus::Rejected,
        }
    }

    /// Every review requires a comment except the admin's acceptance, which
    /// the original workflow leaves optional.
    pub fn comment_required(&self) -> bool {
        !matches!(
            self,
            WorkflowAction::AdminDecision(ReviewDecision::Accepted)
        )
    }
}

/// Validate `action` against `current` and return the resulting status.
pub fn apply(
    current: AbstractStatus,
    action: WorkflowAction,
) -> Result<AbstractStatus, WorkflowError> {
    let expected = action.required_status();
    if current != expected {
        return Err(WorkflowError::InvalidTransition {
            expected: expected.to_string(),
            actual: current.to_string(),
        });
    }
    Ok(action.next_status())
}
