//! Execution-level transition validation.

use crate::error::ExecutionError;
use crate::status::ExecutionStatus;

/// Returns `true` if the transition from `from` to `to` is valid.
///
/// An execution starts `Running` directly (there is no `Created` state to
/// transition out of — the manager installs the record already running),
/// can move to `Paused` and back any number of times, and leaves `Running`
/// exactly once into one of the three terminal states.
#[must_use]
pub fn can_transition(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    matches!(
        (from, to),
        (ExecutionStatus::Running, ExecutionStatus::Paused)
            | (ExecutionStatus::Running, ExecutionStatus::Completed)
            | (ExecutionStatus::Running, ExecutionStatus::Failed)
            | (ExecutionStatus::Running, ExecutionStatus::Cancelled)
            | (ExecutionStatus::Paused, ExecutionStatus::Running)
            | (ExecutionStatus::Paused, ExecutionStatus::Cancelled)
            | (ExecutionStatus::Paused, ExecutionStatus::Failed)
    )
}

/// Validate a transition, returning an error if invalid.
pub fn validate(from: ExecutionStatus, to: ExecutionStatus) -> Result<(), ExecutionError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::InvalidTransition { from, to })
    }
}
