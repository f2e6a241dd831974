use thiserror::Error;

use uiscout_core_types::ScoutError;

/// Errors surfaced by the exploration loop.
///
/// Ordinary DOM unpredictability never becomes an error here; it degrades to
/// unsuccessful log entries. These variants mark the few conditions that end
/// a branch or a run.
#[derive(Debug, Error, Clone)]
pub enum ExploreError {
    /// The page or session handle disappeared; the current branch aborts and
    /// the run returns a partial report.
    #[error("session unusable: {0}")]
    SessionUnusable(String),

    /// The run was cancelled cooperatively.
    #[error("exploration cancelled")]
    Cancelled,

    /// Checkpoint blob could not be encoded or decoded.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl From<ExploreError> for ScoutError {
    fn from(err: ExploreError) -> Self {
        ScoutError::new(err.to_string())
    }
}
