use thiserror::Error;

use uiscout_core_types::ScoutError;

/// Errors emitted by the interaction executor.
///
/// Ordinary misses (element vanished, click timed out) are not errors; they
/// come back as unsuccessful outcomes. Only a dead session propagates.
#[derive(Debug, Error)]
pub enum InteractError {
    #[error("session unusable: {0}")]
    SessionGone(String),
}

impl From<InteractError> for ScoutError {
    fn from(err: InteractError) -> Self {
        ScoutError::new(err.to_string())
    }
}
