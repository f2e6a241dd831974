use thiserror::Error;

use uiscout_core_types::ScoutError;

/// Errors emitted by the element-scan crate.
///
/// Ordinary probe misses never surface here; they degrade to "absent" inside
/// the resolver and discoverer. Only session-level failures propagate.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The page or session handle is gone; the caller must abort its branch.
    #[error("session unusable: {0}")]
    SessionUnusable(String),
}

impl From<ScanError> for ScoutError {
    fn from(err: ScanError) -> Self {
        ScoutError::new(err.to_string())
    }
}
