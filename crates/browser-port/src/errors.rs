use thiserror::Error;

use uiscout_core_types::ScoutError;

/// Typed failure conditions surfaced by a browser-session implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// The queried element does not exist (or vanished between probes).
    #[error("target element not found: {0}")]
    NotFound(String),

    /// The operation did not complete within its timeout budget.
    #[error("operation timed out after {0}ms")]
    Timeout(u64),

    /// The underlying page or session is gone; the current branch must abort.
    #[error("session closed or page unusable")]
    SessionClosed,

    /// Protocol-level failure that is neither a miss nor a timeout.
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

impl BrowserError {
    /// True when the session itself is unusable and the caller should abort
    /// the current context rather than degrade to a skip.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BrowserError::SessionClosed)
    }
}

impl From<BrowserError> for ScoutError {
    fn from(err: BrowserError) -> Self {
        ScoutError::new(err.to_string())
    }
}
