//! Interaction execution against the live session.
//!
//! The executor carries out the action a decision chose — click, fill, or a
//! picker completion routine — and reports what observably changed: URL, a
//! newly layered overlay, or same-surface form content. It never decides
//! anything; policy lives in the decision cascade and the exploration loop.

pub mod errors;
pub mod model;
pub mod pickers;
pub mod runner;
pub mod values;

pub use errors::InteractError;
pub use model::{ClickStyle, ElementCensus, InteractionOutcome};
pub use runner::InteractExecutor;
