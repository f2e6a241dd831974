//! Decision engine for discovered elements.
//!
//! Every element flows through a fixed three-stage cascade: causal rules
//! learned by experimentation, then learned/static pattern checks, then
//! static fallback rules. The whole crate is pure — it never touches the
//! browser — so each stage and every text classifier is independently
//! unit-testable.

pub mod cascade;
pub mod causal;
pub mod classifiers;
pub mod model;
pub mod patterns;

pub use cascade::{DecisionContext, DecisionEngine};
pub use causal::{CausalExamples, CausalMemory, CausalRule};
pub use model::{Classification, DecisionResult, ElementAction};
pub use patterns::{Pattern, PatternBook, PatternKind};
