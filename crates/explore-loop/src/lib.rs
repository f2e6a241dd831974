//! The exploration loop.
//!
//! This crate threads the perception, decision and interaction crates into
//! the depth-bounded recursive state machine that drives one exploration
//! run: resolve the active surface, discover elements, decide per element,
//! execute, learn from the outcome, and descend into overlays and
//! navigations while budgets remain. It also hosts the causal discovery
//! experimenter, the pattern learner, the knowledge-store port, and
//! checkpointing of run state.

pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod experiment;
pub mod knowledge;
pub mod learner;
pub mod machine;
pub mod state;

pub use checkpoint::Checkpoint;
pub use config::ExploreConfig;
pub use errors::ExploreError;
pub use experiment::CausalExperimenter;
pub use learner::{Observation, PatternLearner};
pub use knowledge::{KnowledgeHit, KnowledgeStore, NoopKnowledgeStore, PatternRecord, SelectorRecord};
pub use machine::Explorer;
pub use state::{ExplorationReport, ExplorationState, FormStepRecord, FormSummary, InteractionRecord};
