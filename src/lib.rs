//! UI-Scout: autonomous exploration of a live web front end.
//!
//! This facade crate re-exports the public surface of the workspace: wire a
//! [`BrowserSession`] and a [`KnowledgeStore`] into an [`Explorer`], call
//! [`Explorer::explore`], and read the resulting [`ExplorationReport`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use uiscout::{ExploreConfig, Explorer, NoopKnowledgeStore};
//!
//! # async fn run(session: Arc<dyn uiscout::BrowserSession>) {
//! let explorer = Explorer::new(session, Arc::new(NoopKnowledgeStore), ExploreConfig::default());
//! let report = explorer.explore("https://app.example.com", false).await.unwrap();
//! println!("visited {} elements", report.visited_count);
//! # }
//! ```

pub use browser_port::{BrowserError, BrowserSession, NodeHandle, NodeSnapshot, Rect, WaitCondition};
pub use decision_cascade::{
    Classification, DecisionContext, DecisionEngine, DecisionResult, ElementAction, Pattern,
    PatternBook, PatternKind,
};
pub use element_scan::{ActiveScope, Discoverer, ElementDescriptor, ElementKind, ScopeResolver};
pub use explore_loop::{
    Checkpoint, ExplorationReport, ExplorationState, ExploreConfig, ExploreError, Explorer,
    FormStepRecord, FormSummary, InteractionRecord, KnowledgeHit, KnowledgeStore,
    NoopKnowledgeStore, PatternRecord, SelectorRecord,
};
pub use tool_interact::{ClickStyle, InteractExecutor, InteractionOutcome};
pub use uiscout_core_types::{ActionId, RunId, ScoutError, SessionId};
