//! Mutable per-run exploration state and the final report.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use decision_cascade::{CausalMemory, ElementAction, PatternBook};
use serde::{Deserialize, Serialize};
use uiscout_core_types::RunId;

/// Context label used while no overlay is layered.
pub const ROOT_CONTEXT: &str = "root";

/// One attempted interaction, in run order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub key: String,
    pub action: ElementAction,
    pub success: bool,
    pub at: DateTime<Utc>,
    pub context: String,
    pub note: Option<String>,
}

/// What one sequential form step did.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormStepRecord {
    pub step: u32,
    pub filled_inputs: Vec<String>,
    pub submitted_by: Option<String>,
}

/// Summary of a multi-step form traversal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormSummary {
    pub steps: Vec<FormStepRecord>,
}

/// The mutable record of one exploration run. Owned exclusively by that run
/// and discarded at run end except for what is explicitly persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorationState {
    pub run_id: RunId,
    visited: HashSet<String>,
    pub log: Vec<InteractionRecord>,
    /// Discovered selector map: selector -> display text.
    pub discovered: BTreeMap<String, String>,
    overlay_stack: Vec<String>,
    /// Mirrors the top of the overlay stack, `root` when empty.
    context: String,
    pub patterns: PatternBook,
    pub causal: CausalMemory,
    /// Resumption tokens (origin URLs) for navigate-away-and-back descents.
    pub nav_stack: Vec<String>,
    pub form_summary: Option<FormSummary>,
}

impl ExplorationState {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            visited: HashSet::new(),
            log: Vec::new(),
            discovered: BTreeMap::new(),
            overlay_stack: Vec::new(),
            context: ROOT_CONTEXT.to_string(),
            patterns: PatternBook::new(),
            causal: CausalMemory::new(),
            nav_stack: Vec::new(),
            form_summary: None,
        }
    }

    /// Mark an element key visited. Returns false when it was already seen;
    /// a key is processed at most once per run.
    pub fn mark_visited(&mut self, key: &str) -> bool {
        self.visited.insert(key.to_string())
    }

    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Push one overlay frame; the context label always mirrors the top.
    pub fn push_overlay(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.overlay_stack.push(id.clone());
        self.context = id;
    }

    /// Pop exactly one overlay frame.
    pub fn pop_overlay(&mut self) -> Option<String> {
        let popped = self.overlay_stack.pop();
        self.context = self
            .overlay_stack
            .last()
            .cloned()
            .unwrap_or_else(|| ROOT_CONTEXT.to_string());
        popped
    }

    pub fn overlay_stack(&self) -> &[String] {
        &self.overlay_stack
    }

    pub fn current_overlay(&self) -> Option<&str> {
        self.overlay_stack.last().map(String::as_str)
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn record(
        &mut self,
        key: impl Into<String>,
        action: ElementAction,
        success: bool,
        note: Option<String>,
    ) {
        self.log.push(InteractionRecord {
            key: key.into(),
            action,
            success,
            at: Utc::now(),
            context: self.context.clone(),
            note,
        });
    }

    pub fn add_discovered(&mut self, selector: impl Into<String>, text: impl Into<String>) {
        self.discovered.entry(selector.into()).or_insert_with(|| text.into());
    }

    pub fn form_summary_mut(&mut self) -> &mut FormSummary {
        self.form_summary.get_or_insert_with(FormSummary::default)
    }

    pub fn into_report(self) -> ExplorationReport {
        ExplorationReport {
            run_id: self.run_id.clone(),
            visited_count: self.visited.len(),
            log: self.log,
            discovered: self.discovered,
            patterns: self.patterns,
            form_summary: self.form_summary,
        }
    }
}

/// Immutable result handed back to the caller of `explore`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorationReport {
    pub run_id: RunId,
    pub visited_count: usize,
    pub log: Vec<InteractionRecord>,
    pub discovered: BTreeMap<String, String>,
    pub patterns: PatternBook,
    pub form_summary: Option<FormSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visited_dedup() {
        let mut state = ExplorationState::new(RunId::new());
        assert!(state.mark_visited("a|x"));
        assert!(!state.mark_visited("a|x"));
        assert_eq!(state.visited_count(), 1);
    }

    #[test]
    fn test_context_mirrors_overlay_top() {
        let mut state = ExplorationState::new(RunId::new());
        assert_eq!(state.context(), ROOT_CONTEXT);

        state.push_overlay("login-modal");
        assert_eq!(state.context(), "login-modal");
        state.push_overlay("kyc-wizard");
        assert_eq!(state.context(), "kyc-wizard");

        assert_eq!(state.pop_overlay().as_deref(), Some("kyc-wizard"));
        assert_eq!(state.context(), "login-modal");
        assert_eq!(state.pop_overlay().as_deref(), Some("login-modal"));
        assert_eq!(state.context(), ROOT_CONTEXT);
        assert_eq!(state.pop_overlay(), None);
    }

    #[test]
    fn test_records_carry_context() {
        let mut state = ExplorationState::new(RunId::new());
        state.push_overlay("menu");
        state.record("button|Go", ElementAction::Click, true, None);
        assert_eq!(state.log[0].context, "menu");
    }

    #[test]
    fn test_report_preserves_counts() {
        let mut state = ExplorationState::new(RunId::new());
        state.mark_visited("a|1");
        state.mark_visited("b|2");
        state.add_discovered("a", "1");
        let report = state.into_report();
        assert_eq!(report.visited_count, 2);
        assert_eq!(report.discovered.len(), 1);
    }
}
