//! Causal discovery experiments.
//!
//! Inside a form-like scope, before ordinary iteration, the experimenter
//! actively perturbs empty inputs to test whether a disabled submit-shaped
//! control becomes enabled, then restores every input no matter what
//! happened. Rollback is unconditional; it is the only transactional
//! guarantee this core makes.

use std::sync::Arc;
use std::time::Duration;

use browser_port::BrowserSession;
use decision_cascade::classifiers::{is_coming_soon, is_submit_shaped};
use decision_cascade::CausalRule;
use element_scan::ElementDescriptor;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::ExploreConfig;
use crate::knowledge::{KnowledgeStore, PatternRecord};
use crate::state::ExplorationState;

pub struct CausalExperimenter {
    session: Arc<dyn BrowserSession>,
    op_timeout: Duration,
    probe_timeout: Duration,
}

impl CausalExperimenter {
    pub fn new(session: Arc<dyn BrowserSession>, config: &ExploreConfig) -> Self {
        Self {
            session,
            op_timeout: config.op_timeout(),
            probe_timeout: config.probe_timeout(),
        }
    }

    /// Run the disabled-submit experiment against every candidate button in
    /// scope. Returns the number of rules confirmed.
    pub async fn run(
        &self,
        elements: &[ElementDescriptor],
        state: &mut ExplorationState,
        knowledge: &dyn KnowledgeStore,
    ) -> usize {
        let buttons: Vec<&ElementDescriptor> = elements
            .iter()
            .filter(|e| is_submit_shaped(e) && !e.enabled && !is_coming_soon(e))
            .collect();
        if buttons.is_empty() {
            return 0;
        }

        let empty_inputs: Vec<&ElementDescriptor> = elements
            .iter()
            .filter(|e| e.is_empty_input() && e.visible)
            .collect();

        let mut confirmed = 0;
        for button in buttons {
            if empty_inputs.is_empty() {
                debug!(button = %button.selector, "no empty inputs; experiment skipped");
                continue;
            }
            if self.experiment(button, &empty_inputs, state, knowledge).await {
                confirmed += 1;
            }
        }
        confirmed
    }

    /// One perturb/re-probe/rollback cycle for a single button.
    async fn experiment(
        &self,
        button: &ElementDescriptor,
        inputs: &[&ElementDescriptor],
        state: &mut ExplorationState,
        knowledge: &dyn KnowledgeStore,
    ) -> bool {
        let mut perturbed: Vec<(&ElementDescriptor, String)> = Vec::new();
        let mut apply_failed = false;

        for input in inputs {
            let original = input.value.clone().unwrap_or_default();
            let synthetic = tool_interact::values::synthetic_value_for(input);
            match self
                .session
                .fill(&input.handle, &synthetic, self.op_timeout)
                .await
            {
                Ok(()) => perturbed.push((input, original)),
                Err(err) => {
                    warn!(input = %input.selector, "perturbation failed: {err}");
                    apply_failed = true;
                    break;
                }
            }
        }

        let became_enabled = if apply_failed {
            false
        } else {
            match tokio::time::timeout(self.probe_timeout, self.session.describe(&button.handle))
                .await
            {
                Ok(Ok(snapshot)) => snapshot.enabled,
                Ok(Err(err)) => {
                    warn!(button = %button.selector, "re-probe failed: {err}");
                    false
                }
                Err(_) => false,
            }
        };

        // Rollback is unconditional: every perturbed input gets its original
        // value back before the experiment's result is used.
        for (input, original) in &perturbed {
            if let Err(err) = self
                .session
                .fill(&input.handle, original, self.op_timeout)
                .await
            {
                warn!(input = %input.selector, "rollback failed: {err}");
            }
        }

        if !became_enabled {
            debug!(button = %button.selector, "experiment did not confirm a rule");
            return false;
        }

        let input_selectors: Vec<String> =
            perturbed.iter().map(|(i, _)| i.selector.clone()).collect();
        let rule = CausalRule::disabled_submit(button.selector.clone(), input_selectors.clone());
        info!(
            button = %button.selector,
            inputs = input_selectors.len(),
            "causal rule confirmed: filling inputs enables the submit"
        );

        let record = PatternRecord {
            kind: "causal_rule".to_string(),
            confidence: rule.confidence,
            payload: json!({
                "pattern": rule.pattern,
                "cause": rule.cause,
                "solution": rule.solution,
                "button": rule.examples.button_selector,
                "inputs": rule.examples.input_selectors,
            }),
        };
        if let Err(err) = knowledge.store_pattern(record).await {
            warn!("causal rule mirror failed: {err}");
        }

        state.causal.add(rule);
        true
    }
}
