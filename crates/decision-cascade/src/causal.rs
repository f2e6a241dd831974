//! Discovered cause→effect rules.
//!
//! A causal rule is only ever created by a successful perturb/rollback
//! experiment (see the experimenter in the exploration loop) and is the
//! strongest signal the cascade has: it short-circuits stage 1.

use serde::{Deserialize, Serialize};

pub const PATTERN_DISABLED_SUBMIT: &str = "disabled_submit_button";
pub const CAUSE_EMPTY_INPUTS: &str = "empty_required_inputs";
pub const SOLUTION_FILL_ALL: &str = "fill_all_inputs";

/// Concrete selectors that demonstrated a rule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CausalExamples {
    pub button_selector: String,
    pub input_selectors: Vec<String>,
}

/// A discovered cause→fix mapping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CausalRule {
    pub pattern: String,
    pub cause: String,
    pub solution: String,
    pub confidence: f64,
    pub examples: CausalExamples,
}

impl CausalRule {
    /// The rule confirmed by the disabled-submit experiment.
    pub fn disabled_submit(button_selector: String, input_selectors: Vec<String>) -> Self {
        Self {
            pattern: PATTERN_DISABLED_SUBMIT.to_string(),
            cause: CAUSE_EMPTY_INPUTS.to_string(),
            solution: SOLUTION_FILL_ALL.to_string(),
            confidence: 1.0,
            examples: CausalExamples {
                button_selector,
                input_selectors,
            },
        }
    }
}

/// Rules confirmed during the current run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CausalMemory {
    rules: Vec<CausalRule>,
}

impl CausalMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: CausalRule) {
        self.rules.push(rule);
    }

    pub fn has_rule(&self, pattern: &str) -> bool {
        self.rules.iter().any(|r| r.pattern == pattern)
    }

    pub fn find(&self, pattern: &str) -> Option<&CausalRule> {
        self.rules.iter().find(|r| r.pattern == pattern)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
