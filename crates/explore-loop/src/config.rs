//! Configuration for one exploration run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables of the exploration loop. The confidence constants mirror the
/// observed behavior of the heuristics but are not load-bearing for
/// correctness, which is why they live here rather than as hard invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreConfig {
    /// Maximum recursive traversal depth (overlay pushes and navigations).
    /// Default: 3
    pub max_depth: u32,

    /// Timeout for state-changing operations (click, fill, navigate).
    /// Default: 10000
    pub op_timeout_ms: u64,

    /// Timeout for read-only probes (query, describe, scope resolution).
    /// Short so a missing overlay never stalls the run.
    /// Default: 1000
    pub probe_timeout_ms: u64,

    /// Overlay identifiers the agent must never open. Matched exactly or by
    /// substring against overlay identities and trigger texts.
    pub skip_overlays: Vec<String>,

    /// Element texts/selectors the agent must never interact with.
    pub blocked_elements: Vec<String>,

    /// Maximum sequential form steps before returning to the parent.
    /// Default: 5
    pub max_form_steps: u32,

    /// Maximum same-overlay sub-steps when a click changes the content of a
    /// still-open overlay. Default: 3
    pub max_overlay_steps: u32,

    /// Confidence bump applied when a close-control outcome confirms the
    /// pattern. Default: 0.1
    pub close_confidence_step: f64,

    /// Cap for the close-control pattern. Default: 0.95
    pub close_confidence_cap: f64,

    /// Confidence bump for navigation-trigger outcomes. Default: 0.1
    pub nav_confidence_step: f64,

    /// Cap for the navigation-trigger pattern. Default: 0.90
    pub nav_confidence_cap: f64,

    /// Learned close-control confidence above which matching elements are
    /// skipped by the cascade. Default: 0.8
    pub pattern_skip_threshold: f64,

    /// URL/overlay vocabulary that marks a context as form-like.
    pub form_markers: Vec<String>,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            op_timeout_ms: 10_000,
            probe_timeout_ms: 1_000,
            skip_overlays: Vec::new(),
            blocked_elements: Vec::new(),
            max_form_steps: 5,
            max_overlay_steps: 3,
            close_confidence_step: 0.1,
            close_confidence_cap: 0.95,
            nav_confidence_step: 0.1,
            nav_confidence_cap: 0.90,
            pattern_skip_threshold: 0.8,
            form_markers: default_form_markers(),
        }
    }
}

fn default_form_markers() -> Vec<String> {
    [
        "signup", "sign-up", "signin", "sign-in", "login", "log-in", "register", "registration",
        "onboarding", "kyc", "verify", "verification", "auth", "account", "checkout",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ExploreConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// A context is form-like when its URL or its overlay identity matches
    /// the auth/KYC/onboarding vocabulary.
    pub fn is_form_like(&self, url: &str, overlay: Option<&str>) -> bool {
        let url = url.to_ascii_lowercase();
        if self.form_markers.iter().any(|m| url.contains(m.as_str())) {
            return true;
        }
        match overlay {
            Some(overlay) => {
                let overlay = overlay.to_ascii_lowercase();
                self.form_markers.iter().any(|m| overlay.contains(m.as_str()))
            }
            None => false,
        }
    }
}
