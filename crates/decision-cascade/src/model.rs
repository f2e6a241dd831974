use serde::{Deserialize, Serialize};

/// Action chosen for one element.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementAction {
    Skip,
    Click,
    Fill,
    /// Re-enter the surrounding context with a form-specific strategy
    /// instead of acting on the element directly.
    ExploreDeeper,
}

/// Semantic role the cascade assigned to the element.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    CloseControl,
    ActionControl,
    Input,
    Navigation,
    Unknown,
}

/// Outcome of the cascade for one element visit. Immutable; produced once
/// per element per visit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionResult {
    pub interact: bool,
    pub action: ElementAction,
    pub reason: String,
    /// Confidence in [0,1].
    pub confidence: f64,
    pub classification: Classification,
}

impl DecisionResult {
    pub fn skip(
        reason: impl Into<String>,
        confidence: f64,
        classification: Classification,
    ) -> Self {
        Self {
            interact: false,
            action: ElementAction::Skip,
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
            classification,
        }
    }

    pub fn act(
        action: ElementAction,
        reason: impl Into<String>,
        confidence: f64,
        classification: Classification,
    ) -> Self {
        Self {
            interact: !matches!(action, ElementAction::Skip),
            action,
            reason: reason.into(),
            confidence: confidence.clamp(0.0, 1.0),
            classification,
        }
    }
}
