use serde::{Deserialize, Serialize};

/// How a click should be carried out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClickStyle {
    /// Ordinary click, outcome observation only.
    Plain,
    /// Submit-shaped control: census the form before and after so a
    /// same-surface content change is reported as a new logical step.
    Submit,
    /// Open the control, then run the date completion routine.
    DatePicker,
    /// Open the control, then run the option completion routine.
    Dropdown,
}

/// Counts of visible interactive nodes, used to diff form content across a
/// submit click.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ElementCensus {
    pub inputs: usize,
    pub buttons: usize,
}

impl ElementCensus {
    pub fn differs_from(&self, other: &ElementCensus) -> bool {
        self.inputs != other.inputs || self.buttons != other.buttons
    }
}

/// What observably changed after an interaction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub success: bool,
    pub url_changed: bool,
    /// Identifier of a newly layered overlay, when one appeared that was not
    /// already on the caller's overlay stack.
    pub new_overlay: Option<String>,
    /// Same-surface form content changed (visible input count differs). The
    /// caller treats this as a new logical step, not a navigation.
    pub content_changed: bool,
    /// Short diagnostic for the interaction log.
    pub note: Option<String>,
}

impl InteractionOutcome {
    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            success: false,
            note: Some(note.into()),
            ..Self::default()
        }
    }
}
