use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque handle to a live DOM node held by the session implementation.
///
/// Handles are only valid for the page state they were resolved against; any
/// navigation or overlay transition may invalidate them, which surfaces as
/// [`crate::BrowserError::NotFound`] on the next use.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// Bounding geometry of a node in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Read-only snapshot of a node taken at probe time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub visible: bool,
    pub enabled: bool,
    pub geometry: Rect,
    /// Current value for input-like nodes, `None` otherwise.
    pub value: Option<String>,
}

impl NodeSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// True for nodes that accept typed text.
    pub fn is_text_entry(&self) -> bool {
        if self.tag.eq_ignore_ascii_case("textarea") {
            return true;
        }
        if !self.tag.eq_ignore_ascii_case("input") {
            return false;
        }
        !matches!(
            self.attr("type").unwrap_or("text"),
            "button" | "submit" | "checkbox" | "radio" | "hidden" | "file" | "image" | "range"
        )
    }
}

/// Condition variants accepted by [`crate::BrowserSession::wait_for`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitCondition {
    /// A node matching the selector exists in the current scope.
    SelectorPresent(String),
    /// The document URL differs from the given one.
    UrlChangedFrom(String),
    /// The DOM has settled (no pending mutations for a quiet window).
    DomSettled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(ty: &str) -> NodeSnapshot {
        let mut snap = NodeSnapshot {
            tag: "input".into(),
            ..NodeSnapshot::default()
        };
        snap.attributes.insert("type".into(), ty.into());
        snap
    }

    #[test]
    fn test_text_entry_detection() {
        assert!(input("text").is_text_entry());
        assert!(input("email").is_text_entry());
        assert!(!input("submit").is_text_entry());
        assert!(!input("checkbox").is_text_entry());

        let area = NodeSnapshot {
            tag: "textarea".into(),
            ..NodeSnapshot::default()
        };
        assert!(area.is_text_entry());

        let button = NodeSnapshot {
            tag: "button".into(),
            ..NodeSnapshot::default()
        };
        assert!(!button.is_text_entry());
    }

    #[test]
    fn test_untyped_input_defaults_to_text() {
        let snap = NodeSnapshot {
            tag: "input".into(),
            ..NodeSnapshot::default()
        };
        assert!(snap.is_text_entry());
    }
}
