use std::collections::HashMap;

use browser_port::{NodeHandle, NodeSnapshot, Rect};
use serde::{Deserialize, Serialize};

/// Structural category of a discovered element.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Button,
    Input,
    Link,
    Modal,
    Dropdown,
    Checkbox,
    Select,
    Unknown,
}

/// Snapshot of one candidate interactive node, created fresh per discovery
/// pass and never persisted across sessions.
#[derive(Clone, Debug)]
pub struct ElementDescriptor {
    /// Stable, human-readable locator string (see [`crate::selector`]).
    pub selector: String,
    /// Trimmed display text, truncated for key purposes.
    pub text: String,
    pub kind: ElementKind,
    pub attributes: HashMap<String, String>,
    pub visible: bool,
    pub enabled: bool,
    pub geometry: Rect,
    /// Current value for input-like nodes.
    pub value: Option<String>,
    /// Live handle back to the node; invalidated by navigation.
    pub handle: NodeHandle,
}

impl ElementDescriptor {
    /// Deduplication key: selector plus display text. An element key is
    /// processed at most once per run.
    pub fn key(&self) -> String {
        format!("{}|{}", self.selector, self.text)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// True for nodes whose value can be typed into.
    pub fn is_text_entry(&self) -> bool {
        matches!(self.kind, ElementKind::Input)
    }

    /// True when the input currently holds no user-visible value.
    pub fn is_empty_input(&self) -> bool {
        self.is_text_entry()
            && self
                .value
                .as_deref()
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
    }

    /// Classify a raw snapshot into a structural kind.
    pub fn kind_of(snapshot: &NodeSnapshot) -> ElementKind {
        let tag = snapshot.tag.to_ascii_lowercase();
        let role = snapshot.attr("role").unwrap_or("").to_ascii_lowercase();
        let class = snapshot.attr("class").unwrap_or("").to_ascii_lowercase();

        if role == "dialog" || role == "alertdialog" {
            return ElementKind::Modal;
        }
        if tag == "select" {
            return ElementKind::Select;
        }
        if tag == "input" {
            return match snapshot.attr("type").unwrap_or("text") {
                "checkbox" | "radio" => ElementKind::Checkbox,
                "submit" | "button" | "image" => ElementKind::Button,
                _ => ElementKind::Input,
            };
        }
        if tag == "textarea" {
            return ElementKind::Input;
        }
        if snapshot.attr("aria-haspopup") == Some("listbox")
            || class.contains("dropdown")
            || role == "combobox"
        {
            return ElementKind::Dropdown;
        }
        if tag == "button" || role == "button" {
            return ElementKind::Button;
        }
        if tag == "a" {
            return ElementKind::Link;
        }
        ElementKind::Unknown
    }

    /// Build a descriptor from a snapshot and a pre-synthesized selector.
    pub fn from_snapshot(handle: NodeHandle, snapshot: &NodeSnapshot, selector: String) -> Self {
        Self {
            selector,
            text: compact_text(&snapshot.text),
            kind: Self::kind_of(snapshot),
            attributes: snapshot.attributes.clone(),
            visible: snapshot.visible,
            enabled: snapshot.enabled,
            geometry: snapshot.geometry,
            value: snapshot.value.clone(),
            handle,
        }
    }
}

/// Collapse whitespace and truncate so keys stay readable in logs.
pub fn compact_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() > 60 {
        let mut cut = 60;
        while !collapsed.is_char_boundary(cut) {
            cut -= 1;
        }
        collapsed[..cut].to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: &str, attrs: &[(&str, &str)]) -> NodeSnapshot {
        NodeSnapshot {
            tag: tag.into(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..NodeSnapshot::default()
        }
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ElementDescriptor::kind_of(&snap("button", &[])), ElementKind::Button);
        assert_eq!(
            ElementDescriptor::kind_of(&snap("div", &[("role", "button")])),
            ElementKind::Button
        );
        assert_eq!(
            ElementDescriptor::kind_of(&snap("input", &[("type", "submit")])),
            ElementKind::Button
        );
        assert_eq!(
            ElementDescriptor::kind_of(&snap("input", &[("type", "checkbox")])),
            ElementKind::Checkbox
        );
        assert_eq!(ElementDescriptor::kind_of(&snap("input", &[])), ElementKind::Input);
        assert_eq!(ElementDescriptor::kind_of(&snap("textarea", &[])), ElementKind::Input);
        assert_eq!(ElementDescriptor::kind_of(&snap("select", &[])), ElementKind::Select);
        assert_eq!(ElementDescriptor::kind_of(&snap("a", &[])), ElementKind::Link);
        assert_eq!(
            ElementDescriptor::kind_of(&snap("div", &[("role", "dialog")])),
            ElementKind::Modal
        );
        assert_eq!(
            ElementDescriptor::kind_of(&snap("div", &[("aria-haspopup", "listbox")])),
            ElementKind::Dropdown
        );
        assert_eq!(ElementDescriptor::kind_of(&snap("div", &[])), ElementKind::Unknown);
    }

    #[test]
    fn test_key_combines_selector_and_text() {
        let mut snapshot = snap("button", &[]);
        snapshot.text = "  Save   changes ".into();
        let desc =
            ElementDescriptor::from_snapshot(NodeHandle(1), &snapshot, "button".to_string());
        assert_eq!(desc.key(), "button|Save changes");
    }

    #[test]
    fn test_compact_text_truncates() {
        let long = "x".repeat(200);
        assert_eq!(compact_text(&long).len(), 60);
    }

    #[test]
    fn test_empty_input_detection() {
        let mut snapshot = snap("input", &[]);
        snapshot.value = Some("  ".into());
        let desc = ElementDescriptor::from_snapshot(NodeHandle(2), &snapshot, "input".into());
        assert!(desc.is_empty_input());

        let mut filled = snap("input", &[]);
        filled.value = Some("hello".into());
        let desc = ElementDescriptor::from_snapshot(NodeHandle(3), &filled, "input".into());
        assert!(!desc.is_empty_input());
    }
}
