//! Text and attribute shape classifiers.
//!
//! Duck-typing over button text and attributes, expressed as a small ordered
//! set of pure functions so each heuristic can be unit-tested on its own.
//! [`classify`] applies them in order; the first hit wins.

use element_scan::{ElementDescriptor, ElementKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Classification;

static SUBMIT_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(continue|submit|create( account)?|next|sign ?up|sign ?in|log ?in|register|confirm|save|send|verify|get started|proceed|finish|done|apply)\b",
    )
    .unwrap()
});

static CLOSE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(close|cancel|dismiss|not now|maybe later|skip|[×✕x✖])$").unwrap());

static DATE_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(date|calendar|birth|dob|dd[/.\-]?mm|mm[/.\-]?dd|yyyy)").unwrap());

/// Submit-shaped: an explicit submit type or submit-like leading text.
pub fn is_submit_shaped(element: &ElementDescriptor) -> bool {
    if element.attr("type") == Some("submit") {
        return true;
    }
    matches!(element.kind, ElementKind::Button) && SUBMIT_TEXT.is_match(element.text.trim())
}

/// Placeholder controls that look like submits but lead nowhere.
pub fn is_coming_soon(element: &ElementDescriptor) -> bool {
    element.text.to_ascii_lowercase().contains("coming soon")
}

/// Close-shaped: glyph or wording that dismisses the current surface.
pub fn is_close_shaped(element: &ElementDescriptor) -> bool {
    let label = element.attr("aria-label").unwrap_or("");
    if CLOSE_TEXT.is_match(label.trim()) {
        return true;
    }
    CLOSE_TEXT.is_match(element.text.trim())
}

/// Triggers that open a date picker rather than accepting typed text.
pub fn is_date_trigger(element: &ElementDescriptor) -> bool {
    if element.attr("type") == Some("date") {
        return true;
    }
    for attr in ["placeholder", "name", "id", "class", "aria-label"] {
        if element.attr(attr).map(|v| DATE_HINT.is_match(v)).unwrap_or(false) {
            return true;
        }
    }
    DATE_HINT.is_match(&element.text) && matches!(element.kind, ElementKind::Button | ElementKind::Input)
}

/// Triggers that open an option list (country/market pickers and the like).
pub fn is_selection_trigger(element: &ElementDescriptor) -> bool {
    matches!(element.kind, ElementKind::Dropdown | ElementKind::Select)
        || element.attr("aria-haspopup") == Some("listbox")
        || element.attr("role") == Some("combobox")
}

/// Ordered classifier chain: `ElementDescriptor -> Option<Classification>`.
pub type Classifier = fn(&ElementDescriptor) -> Option<Classification>;

fn close_classifier(element: &ElementDescriptor) -> Option<Classification> {
    is_close_shaped(element).then_some(Classification::CloseControl)
}

fn input_classifier(element: &ElementDescriptor) -> Option<Classification> {
    matches!(
        element.kind,
        ElementKind::Input | ElementKind::Checkbox | ElementKind::Select
    )
    .then_some(Classification::Input)
}

fn navigation_classifier(element: &ElementDescriptor) -> Option<Classification> {
    (matches!(element.kind, ElementKind::Link) || element.attr("href").is_some())
        .then_some(Classification::Navigation)
}

fn action_classifier(element: &ElementDescriptor) -> Option<Classification> {
    (matches!(element.kind, ElementKind::Button | ElementKind::Dropdown)
        || is_submit_shaped(element))
    .then_some(Classification::ActionControl)
}

/// Applied in order; first match wins.
pub const CLASSIFIERS: &[Classifier] = &[
    close_classifier,
    input_classifier,
    navigation_classifier,
    action_classifier,
];

/// Classify an element, defaulting to [`Classification::Unknown`].
pub fn classify(element: &ElementDescriptor) -> Classification {
    CLASSIFIERS
        .iter()
        .find_map(|classifier| classifier(element))
        .unwrap_or(Classification::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_port::NodeHandle;

    fn element(kind: ElementKind, text: &str, attrs: &[(&str, &str)]) -> ElementDescriptor {
        ElementDescriptor {
            selector: "test".into(),
            text: text.into(),
            kind,
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            visible: true,
            enabled: true,
            geometry: Default::default(),
            value: None,
            handle: NodeHandle(0),
        }
    }

    #[test]
    fn test_submit_shapes() {
        assert!(is_submit_shaped(&element(ElementKind::Button, "Continue", &[])));
        assert!(is_submit_shaped(&element(ElementKind::Button, "Sign up", &[])));
        assert!(is_submit_shaped(&element(ElementKind::Button, "Create account", &[])));
        assert!(is_submit_shaped(&element(
            ElementKind::Button,
            "anything",
            &[("type", "submit")]
        )));
        assert!(!is_submit_shaped(&element(ElementKind::Button, "Learn more", &[])));
        // Text shape alone is not enough on a non-button.
        assert!(!is_submit_shaped(&element(ElementKind::Link, "Continue", &[])));
    }

    #[test]
    fn test_coming_soon_placeholder() {
        assert!(is_coming_soon(&element(
            ElementKind::Button,
            "Trading (coming soon)",
            &[]
        )));
        assert!(!is_coming_soon(&element(ElementKind::Button, "Trading", &[])));
    }

    #[test]
    fn test_close_shapes() {
        assert!(is_close_shaped(&element(ElementKind::Button, "×", &[])));
        assert!(is_close_shaped(&element(ElementKind::Button, "Close", &[])));
        assert!(is_close_shaped(&element(
            ElementKind::Button,
            "",
            &[("aria-label", "close")]
        )));
        assert!(!is_close_shaped(&element(ElementKind::Button, "Close account", &[])));
    }

    #[test]
    fn test_date_triggers() {
        assert!(is_date_trigger(&element(ElementKind::Input, "", &[("type", "date")])));
        assert!(is_date_trigger(&element(
            ElementKind::Input,
            "",
            &[("placeholder", "DD/MM/YYYY")]
        )));
        assert!(is_date_trigger(&element(
            ElementKind::Button,
            "",
            &[("name", "dateOfBirth")]
        )));
        assert!(!is_date_trigger(&element(ElementKind::Button, "Continue", &[])));
    }

    #[test]
    fn test_selection_triggers() {
        assert!(is_selection_trigger(&element(ElementKind::Dropdown, "Country", &[])));
        assert!(is_selection_trigger(&element(ElementKind::Select, "", &[])));
        assert!(is_selection_trigger(&element(
            ElementKind::Button,
            "Country",
            &[("aria-haspopup", "listbox")]
        )));
        assert!(!is_selection_trigger(&element(ElementKind::Button, "Country", &[])));
    }

    #[test]
    fn test_classifier_order() {
        // Close outranks action even for button kinds.
        assert_eq!(
            classify(&element(ElementKind::Button, "Cancel", &[])),
            Classification::CloseControl
        );
        assert_eq!(
            classify(&element(ElementKind::Input, "", &[])),
            Classification::Input
        );
        assert_eq!(
            classify(&element(ElementKind::Link, "Docs", &[])),
            Classification::Navigation
        );
        assert_eq!(
            classify(&element(ElementKind::Button, "Open menu", &[])),
            Classification::ActionControl
        );
        assert_eq!(
            classify(&element(ElementKind::Unknown, "mystery", &[])),
            Classification::Unknown
        );
    }
}
