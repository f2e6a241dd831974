//! Selector synthesis.
//!
//! Produces a stable, human-readable locator string for a node using a fixed
//! priority order: explicit test identifier, id, name, accessible label,
//! placeholder, role plus text, tag plus text, a whitelist of non-utility
//! class names, bare tag. Synthesis never fails; when nothing usable exists
//! the generic tag (or `unknown`) is returned so discovery keeps going.

use browser_port::NodeSnapshot;

use crate::model::compact_text;

/// Attributes treated as explicit test identifiers, in preference order.
const TEST_ID_ATTRS: &[&str] = &["data-testid", "data-test", "data-cy"];

/// Class fragments that carry meaning; utility/layout classes are ignored.
const CLASS_WHITELIST: &[&str] = &[
    "submit", "login", "signup", "register", "continue", "next", "confirm", "cancel", "close",
    "primary", "cta", "menu", "nav", "search", "card", "modal", "dropdown",
];

const MAX_TEXT_LEN: usize = 40;

/// Synthesize a locator string for the snapshot.
pub fn synthesize(snapshot: &NodeSnapshot) -> String {
    for attr in TEST_ID_ATTRS {
        if let Some(value) = non_empty(snapshot.attr(attr)) {
            return format!("[{}=\"{}\"]", attr, escape(value));
        }
    }

    if let Some(id) = non_empty(snapshot.attr("id")) {
        if is_css_identifier(id) {
            return format!("#{}", id);
        }
        return format!("[id=\"{}\"]", escape(id));
    }

    if let Some(name) = non_empty(snapshot.attr("name")) {
        return format!("[name=\"{}\"]", escape(name));
    }

    if let Some(label) = non_empty(snapshot.attr("aria-label")) {
        return format!("[aria-label=\"{}\"]", escape(label));
    }

    if let Some(placeholder) = non_empty(snapshot.attr("placeholder")) {
        return format!("[placeholder=\"{}\"]", escape(placeholder));
    }

    let tag = tag_or_unknown(snapshot);
    let text = clipped_text(snapshot);

    if let (Some(role), Some(text)) = (non_empty(snapshot.attr("role")), text.as_deref()) {
        return format!("[role=\"{}\"]:text(\"{}\")", escape(role), escape(text));
    }

    if let Some(text) = text.as_deref() {
        return format!("{}:text(\"{}\")", tag, escape(text));
    }

    if let Some(class) = meaningful_class(snapshot) {
        return format!("{}.{}", tag, class);
    }

    tag.to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn tag_or_unknown(snapshot: &NodeSnapshot) -> String {
    let tag = snapshot.tag.trim().to_ascii_lowercase();
    if tag.is_empty() {
        "unknown".to_string()
    } else {
        tag
    }
}

fn clipped_text(snapshot: &NodeSnapshot) -> Option<String> {
    let text = compact_text(&snapshot.text);
    if text.is_empty() {
        return None;
    }
    let mut clipped = text;
    if clipped.len() > MAX_TEXT_LEN {
        let mut cut = MAX_TEXT_LEN;
        while !clipped.is_char_boundary(cut) {
            cut -= 1;
        }
        clipped.truncate(cut);
    }
    Some(clipped)
}

fn meaningful_class(snapshot: &NodeSnapshot) -> Option<String> {
    let classes = snapshot.attr("class")?;
    classes
        .split_whitespace()
        .find(|class| {
            let lower = class.to_ascii_lowercase();
            CLASS_WHITELIST
                .iter()
                .any(|fragment| lower.contains(fragment))
        })
        .map(str::to_string)
}

fn is_css_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
