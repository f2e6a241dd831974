//! Synthetic input values.
//!
//! Value choice is attribute sniffing over name/id/placeholder/type and the
//! accessibility label. Values are deliberately inert test data.

use element_scan::ElementDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(phone|mobile|tel)").unwrap());
static FIRST_NAME_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(first[_\-]?name|given[_\-]?name|fname)").unwrap());
static LAST_NAME_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(last[_\-]?name|sur[_\-]?name|family[_\-]?name|lname)").unwrap());
static DATE_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(date|birth|dob)").unwrap());
static POSTAL_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(zip|postal|postcode)").unwrap());

/// Pick a synthetic value appropriate for the input's apparent meaning.
pub fn synthetic_value_for(element: &ElementDescriptor) -> String {
    let hints = hint_string(element);

    if element.attr("type") == Some("email") || hints.contains("email") {
        return "qa.explorer@example.com".to_string();
    }
    if element.attr("type") == Some("password") || hints.contains("password") {
        return "Str0ng!Passw0rd".to_string();
    }
    if element.attr("type") == Some("tel") || PHONE_HINT.is_match(&hints) {
        return "+15555550123".to_string();
    }
    if FIRST_NAME_HINT.is_match(&hints) {
        return "Alex".to_string();
    }
    if LAST_NAME_HINT.is_match(&hints) {
        return "Morgan".to_string();
    }
    if hints.contains("name") {
        return "Alex Morgan".to_string();
    }
    if element.attr("type") == Some("date") || DATE_HINT.is_match(&hints) {
        return "1990-01-15".to_string();
    }
    if POSTAL_HINT.is_match(&hints) {
        return "94105".to_string();
    }
    if element.attr("type") == Some("number") || hints.contains("amount") {
        return "42".to_string();
    }
    if element.attr("type") == Some("url") || hints.contains("website") {
        return "https://example.com".to_string();
    }
    if element.attr("type") == Some("search") || hints.contains("search") {
        return "test".to_string();
    }
    "Test input".to_string()
}

fn hint_string(element: &ElementDescriptor) -> String {
    ["name", "id", "placeholder", "aria-label", "autocomplete"]
        .iter()
        .filter_map(|attr| element.attr(attr))
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
