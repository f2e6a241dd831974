//! Noise filter for discovery output.
//!
//! Calendar chrome and locale display rows look like buttons to a structural
//! scan but are never meaningful exploration targets on their own: a day
//! cell only makes sense as part of completing its picker, a country row as
//! part of completing its dropdown. Filtering them here keeps the decision
//! cascade working on real controls.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ElementDescriptor, ElementKind};

static DAY_OF_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").unwrap());
static YEAR_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());
static FORMATTED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}|(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(,?\s+\d{4})?)$",
    )
    .unwrap()
});

const MONTH_NAMES: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Rendered market/country rows seen in locale pickers. Not exhaustive; the
/// role=option handling in discovery catches the long tail.
const COUNTRY_NAMES: &[&str] = &[
    "united states", "united kingdom", "canada", "australia", "germany", "france", "spain",
    "italy", "netherlands", "belgium", "sweden", "norway", "denmark", "finland", "ireland",
    "austria", "switzerland", "portugal", "poland", "czech republic", "romania", "greece",
    "brazil", "mexico", "argentina", "chile", "colombia", "peru", "japan", "china", "india",
    "singapore", "hong kong", "south korea", "new zealand", "south africa", "nigeria", "kenya",
    "israel", "turkey", "ukraine", "estonia", "latvia", "lithuania",
];

/// True when the element is decorative chrome rather than an actionable
/// target. `nested_overlay` is set while discovery runs inside an open
/// overlay, where day-of-month cells appear.
pub fn is_noise(element: &ElementDescriptor, nested_overlay: bool) -> bool {
    let text = element.text.trim();
    if text.is_empty() {
        return false;
    }
    let lower = text.to_ascii_lowercase();

    // Numeric day cells are only noise inside an open picker overlay; a
    // bare "2" button on a page might be pagination.
    if nested_overlay
        && matches!(element.kind, ElementKind::Button | ElementKind::Unknown)
        && DAY_OF_MONTH.is_match(text)
    {
        return true;
    }

    if MONTH_NAMES.contains(&lower.as_str()) || month_year_header(&lower) {
        return true;
    }
    if YEAR_LABEL.is_match(text) {
        return true;
    }
    if FORMATTED_DATE.is_match(text) {
        return true;
    }
    if nested_overlay && COUNTRY_NAMES.contains(&lower.as_str()) {
        return true;
    }

    false
}

/// Headers like "March 2024" shown at the top of a calendar.
fn month_year_header(lower: &str) -> bool {
    let mut parts = lower.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(month), Some(year), None) => {
            MONTH_NAMES.contains(&month) && YEAR_LABEL.is_match(year)
        }
        _ => false,
    }
}
