//! The three-stage decision cascade.
//!
//! Stage 1 applies causal rules, only inside form-like contexts. Stage 2
//! walks the ordered learned/static pattern checks, including the caller's
//! overlay skip-list and element block-list. Stage 3 is the static fallback.
//! The cascade is a pure function of the element and an ambient
//! [`DecisionContext`]; probe failures never reach it — the discoverer
//! already degraded them to "absent".

use element_scan::{noise, ElementDescriptor, ElementKind};
use tracing::debug;

use crate::causal::{CausalMemory, PATTERN_DISABLED_SUBMIT};
use crate::classifiers::{
    classify, is_close_shaped, is_coming_soon, is_date_trigger, is_selection_trigger,
    is_submit_shaped,
};
use crate::model::{Classification, DecisionResult, ElementAction};
use crate::patterns::{PatternBook, PatternKind};

/// Ambient facts the cascade needs about the current exploration context.
#[derive(Clone, Copy, Debug)]
pub struct DecisionContext<'a> {
    /// URL or overlay identity matched the auth/KYC/onboarding vocabulary.
    pub form_like: bool,
    /// Identifier of the overlay the element lives in, if any.
    pub nested_overlay: Option<&'a str>,
    /// A disabled submit-shaped control is currently present in scope.
    pub has_disabled_submit: bool,
    pub causal: &'a CausalMemory,
    pub patterns: &'a PatternBook,
    /// Overlay identifiers the caller never wants opened.
    pub skip_overlays: &'a [String],
    /// Element texts/selectors the caller never wants touched.
    pub blocked_elements: &'a [String],
    /// Learned close-control confidence above which matches are skipped.
    pub pattern_skip_threshold: f64,
}

/// Stateless engine applying the cascade.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, element: &ElementDescriptor, ctx: &DecisionContext<'_>) -> DecisionResult {
        let decision = self
            .causal_stage(element, ctx)
            .or_else(|| self.pattern_stage(element, ctx))
            .unwrap_or_else(|| self.static_stage(element));
        debug!(
            key = %element.key(),
            action = ?decision.action,
            confidence = decision.confidence,
            "decision: {}",
            decision.reason
        );
        decision
    }

    /// Stage 1: causal rules, form-like contexts only.
    fn causal_stage(
        &self,
        element: &ElementDescriptor,
        ctx: &DecisionContext<'_>,
    ) -> Option<DecisionResult> {
        if !ctx.form_like {
            return None;
        }

        if is_submit_shaped(element)
            && !element.enabled
            && !is_coming_soon(element)
            && ctx.causal.has_rule(PATTERN_DISABLED_SUBMIT)
        {
            return Some(DecisionResult::act(
                ElementAction::ExploreDeeper,
                "disabled submit with a known causal fix: fill inputs first",
                0.95,
                Classification::ActionControl,
            ));
        }

        if element.is_empty_input() && ctx.has_disabled_submit {
            return Some(DecisionResult::act(
                ElementAction::Fill,
                "empty input while a disabled submit control is present",
                0.9,
                Classification::Input,
            ));
        }

        None
    }

    /// Stage 2: ordered learned/static pattern checks.
    fn pattern_stage(
        &self,
        element: &ElementDescriptor,
        ctx: &DecisionContext<'_>,
    ) -> Option<DecisionResult> {
        // (a) interacting would open an overlay the caller asked to avoid.
        if let Some(entry) = matches_skip_overlay(element, ctx.skip_overlays) {
            return Some(DecisionResult::skip(
                format!("would open skip-listed overlay '{entry}'"),
                1.0,
                classify(element),
            ));
        }

        // (b) explicit caller block-list.
        if let Some(entry) = matches_block_list(element, ctx.blocked_elements) {
            return Some(DecisionResult::skip(
                format!("element is block-listed ('{entry}')"),
                1.0,
                classify(element),
            ));
        }

        // (c) calendar/locale noise; the discoverer already filters this,
        // kept as a safety net.
        if noise::is_noise(element, ctx.nested_overlay.is_some()) {
            return Some(DecisionResult::skip(
                "calendar or locale chrome",
                0.9,
                Classification::Unknown,
            ));
        }

        // (d) inputs fill in form context and are left alone otherwise.
        if element.is_text_entry() {
            return Some(if ctx.form_like {
                DecisionResult::act(
                    ElementAction::Fill,
                    "input inside a form-like context",
                    0.8,
                    Classification::Input,
                )
            } else {
                DecisionResult::skip(
                    "input outside a form-like context",
                    0.7,
                    Classification::Input,
                )
            });
        }

        // (e) date/selection triggers run a completion routine.
        if is_date_trigger(element) || is_selection_trigger(element) {
            return Some(DecisionResult::act(
                ElementAction::Click,
                "picker trigger; completed atomically rather than explored",
                0.85,
                Classification::ActionControl,
            ));
        }

        // Close-shaped controls are never exploration targets; the machine
        // dismisses overlays programmatically instead.
        if is_close_shaped(element) {
            let confidence = ctx
                .patterns
                .confidence(PatternKind::CloseControl)
                .unwrap_or(0.6);
            return Some(DecisionResult::skip(
                "close-shaped control",
                confidence,
                Classification::CloseControl,
            ));
        }

        // (f) enabled non-form buttons keep the exploration moving.
        if matches!(element.kind, ElementKind::Button) && element.enabled && !ctx.form_like {
            return Some(DecisionResult::act(
                ElementAction::Click,
                "enabled feature control",
                0.75,
                Classification::ActionControl,
            ));
        }

        // (g) learned close-control examples above the confidence threshold.
        if let Some(confidence) = ctx.patterns.confidence(PatternKind::CloseControl) {
            if confidence > ctx.pattern_skip_threshold
                && ctx.patterns.has_example(PatternKind::CloseControl, &element.selector)
            {
                return Some(DecisionResult::skip(
                    "learned close-control pattern",
                    confidence,
                    Classification::CloseControl,
                ));
            }
        }

        None
    }

    /// Stage 3: static fallback rules.
    fn static_stage(&self, element: &ElementDescriptor) -> DecisionResult {
        if is_submit_shaped(element) {
            return if element.enabled {
                DecisionResult::act(
                    ElementAction::Click,
                    "enabled submit-shaped control",
                    0.7,
                    Classification::ActionControl,
                )
            } else {
                DecisionResult::skip(
                    "disabled submit-shaped control",
                    0.8,
                    Classification::ActionControl,
                )
            };
        }

        if matches!(element.kind, ElementKind::Button) && !element.enabled {
            return DecisionResult::skip("disabled control", 0.8, Classification::ActionControl);
        }

        if matches!(element.kind, ElementKind::Link) {
            return DecisionResult::act(
                ElementAction::Click,
                "link",
                0.6,
                Classification::Navigation,
            );
        }

        DecisionResult::skip("no applicable rule", 0.5, Classification::Unknown)
    }
}

/// Canonical form for skip-list matching: lowercase alphanumerics only, so
/// "Log In" matches an overlay id like "login-modal".
fn canon(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn matches_skip_overlay<'a>(
    element: &ElementDescriptor,
    skip_overlays: &'a [String],
) -> Option<&'a str> {
    let text = canon(&element.text);
    let controls = element
        .attr("aria-controls")
        .or_else(|| element.attr("data-target"))
        .map(canon);

    skip_overlays.iter().map(String::as_str).find(|entry| {
        let entry_canon = canon(entry);
        if entry_canon.is_empty() {
            return false;
        }
        if let Some(controls) = &controls {
            if controls == &entry_canon {
                return true;
            }
        }
        !text.is_empty() && (entry_canon.contains(&text) || text.contains(&entry_canon))
    })
}

fn matches_block_list<'a>(element: &ElementDescriptor, blocked: &'a [String]) -> Option<&'a str> {
    blocked.iter().map(String::as_str).find(|entry| {
        element.text.eq_ignore_ascii_case(entry) || element.selector.contains(*entry)
    })
}
