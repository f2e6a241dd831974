//! Outcome-driven pattern learning.
//!
//! After every executed interaction (including programmatic overlay
//! dismissal) the learner inspects what changed and reinforces the matching
//! heuristic. Confidence only rises, in configured steps up to configured
//! caps, and every update is mirrored to the knowledge store. Store failures
//! are logged and ignored; learning is best-effort persistence-wise.

use decision_cascade::{Classification, PatternKind};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ExploreConfig;
use crate::knowledge::{KnowledgeStore, PatternRecord, SelectorRecord};
use crate::state::ExplorationState;

/// What the learner needs to know about an observed outcome.
#[derive(Clone, Copy, Debug)]
pub struct Observation<'a> {
    pub classification: Classification,
    pub selector: &'a str,
    pub url_changed: bool,
    pub opened_overlay: bool,
    /// The element's interaction (or the dismissal it was used for) made an
    /// overlay disappear.
    pub closed_overlay: bool,
}

pub struct PatternLearner;

impl PatternLearner {
    /// Absorb one outcome into the run's pattern book.
    pub async fn absorb(
        state: &mut ExplorationState,
        knowledge: &dyn KnowledgeStore,
        config: &ExploreConfig,
        observation: Observation<'_>,
    ) {
        let mut updated: Option<(PatternKind, f64)> = None;

        if observation.classification == Classification::CloseControl
            && (observation.closed_overlay || observation.url_changed)
        {
            let confidence = state.patterns.reinforce(
                PatternKind::CloseControl,
                observation.selector,
                config.close_confidence_step,
                config.close_confidence_cap,
            );
            updated = Some((PatternKind::CloseControl, confidence));
        } else if observation.url_changed && !observation.opened_overlay {
            let confidence = state.patterns.reinforce(
                PatternKind::NavigationTrigger,
                observation.selector,
                config.nav_confidence_step,
                config.nav_confidence_cap,
            );
            updated = Some((PatternKind::NavigationTrigger, confidence));
        }

        let Some((kind, confidence)) = updated else {
            return;
        };
        debug!(kind = kind.as_str(), confidence, selector = observation.selector, "pattern reinforced");

        let examples = state
            .patterns
            .get(kind)
            .map(|p| p.examples.clone())
            .unwrap_or_default();
        let pattern_record = PatternRecord {
            kind: kind.as_str().to_string(),
            confidence,
            payload: json!({ "examples": examples }),
        };
        if let Err(err) = knowledge.store_pattern(pattern_record).await {
            warn!("pattern mirror failed: {err}");
        }
        let selector_record = SelectorRecord {
            selector: observation.selector.to_string(),
            text: String::new(),
            kind: kind.as_str().to_string(),
            context: state.context().to_string(),
            confidence,
        };
        if let Err(err) = knowledge.store_selector(selector_record).await {
            warn!("selector mirror failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::NoopKnowledgeStore;
    use uiscout_core_types::RunId;

    fn observation(classification: Classification) -> Observation<'static> {
        Observation {
            classification,
            selector: "#close",
            url_changed: false,
            opened_overlay: false,
            closed_overlay: false,
        }
    }

    #[tokio::test]
    async fn test_close_control_bump_on_overlay_close() {
        let mut state = ExplorationState::new(RunId::new());
        let config = ExploreConfig::default();

        let mut obs = observation(Classification::CloseControl);
        obs.closed_overlay = true;
        PatternLearner::absorb(&mut state, &NoopKnowledgeStore, &config, obs).await;

        let confidence = state.patterns.confidence(PatternKind::CloseControl).unwrap();
        assert!((confidence - 0.6).abs() < 1e-9);
        assert!(state.patterns.has_example(PatternKind::CloseControl, "#close"));
    }

    #[tokio::test]
    async fn test_navigation_bump_requires_no_new_overlay() {
        let mut state = ExplorationState::new(RunId::new());
        let config = ExploreConfig::default();

        let mut obs = observation(Classification::ActionControl);
        obs.url_changed = true;
        obs.opened_overlay = true;
        PatternLearner::absorb(&mut state, &NoopKnowledgeStore, &config, obs).await;
        assert!(state.patterns.confidence(PatternKind::NavigationTrigger).is_none());

        obs.opened_overlay = false;
        PatternLearner::absorb(&mut state, &NoopKnowledgeStore, &config, obs).await;
        let confidence = state
            .patterns
            .confidence(PatternKind::NavigationTrigger)
            .unwrap();
        assert!((confidence - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_no_bump_without_observable_change() {
        let mut state = ExplorationState::new(RunId::new());
        let config = ExploreConfig::default();
        PatternLearner::absorb(
            &mut state,
            &NoopKnowledgeStore,
            &config,
            observation(Classification::CloseControl),
        )
        .await;
        assert!(state.patterns.is_empty());
    }

    #[tokio::test]
    async fn test_caps_respected_over_many_outcomes() {
        let mut state = ExplorationState::new(RunId::new());
        let config = ExploreConfig::default();
        for _ in 0..20 {
            let mut obs = observation(Classification::CloseControl);
            obs.closed_overlay = true;
            PatternLearner::absorb(&mut state, &NoopKnowledgeStore, &config, obs).await;
        }
        let confidence = state.patterns.confidence(PatternKind::CloseControl).unwrap();
        assert!(confidence <= config.close_confidence_cap + 1e-9);
    }
}
