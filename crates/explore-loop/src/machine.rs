//! The recursive exploration state machine.
//!
//! One [`Explorer`] drives one browser session end to end. Each context
//! (page body or overlay) is explored by re-resolving the active surface,
//! discovering elements, and running every element through the fixed
//! analyze → execute → learn pipeline. Outcomes feed the transitions:
//! navigations descend into the new page and come back via an explicit
//! resumption token, new overlays are pushed, recursed into and dismissed,
//! and same-surface content changes become bounded sub-steps rather than
//! fresh overlay frames. Depth, form steps and overlay sub-steps are all
//! strictly bounded.

use std::sync::Arc;

use async_recursion::async_recursion;
use browser_port::BrowserSession;
use decision_cascade::classifiers::{
    is_coming_soon, is_date_trigger, is_selection_trigger, is_submit_shaped,
};
use decision_cascade::causal::PATTERN_DISABLED_SUBMIT;
use decision_cascade::{
    CausalRule, DecisionContext, DecisionEngine, DecisionResult, ElementAction,
};
use element_scan::{ActiveScope, Discoverer, ElementDescriptor, ScopeResolver};
use tokio_util::sync::CancellationToken;
use tool_interact::{ClickStyle, InteractExecutor, InteractionOutcome};
use tracing::{debug, info, instrument, warn};
use uiscout_core_types::RunId;

use crate::config::ExploreConfig;
use crate::errors::ExploreError;
use crate::experiment::CausalExperimenter;
use crate::knowledge::KnowledgeStore;
use crate::learner::{Observation, PatternLearner};
use crate::state::{ExplorationReport, ExplorationState, FormStepRecord};

/// Which logical state the machine is exploring a context under.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Phase {
    Root,
    NestedOverlay(String),
}

impl Phase {
    fn overlay_id(&self) -> Option<&str> {
        match self {
            Phase::Root => None,
            Phase::NestedOverlay(id) => Some(id.as_str()),
        }
    }
}

/// Per-element pipeline state threaded through analyze → execute → learn.
/// Scoped to a single element's processing and not retained afterward.
struct GraphState<'a> {
    element: &'a ElementDescriptor,
    decision: Option<DecisionResult>,
    outcome: Option<InteractionOutcome>,
}

impl<'a> GraphState<'a> {
    fn new(element: &'a ElementDescriptor) -> Self {
        Self {
            element,
            decision: None,
            outcome: None,
        }
    }
}

/// The autonomous exploration agent. One instance drives one run at a time;
/// concurrent runs against the same session must be serialized by the caller.
pub struct Explorer {
    session: Arc<dyn BrowserSession>,
    knowledge: Arc<dyn KnowledgeStore>,
    config: ExploreConfig,
    engine: DecisionEngine,
    cancel: CancellationToken,
}

impl Explorer {
    pub fn new(
        session: Arc<dyn BrowserSession>,
        knowledge: Arc<dyn KnowledgeStore>,
        config: ExploreConfig,
    ) -> Self {
        Self {
            session,
            knowledge,
            config,
            engine: DecisionEngine::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an external token for cooperative cancellation.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    /// Explore starting from `url`. The run never fails for ordinary DOM
    /// unpredictability; a dead session yields a partial report with an
    /// unsuccessful log entry.
    #[instrument(skip(self))]
    pub async fn explore(
        &self,
        url: &str,
        skip_initial_navigation: bool,
    ) -> Result<ExplorationReport, ExploreError> {
        let state = ExplorationState::new(RunId::new());
        self.explore_with_state(url, skip_initial_navigation, state)
            .await
    }

    /// Re-enter a run from restored state (see [`crate::Checkpoint`]).
    pub async fn explore_with_state(
        &self,
        url: &str,
        skip_initial_navigation: bool,
        mut state: ExplorationState,
    ) -> Result<ExplorationReport, ExploreError> {
        if !skip_initial_navigation {
            if let Err(err) = self
                .session
                .navigate(url, self.config.op_timeout())
                .await
            {
                if err.is_fatal() {
                    state.record(
                        format!("navigate|{url}"),
                        ElementAction::Skip,
                        false,
                        Some(err.to_string()),
                    );
                    return Ok(state.into_report());
                }
                warn!("initial navigation degraded: {err}");
            }
        }

        self.recall_causal_rules(&mut state).await;

        match self.explore_context(&mut state, 0, Phase::Root).await {
            Ok(()) => {}
            Err(ExploreError::Cancelled) => {
                info!(run = %state.run_id, "run cancelled cooperatively");
            }
            Err(err) => {
                let marker = format!("abort|{}", state.log.len());
                state.record(marker, ElementAction::Skip, false, Some(err.to_string()));
            }
        }
        info!(
            run = %state.run_id,
            visited = state.visited_count(),
            interactions = state.log.len(),
            "exploration finished"
        );
        Ok(state.into_report())
    }

    /// Seed this run's causal memory with rules remembered from prior runs,
    /// so stage 1 of the cascade is eligible from the first form scope.
    async fn recall_causal_rules(&self, state: &mut ExplorationState) {
        let hits = match self
            .knowledge
            .query(PATTERN_DISABLED_SUBMIT, Some("causal_rule"), 5)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                debug!("causal recall unavailable: {err}");
                return;
            }
        };
        for hit in hits {
            if let Ok(rule) = serde_json::from_str::<CausalRule>(&hit.content) {
                debug!(pattern = %rule.pattern, "recalled causal rule");
                state.causal.add(rule);
            }
        }
    }

    /// Explore one context (page body or overlay) to exhaustion.
    #[async_recursion]
    async fn explore_context(
        &self,
        state: &mut ExplorationState,
        depth: u32,
        phase: Phase,
    ) -> Result<(), ExploreError> {
        if depth >= self.config.max_depth {
            debug!(depth, "depth budget reached");
            return Ok(());
        }

        let mut overlay_steps: u32 = 0;
        loop {
            self.checkpoint_alive().await?;

            let scope = self.resolve_scope().await?;
            let url = self.current_url().await?;
            let overlay_id = scope
                .origin
                .is_overlay()
                .then(|| scope.identifier.clone())
                .or_else(|| phase.overlay_id().map(str::to_string));

            if self.config.is_form_like(&url, overlay_id.as_deref()) {
                return self.form_sequential(state, depth).await;
            }

            let elements = self.discover(state, &scope, overlay_id.is_some()).await?;
            let has_disabled_submit = elements
                .iter()
                .any(|e| is_submit_shaped(e) && !e.enabled && !is_coming_soon(e));

            let mut transition = None;
            for element in &elements {
                if self.cancel.is_cancelled() {
                    return Err(ExploreError::Cancelled);
                }
                if state.is_visited(&element.key()) {
                    continue;
                }
                state.mark_visited(&element.key());

                let mut pipeline = GraphState::new(element);
                self.analyze(&mut pipeline, state, overlay_id.as_deref(), has_disabled_submit);
                self.execute(&mut pipeline, state).await?;
                self.learn(&pipeline, state).await;

                let Some(outcome) = pipeline.outcome else {
                    continue;
                };

                if outcome.url_changed {
                    transition = Some(Transition::Navigated { origin: url.clone() });
                    break;
                }
                if let Some(new_overlay) = outcome.new_overlay {
                    if Some(new_overlay.as_str()) == overlay_id.as_deref() {
                        // False "new overlay": same surface, changed content.
                        transition = Some(Transition::OverlayStep);
                    } else {
                        transition = Some(Transition::OverlayOpened { id: new_overlay });
                    }
                    break;
                }
                if outcome.content_changed {
                    transition = Some(Transition::OverlayStep);
                    break;
                }
            }

            match transition {
                Some(Transition::Navigated { origin }) => {
                    self.descend_navigation(state, depth, origin).await?;
                }
                Some(Transition::OverlayOpened { id }) => {
                    if self.is_skip_listed(&id) {
                        info!(overlay = %id, "skip-listed overlay appeared; dismissing");
                        self.dismiss_current_overlay(state).await?;
                    } else {
                        self.descend_overlay(state, depth, id).await?;
                    }
                }
                Some(Transition::OverlayStep) => {
                    overlay_steps += 1;
                    if overlay_steps >= self.config.max_overlay_steps {
                        debug!(overlay_steps, "overlay sub-step budget reached");
                        return Ok(());
                    }
                }
                None => return Ok(()),
            }
        }
    }

    /// Stage 1 of the per-element pipeline: decide.
    fn analyze(
        &self,
        pipeline: &mut GraphState<'_>,
        state: &ExplorationState,
        overlay_id: Option<&str>,
        has_disabled_submit: bool,
    ) {
        let ctx = DecisionContext {
            form_like: false,
            nested_overlay: overlay_id,
            has_disabled_submit,
            causal: &state.causal,
            patterns: &state.patterns,
            skip_overlays: &self.config.skip_overlays,
            blocked_elements: &self.config.blocked_elements,
            pattern_skip_threshold: self.config.pattern_skip_threshold,
        };
        pipeline.decision = Some(self.engine.decide(pipeline.element, &ctx));
    }

    /// Stage 2: carry the decision out against the live session.
    async fn execute(
        &self,
        pipeline: &mut GraphState<'_>,
        state: &mut ExplorationState,
    ) -> Result<(), ExploreError> {
        let Some(decision) = pipeline.decision.clone() else {
            return Ok(());
        };
        if !decision.interact {
            return Ok(());
        }

        let element = pipeline.element;
        let outcome = match decision.action {
            ElementAction::Fill => self
                .executor()
                .fill(element)
                .await
                .map_err(|e| ExploreError::SessionUnusable(e.to_string()))?,
            ElementAction::Click => {
                let style = click_style(element);
                self.executor()
                    .click(element, style, state.overlay_stack())
                    .await
                    .map_err(|e| ExploreError::SessionUnusable(e.to_string()))?
            }
            // Stage-1 ExploreDeeper is handled by the form strategy; as an
            // element action it is a recorded no-op.
            ElementAction::ExploreDeeper | ElementAction::Skip => InteractionOutcome {
                success: true,
                note: Some("deferred to form strategy".to_string()),
                ..InteractionOutcome::default()
            },
        };

        state.record(
            element.key(),
            decision.action,
            outcome.success,
            outcome.note.clone(),
        );
        pipeline.outcome = Some(outcome);
        Ok(())
    }

    /// Stage 3: absorb the outcome into the learned heuristics.
    async fn learn(&self, pipeline: &GraphState<'_>, state: &mut ExplorationState) {
        let (Some(decision), Some(outcome)) = (&pipeline.decision, &pipeline.outcome) else {
            return;
        };
        if !outcome.success {
            return;
        }
        PatternLearner::absorb(
            state,
            self.knowledge.as_ref(),
            &self.config,
            Observation {
                classification: decision.classification,
                selector: &pipeline.element.selector,
                url_changed: outcome.url_changed,
                opened_overlay: outcome.new_overlay.is_some(),
                closed_overlay: false,
            },
        )
        .await;
    }

    /// Sequential strategy for form-like contexts: fill everything, submit,
    /// and keep stepping while content changes, up to the step budget.
    async fn form_sequential(
        &self,
        state: &mut ExplorationState,
        depth: u32,
    ) -> Result<(), ExploreError> {
        let mut experimented = false;

        for step in 1..=self.config.max_form_steps {
            if self.cancel.is_cancelled() {
                return Err(ExploreError::Cancelled);
            }
            self.checkpoint_alive().await?;

            let scope = self.resolve_scope().await?;
            let nested = scope.origin.is_overlay();
            let elements = self.discover(state, &scope, nested).await?;

            // Causal discovery runs once per form-like scope, before the
            // ordinary fill/submit pass.
            if !experimented {
                let experimenter = CausalExperimenter::new(self.session.clone(), &self.config);
                let confirmed = experimenter
                    .run(&elements, state, self.knowledge.as_ref())
                    .await;
                if confirmed > 0 {
                    debug!(confirmed, "causal rules confirmed in form scope");
                }
                experimented = true;
            }

            let census_before = self.executor().census().await;
            let url_before = self.current_url().await?;

            let has_disabled_submit = elements
                .iter()
                .any(|e| is_submit_shaped(e) && !e.enabled && !is_coming_soon(e));

            let mut filled = Vec::new();
            for element in elements.iter().filter(|e| e.is_text_entry() && e.enabled) {
                let ctx = DecisionContext {
                    form_like: true,
                    nested_overlay: nested.then_some(scope.identifier.as_str()),
                    has_disabled_submit,
                    causal: &state.causal,
                    patterns: &state.patterns,
                    skip_overlays: &self.config.skip_overlays,
                    blocked_elements: &self.config.blocked_elements,
                    pattern_skip_threshold: self.config.pattern_skip_threshold,
                };
                let decision = self.engine.decide(element, &ctx);
                if decision.action != ElementAction::Fill {
                    continue;
                }
                let outcome = self
                    .executor()
                    .fill(element)
                    .await
                    .map_err(|e| ExploreError::SessionUnusable(e.to_string()))?;
                if outcome.success {
                    filled.push(element.selector.clone());
                }
                if state.mark_visited(&element.key()) {
                    state.record(
                        element.key(),
                        ElementAction::Fill,
                        outcome.success,
                        outcome.note.clone(),
                    );
                }
            }

            // Filling may have enabled the submit; look again.
            let refreshed = self.discover(state, &scope, nested).await?;
            let submit = refreshed
                .iter()
                .find(|e| is_submit_shaped(e) && e.enabled && !is_coming_soon(e))
                .cloned();
            let Some(submit) = submit else {
                debug!(step, "no enabled submit control; leaving form context");
                return Ok(());
            };

            let outcome = self
                .executor()
                .click(&submit, ClickStyle::Submit, state.overlay_stack())
                .await
                .map_err(|e| ExploreError::SessionUnusable(e.to_string()))?;
            if state.mark_visited(&submit.key()) {
                state.record(
                    submit.key(),
                    ElementAction::Click,
                    outcome.success,
                    outcome.note.clone(),
                );
            }

            state.form_summary_mut().steps.push(FormStepRecord {
                step,
                filled_inputs: filled,
                submitted_by: Some(submit.selector.clone()),
            });

            let census_after = self.executor().census().await;
            let url_after = self.current_url().await?;
            let changed = outcome.content_changed
                || outcome.new_overlay.is_some()
                || census_before.differs_from(&census_after)
                || urls_differ(&url_before, &url_after);
            if !changed {
                debug!(step, "form content settled; returning to parent");
                return Ok(());
            }
            info!(step, depth, "form step advanced");
        }

        debug!("form step budget reached");
        Ok(())
    }

    /// Descend into a page the run navigated to, then come back to the
    /// origin URL and resume iterating siblings.
    async fn descend_navigation(
        &self,
        state: &mut ExplorationState,
        depth: u32,
        origin: String,
    ) -> Result<(), ExploreError> {
        info!(origin = %origin, depth, "navigated away; descending");
        state.nav_stack.push(origin.clone());
        let result = self.explore_context(state, depth + 1, Phase::Root).await;

        // Come back regardless of how the descent went; the resumption
        // token is what makes sibling iteration possible.
        let back = self.session.navigate(&origin, self.config.op_timeout()).await;
        state.nav_stack.pop();
        result?;
        if let Err(err) = back {
            if err.is_fatal() {
                return Err(ExploreError::SessionUnusable(err.to_string()));
            }
            warn!("return navigation degraded: {err}");
        }
        Ok(())
    }

    /// Push a newly opened overlay, explore it, then dismiss and pop.
    async fn descend_overlay(
        &self,
        state: &mut ExplorationState,
        depth: u32,
        overlay_id: String,
    ) -> Result<(), ExploreError> {
        info!(overlay = %overlay_id, depth, "overlay opened; descending");
        state.push_overlay(overlay_id.clone());
        let result = self
            .explore_context(state, depth + 1, Phase::NestedOverlay(overlay_id))
            .await;
        let dismissal = self.dismiss_current_overlay(state).await;
        state.pop_overlay();
        result?;
        dismissal
    }

    /// Dismiss the topmost overlay: prefer clicking a close-shaped control
    /// (which is what teaches the close-control pattern), fall back to the
    /// session's generic dismissal.
    async fn dismiss_current_overlay(
        &self,
        state: &mut ExplorationState,
    ) -> Result<(), ExploreError> {
        let resolver = self.resolver();
        let Ok(Some(scope)) = resolver.resolve().await else {
            return Ok(());
        };
        if !scope.origin.is_overlay() {
            return Ok(());
        }

        let discoverer = Discoverer::new(self.session.clone(), self.config.probe_timeout());
        let close_candidate = match discoverer.discover(&scope, true).await {
            Ok(elements) => elements
                .into_iter()
                .find(decision_cascade::classifiers::is_close_shaped),
            Err(_) => None,
        };

        if let Some(close) = close_candidate {
            let outcome = self
                .executor()
                .click(&close, ClickStyle::Plain, state.overlay_stack())
                .await
                .map_err(|e| ExploreError::SessionUnusable(e.to_string()))?;
            let closed = match resolver.resolve().await {
                Ok(Some(after)) => {
                    !after.origin.is_overlay() || after.identifier != scope.identifier
                }
                Ok(None) => true,
                Err(_) => false,
            };
            if outcome.success && closed {
                if !state.log.iter().any(|r| r.key == close.key()) {
                    state.record(
                        close.key(),
                        ElementAction::Click,
                        true,
                        Some("dismissed overlay".to_string()),
                    );
                }
                PatternLearner::absorb(
                    state,
                    self.knowledge.as_ref(),
                    &self.config,
                    Observation {
                        classification: decision_cascade::Classification::CloseControl,
                        selector: &close.selector,
                        url_changed: false,
                        opened_overlay: false,
                        closed_overlay: true,
                    },
                )
                .await;
                return Ok(());
            }
        }

        if let Err(err) = self
            .session
            .dismiss_overlay(self.config.op_timeout())
            .await
        {
            if err.is_fatal() {
                return Err(ExploreError::SessionUnusable(err.to_string()));
            }
            warn!("overlay dismissal degraded: {err}");
        }
        Ok(())
    }

    async fn discover(
        &self,
        state: &mut ExplorationState,
        scope: &ActiveScope,
        nested: bool,
    ) -> Result<Vec<ElementDescriptor>, ExploreError> {
        let discoverer = Discoverer::new(self.session.clone(), self.config.probe_timeout());
        let elements = discoverer
            .discover(scope, nested)
            .await
            .map_err(|e| ExploreError::SessionUnusable(e.to_string()))?;
        for element in &elements {
            state.add_discovered(element.selector.clone(), element.text.clone());
        }
        Ok(elements)
    }

    async fn resolve_scope(&self) -> Result<ActiveScope, ExploreError> {
        match self.resolver().resolve().await {
            Ok(Some(scope)) => Ok(scope),
            Ok(None) => Err(ExploreError::SessionUnusable(
                "no active scope (blank or closed document)".into(),
            )),
            Err(err) => Err(ExploreError::SessionUnusable(err.to_string())),
        }
    }

    async fn checkpoint_alive(&self) -> Result<(), ExploreError> {
        if self.cancel.is_cancelled() {
            return Err(ExploreError::Cancelled);
        }
        if self.session.is_alive().await {
            Ok(())
        } else {
            Err(ExploreError::SessionUnusable("liveness probe failed".into()))
        }
    }

    async fn current_url(&self) -> Result<String, ExploreError> {
        self.session
            .current_url()
            .await
            .map_err(|err| ExploreError::SessionUnusable(err.to_string()))
    }

    fn resolver(&self) -> ScopeResolver {
        ScopeResolver::new(self.session.clone(), self.config.probe_timeout())
    }

    fn executor(&self) -> InteractExecutor {
        InteractExecutor::new(
            self.session.clone(),
            self.config.op_timeout(),
            self.config.probe_timeout(),
        )
    }

    fn is_skip_listed(&self, overlay_id: &str) -> bool {
        self.config
            .skip_overlays
            .iter()
            .any(|entry| overlay_id == entry || overlay_id.contains(entry.as_str()))
    }
}

/// Context transition chosen from an element's outcome.
enum Transition {
    Navigated { origin: String },
    OverlayOpened { id: String },
    OverlayStep,
}

/// URL comparison ignoring fragments, so in-page anchor moves do not count
/// as form progress.
fn urls_differ(before: &str, after: &str) -> bool {
    match (url::Url::parse(before), url::Url::parse(after)) {
        (Ok(mut a), Ok(mut b)) => {
            a.set_fragment(None);
            b.set_fragment(None);
            a != b
        }
        _ => before != after,
    }
}

fn click_style(element: &ElementDescriptor) -> ClickStyle {
    if is_date_trigger(element) {
        ClickStyle::DatePicker
    } else if is_selection_trigger(element) {
        ClickStyle::Dropdown
    } else if is_submit_shaped(element) {
        ClickStyle::Submit
    } else {
        ClickStyle::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_style_selection() {
        use browser_port::NodeHandle;
        use element_scan::ElementKind;
        use std::collections::HashMap;

        let mut attrs = HashMap::new();
        attrs.insert("type".to_string(), "date".to_string());
        let date = ElementDescriptor {
            selector: "input".into(),
            text: String::new(),
            kind: ElementKind::Input,
            attributes: attrs,
            visible: true,
            enabled: true,
            geometry: Default::default(),
            value: None,
            handle: NodeHandle(1),
        };
        assert_eq!(click_style(&date), ClickStyle::DatePicker);

        let dropdown = ElementDescriptor {
            kind: ElementKind::Dropdown,
            attributes: HashMap::new(),
            ..date.clone()
        };
        assert_eq!(click_style(&dropdown), ClickStyle::Dropdown);

        let submit = ElementDescriptor {
            kind: ElementKind::Button,
            text: "Continue".into(),
            attributes: HashMap::new(),
            ..date.clone()
        };
        assert_eq!(click_style(&submit), ClickStyle::Submit);

        let plain = ElementDescriptor {
            kind: ElementKind::Button,
            text: "Open settings".into(),
            attributes: HashMap::new(),
            ..date
        };
        assert_eq!(click_style(&plain), ClickStyle::Plain);
    }

    #[test]
    fn test_urls_differ_ignores_fragments() {
        assert!(!urls_differ(
            "https://app.example.com/page#a",
            "https://app.example.com/page#b"
        ));
        assert!(urls_differ(
            "https://app.example.com/page",
            "https://app.example.com/other"
        ));
        assert!(!urls_differ("not a url", "not a url"));
    }

    #[test]
    fn test_phase_overlay_id() {
        assert_eq!(Phase::Root.overlay_id(), None);
        assert_eq!(
            Phase::NestedOverlay("menu".into()).overlay_id(),
            Some("menu")
        );
    }
}
