//! Click and fill execution.

use std::sync::Arc;
use std::time::Duration;

use browser_port::{BrowserSession, WaitCondition};
use element_scan::{ElementDescriptor, ScopeResolver};
use tracing::{debug, instrument, warn};

use crate::errors::InteractError;
use crate::model::{ClickStyle, ElementCensus, InteractionOutcome};
use crate::pickers;
use crate::values;

const VISIBLE_INPUTS: &str = "input, textarea, select";
const VISIBLE_BUTTONS: &str = "button, [role=\"button\"], input[type=\"submit\"]";

/// Executes decided actions against the live session and observes outcomes.
pub struct InteractExecutor {
    session: Arc<dyn BrowserSession>,
    op_timeout: Duration,
    probe_timeout: Duration,
}

impl InteractExecutor {
    pub fn new(session: Arc<dyn BrowserSession>, op_timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            session,
            op_timeout,
            probe_timeout,
        }
    }

    /// Click `element`, run any completion routine the style requires, and
    /// report what changed. `known_overlays` is the caller's current overlay
    /// stack; only an overlay absent from it counts as new.
    #[instrument(skip_all, fields(key = %element.key(), style = ?style))]
    pub async fn click(
        &self,
        element: &ElementDescriptor,
        style: ClickStyle,
        known_overlays: &[String],
    ) -> Result<InteractionOutcome, InteractError> {
        self.ensure_alive().await?;

        let url_before = self.current_url().await?;
        let census_before = if matches!(style, ClickStyle::Submit) {
            Some(self.census().await)
        } else {
            None
        };

        if let Err(err) = self.session.click(&element.handle, self.op_timeout).await {
            if err.is_fatal() {
                return Err(InteractError::SessionGone(err.to_string()));
            }
            warn!("click failed: {err}");
            return Ok(InteractionOutcome::failed(format!("click failed: {err}")));
        }

        // Let the page settle before observing; a timeout is an answer.
        let _ = self
            .session
            .wait_for(WaitCondition::DomSettled, self.probe_timeout)
            .await;

        let completed = match style {
            ClickStyle::DatePicker => {
                let done =
                    pickers::complete_date_picker(&self.session, self.probe_timeout, self.op_timeout)
                        .await;
                Some(("date picker", done))
            }
            ClickStyle::Dropdown => {
                let done = pickers::complete_dropdown(
                    &self.session,
                    Some(element.text.as_str()),
                    self.probe_timeout,
                    self.op_timeout,
                )
                .await;
                Some(("dropdown", done))
            }
            _ => None,
        };

        let url_after = self.current_url().await?;
        let mut outcome = InteractionOutcome {
            success: true,
            url_changed: url_before != url_after,
            ..InteractionOutcome::default()
        };

        if let Some((routine, done)) = completed {
            outcome.success = done;
            outcome.note = Some(if done {
                format!("{routine} completed")
            } else {
                format!("{routine} completion found no target")
            });
        }

        if let Some(before) = census_before {
            let after = self.census().await;
            if before.differs_from(&after) {
                // Same-surface content change: the caller re-explores this
                // context as a new logical step.
                outcome.content_changed = true;
            }
        }

        outcome.new_overlay = self.detect_new_overlay(known_overlays).await;
        debug!(
            url_changed = outcome.url_changed,
            new_overlay = ?outcome.new_overlay,
            content_changed = outcome.content_changed,
            "click outcome"
        );
        Ok(outcome)
    }

    /// Fill `element` with a synthetic value. Filling cannot open overlays,
    /// so the outcome never reports one.
    #[instrument(skip_all, fields(key = %element.key()))]
    pub async fn fill(&self, element: &ElementDescriptor) -> Result<InteractionOutcome, InteractError> {
        self.ensure_alive().await?;

        let value = values::synthetic_value_for(element);
        match self.session.fill(&element.handle, &value, self.op_timeout).await {
            Ok(()) => Ok(InteractionOutcome {
                success: true,
                note: Some(format!("filled with synthetic value ({} chars)", value.len())),
                ..InteractionOutcome::default()
            }),
            Err(err) if err.is_fatal() => Err(InteractError::SessionGone(err.to_string())),
            Err(err) => {
                warn!("fill failed: {err}");
                Ok(InteractionOutcome::failed(format!("fill failed: {err}")))
            }
        }
    }

    /// Count visible inputs and buttons across the page.
    pub async fn census(&self) -> ElementCensus {
        ElementCensus {
            inputs: self.count_visible(VISIBLE_INPUTS).await,
            buttons: self.count_visible(VISIBLE_BUTTONS).await,
        }
    }

    async fn count_visible(&self, selector: &str) -> usize {
        let Ok(handles) = self.session.query(None, selector, self.probe_timeout).await else {
            return 0;
        };
        let mut count = 0;
        for handle in handles {
            if let Ok(snapshot) = self.session.describe(&handle).await {
                if snapshot.visible {
                    count += 1;
                }
            }
        }
        count
    }

    async fn detect_new_overlay(&self, known_overlays: &[String]) -> Option<String> {
        let resolver = ScopeResolver::new(self.session.clone(), self.probe_timeout);
        match resolver.resolve().await {
            Ok(Some(scope)) if scope.origin.is_overlay() => {
                if known_overlays.iter().any(|id| *id == scope.identifier) {
                    None
                } else {
                    Some(scope.identifier)
                }
            }
            _ => None,
        }
    }

    async fn ensure_alive(&self) -> Result<(), InteractError> {
        if self.session.is_alive().await {
            Ok(())
        } else {
            Err(InteractError::SessionGone("liveness probe failed".into()))
        }
    }

    async fn current_url(&self) -> Result<String, InteractError> {
        self.session
            .current_url()
            .await
            .map_err(|err| InteractError::SessionGone(err.to_string()))
    }
}
