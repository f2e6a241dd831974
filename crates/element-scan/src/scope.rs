//! Active-surface resolution.
//!
//! An exploration step always works inside exactly one interactive surface:
//! an open dialog, menu or popover when one is layered over the page, the
//! document body otherwise. Resolution tries seven probes in a fixed order
//! and the first hit wins. All probes are read-only queries with short
//! timeouts; a missing overlay degrades to the next probe, never a stall.

use std::sync::Arc;
use std::time::Duration;

use browser_port::{BrowserError, BrowserSession, NodeHandle};
use tracing::debug;

use crate::errors::ScanError;
use crate::model::compact_text;

/// Page-context helpers for the layering probes (steps 2 and 3). Injected
/// once per resolution pass; see `scripts/scope_probe.js`.
const SCOPE_PROBE_SCRIPT: &str = include_str!("../scripts/scope_probe.js");

const ROLE_OVERLAYS: &str = "[role=\"dialog\"], [role=\"alertdialog\"]";
const IDENTIFIER_OVERLAYS: &str = "[id*=\"modal\"], [class*=\"modal\"], [id*=\"dialog\"], \
     [class*=\"dialog\"], [id*=\"overlay\"], [class*=\"overlay\"]";
const MENU_OVERLAYS: &str = "[role=\"menu\"], [role=\"listbox\"], [role=\"tooltip\"], \
     [data-state=\"open\"], [aria-expanded=\"true\"]";
const POPOVER_OVERLAYS: &str = "[class*=\"popover\"], [class*=\"popup\"], [class*=\"drawer\"]";
const MARKED_SCOPE: &str = "[data-uiscout-scope]";

/// Where the active scope came from, in probe order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScopeOrigin {
    AriaOverlay,
    LayeredBlock,
    Backdrop,
    IdentifierMatch,
    MenuMarker,
    PopoverClass,
    DocumentBody,
}

impl ScopeOrigin {
    /// True for every origin that represents an overlay layered above the
    /// base page rather than the page itself.
    pub fn is_overlay(&self) -> bool {
        !matches!(self, ScopeOrigin::DocumentBody)
    }
}

/// The currently active interactive surface.
#[derive(Clone, Debug)]
pub struct ActiveScope {
    pub handle: NodeHandle,
    pub origin: ScopeOrigin,
    /// Human-readable identity used as the overlay-stack frame name.
    pub identifier: String,
}

/// Resolves the active interactive surface against a live session.
pub struct ScopeResolver {
    session: Arc<dyn BrowserSession>,
    probe_timeout: Duration,
}

impl ScopeResolver {
    pub fn new(session: Arc<dyn BrowserSession>, probe_timeout: Duration) -> Self {
        Self {
            session,
            probe_timeout,
        }
    }

    /// Resolve the active scope, or `None` when the session is unusable
    /// (blank document, closed page).
    pub async fn resolve(&self) -> Result<Option<ActiveScope>, ScanError> {
        if !self.session.is_alive().await {
            return Ok(None);
        }

        if let Some(scope) = self
            .first_visible(ROLE_OVERLAYS, ScopeOrigin::AriaOverlay)
            .await?
        {
            return Ok(Some(scope));
        }

        if let Some(scope) = self.probe_layering("probeZIndexLayer", ScopeOrigin::LayeredBlock).await? {
            return Ok(Some(scope));
        }
        if let Some(scope) = self.probe_layering("probeBackdrop", ScopeOrigin::Backdrop).await? {
            return Ok(Some(scope));
        }

        for (origin, selector) in [
            (ScopeOrigin::IdentifierMatch, IDENTIFIER_OVERLAYS),
            (ScopeOrigin::MenuMarker, MENU_OVERLAYS),
            (ScopeOrigin::PopoverClass, POPOVER_OVERLAYS),
        ] {
            if let Some(scope) = self.first_visible(selector, origin).await? {
                return Ok(Some(scope));
            }
        }

        match self.query("body").await? {
            Some(handle) => Ok(Some(ActiveScope {
                handle,
                origin: ScopeOrigin::DocumentBody,
                identifier: "root".to_string(),
            })),
            None => Ok(None),
        }
    }

    /// First visible match for `selector`, described into an [`ActiveScope`].
    async fn first_visible(
        &self,
        selector: &str,
        origin: ScopeOrigin,
    ) -> Result<Option<ActiveScope>, ScanError> {
        let handles = match self
            .session
            .query(None, selector, self.probe_timeout)
            .await
        {
            Ok(handles) => handles,
            Err(err) if err.is_fatal() => return Err(ScanError::SessionUnusable(err.to_string())),
            Err(err) => {
                debug!(probe = ?origin, "scope probe failed: {err}");
                return Ok(None);
            }
        };

        for handle in handles {
            match self.session.describe(&handle).await {
                Ok(snapshot) if snapshot.visible => {
                    let identifier = scope_identifier(&snapshot);
                    debug!(probe = ?origin, identifier, "active scope resolved");
                    return Ok(Some(ActiveScope {
                        handle,
                        origin,
                        identifier,
                    }));
                }
                Ok(_) => continue,
                Err(err) if err.is_fatal() => {
                    return Err(ScanError::SessionUnusable(err.to_string()))
                }
                Err(_) => continue,
            }
        }
        Ok(None)
    }

    /// Run one of the page-context layering probes and pick up its mark.
    async fn probe_layering(
        &self,
        probe: &str,
        origin: ScopeOrigin,
    ) -> Result<Option<ActiveScope>, ScanError> {
        let expression = format!(
            "{SCOPE_PROBE_SCRIPT}; window.__uiscoutScopeProbe.{probe}()"
        );
        match self.session.evaluate(&expression, self.probe_timeout).await {
            Ok(value) if value.as_bool() == Some(true) => {
                self.first_visible(MARKED_SCOPE, origin).await
            }
            Ok(_) => Ok(None),
            Err(err) if err.is_fatal() => Err(ScanError::SessionUnusable(err.to_string())),
            Err(err) => {
                debug!(probe, "layering probe failed: {err}");
                Ok(None)
            }
        }
    }

    async fn query(&self, selector: &str) -> Result<Option<NodeHandle>, ScanError> {
        match self.session.query(None, selector, self.probe_timeout).await {
            Ok(handles) => Ok(handles.into_iter().next()),
            Err(BrowserError::SessionClosed) => {
                Err(ScanError::SessionUnusable("session closed".into()))
            }
            Err(_) => Ok(None),
        }
    }
}

/// Derive the overlay-stack identity of a scope node: id, test id, role with
/// a class hint, or the bare tag.
pub fn scope_identifier(snapshot: &browser_port::NodeSnapshot) -> String {
    if let Some(id) = snapshot.attr("id").filter(|v| !v.is_empty()) {
        return id.to_string();
    }
    if let Some(test_id) = snapshot.attr("data-testid").filter(|v| !v.is_empty()) {
        return test_id.to_string();
    }
    if let Some(role) = snapshot.attr("role").filter(|v| !v.is_empty()) {
        let label = snapshot
            .attr("aria-label")
            .map(compact_text)
            .filter(|v| !v.is_empty());
        return match label {
            Some(label) => format!("{}:{}", role, label),
            None => role.to_string(),
        };
    }
    if let Some(class) = snapshot.attr("class") {
        if let Some(first) = class.split_whitespace().next() {
            return first.to_string();
        }
    }
    let tag = snapshot.tag.trim().to_ascii_lowercase();
    if tag.is_empty() {
        "scope".to_string()
    } else {
        tag
    }
}
