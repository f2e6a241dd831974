//! Interactive element discovery inside the active scope.
//!
//! Enumeration is ordered: inputs and textareas first so form fields are
//! always visited before auxiliary controls, then buttons, then links. Each
//! node is snapshotted once, given a synthesized selector, and run through
//! the noise filter. Probe failures on individual nodes degrade to "absent";
//! only a dead session propagates.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use browser_port::{BrowserSession, NodeHandle};
use tracing::{debug, warn};

use crate::errors::ScanError;
use crate::model::ElementDescriptor;
use crate::noise;
use crate::scope::ActiveScope;
use crate::selector;

const INPUT_SELECTOR: &str = "input, textarea, select";
const BUTTON_SELECTOR: &str = "button, [role=\"button\"], input[type=\"submit\"]";
const LINK_SELECTOR: &str = "a";

/// Discovers candidate interactive elements inside an [`ActiveScope`].
pub struct Discoverer {
    session: Arc<dyn BrowserSession>,
    probe_timeout: Duration,
}

impl Discoverer {
    pub fn new(session: Arc<dyn BrowserSession>, probe_timeout: Duration) -> Self {
        Self {
            session,
            probe_timeout,
        }
    }

    /// Enumerate interactive elements in the scope, in visit priority order,
    /// deduplicated by element key. `nested_overlay` tightens the noise
    /// filter for calendar/locale chrome.
    pub async fn discover(
        &self,
        scope: &ActiveScope,
        nested_overlay: bool,
    ) -> Result<Vec<ElementDescriptor>, ScanError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut seen_handles: HashSet<NodeHandle> = HashSet::new();
        let mut out = Vec::new();

        for group in [INPUT_SELECTOR, BUTTON_SELECTOR, LINK_SELECTOR] {
            let handles = match self
                .session
                .query(Some(&scope.handle), group, self.probe_timeout)
                .await
            {
                Ok(handles) => handles,
                Err(err) if err.is_fatal() => {
                    return Err(ScanError::SessionUnusable(err.to_string()))
                }
                Err(err) => {
                    warn!(group, "discovery query failed: {err}");
                    continue;
                }
            };

            for handle in handles {
                if !seen_handles.insert(handle.clone()) {
                    // An input[type=submit] matches both the input and the
                    // button group; first (input) pass wins.
                    continue;
                }
                let snapshot = match self.session.describe(&handle).await {
                    Ok(snapshot) => snapshot,
                    Err(err) if err.is_fatal() => {
                        return Err(ScanError::SessionUnusable(err.to_string()))
                    }
                    Err(err) => {
                        debug!("node vanished during discovery: {err}");
                        continue;
                    }
                };
                if !snapshot.visible {
                    continue;
                }

                let locator = selector::synthesize(&snapshot);
                let element = ElementDescriptor::from_snapshot(handle, &snapshot, locator);

                if noise::is_noise(&element, nested_overlay) {
                    debug!(key = %element.key(), "dropped as noise");
                    continue;
                }
                if seen.insert(element.key()) {
                    out.push(element);
                }
            }
        }

        debug!(
            scope = %scope.identifier,
            count = out.len(),
            "discovery pass complete"
        );
        Ok(out)
    }
}
