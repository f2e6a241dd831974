//! Completion routines for date pickers and option dropdowns.
//!
//! A picker trigger is completed atomically: the agent opens it and picks a
//! value in one step, so the individual day cells and option rows are never
//! evaluated as separate exploration targets.

use std::sync::Arc;
use std::time::Duration;

use browser_port::{BrowserSession, NodeHandle};
use tracing::debug;

const DAY_CELLS: &str = "[role=\"gridcell\"] button, [role=\"gridcell\"], \
     [class*=\"day\"]:not([class*=\"disabled\"]), td button";
const OPTION_ROWS: &str = "[role=\"option\"]";
const OPTION_FLAGS: &str = "[role=\"option\"] img, [role=\"option\"] [class*=\"flag\"], \
     li img[class*=\"flag\"]";
const SCROLL_ITEMS: &str = "[class*=\"scroll\"] li, [class*=\"list\"] [class*=\"item\"]";

/// Preferred day selected inside an open date picker.
const PREFERRED_DAY: &str = "15";

/// Select a day inside the picker that just opened: day "15" when present
/// and enabled, otherwise the first enabled day. Returns whether a day was
/// clicked.
pub async fn complete_date_picker(
    session: &Arc<dyn BrowserSession>,
    probe_timeout: Duration,
    op_timeout: Duration,
) -> bool {
    let handles = match session.query(None, DAY_CELLS, probe_timeout).await {
        Ok(handles) => handles,
        Err(err) => {
            debug!("date picker query failed: {err}");
            return false;
        }
    };

    let mut fallback: Option<NodeHandle> = None;
    for handle in handles {
        let Ok(snapshot) = session.describe(&handle).await else {
            continue;
        };
        if !snapshot.visible || !snapshot.enabled {
            continue;
        }
        if snapshot.text.trim() == PREFERRED_DAY {
            return session.click(&handle, op_timeout).await.is_ok();
        }
        if fallback.is_none() && snapshot.text.trim().parse::<u8>().is_ok() {
            fallback = Some(handle);
        }
    }

    match fallback {
        Some(handle) => session.click(&handle, op_timeout).await.is_ok(),
        None => false,
    }
}

/// Select an option inside the dropdown that just opened. Ladder: exact
/// textual match, option carrying an image/flag, first option-role element,
/// first clickable child of a bounded-height scroll container.
pub async fn complete_dropdown(
    session: &Arc<dyn BrowserSession>,
    preferred_text: Option<&str>,
    probe_timeout: Duration,
    op_timeout: Duration,
) -> bool {
    if let Some(preferred) = preferred_text.map(str::trim).filter(|t| !t.is_empty()) {
        if let Ok(handles) = session.query(None, OPTION_ROWS, probe_timeout).await {
            for handle in handles {
                let Ok(snapshot) = session.describe(&handle).await else {
                    continue;
                };
                if snapshot.visible && snapshot.text.trim() == preferred {
                    return session.click(&handle, op_timeout).await.is_ok();
                }
            }
        }
    }

    for ladder in [OPTION_FLAGS, OPTION_ROWS, SCROLL_ITEMS] {
        let Ok(handles) = session.query(None, ladder, probe_timeout).await else {
            continue;
        };
        for handle in handles {
            let Ok(snapshot) = session.describe(&handle).await else {
                continue;
            };
            if snapshot.visible && snapshot.enabled {
                return session.click(&handle, op_timeout).await.is_ok();
            }
        }
    }

    false
}
