use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BrowserError;
use crate::model::{NodeHandle, NodeSnapshot, WaitCondition};

/// Capability contract of the remote browser session driven by a run.
///
/// All methods are read-or-act primitives; policy (what to click, when to
/// give up on a branch) lives entirely in the exploration crates. Each call
/// takes an explicit timeout so implementations never block a run on a
/// missing element.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the page to `url` and wait for the load to commit.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Current document URL.
    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Cheap liveness probe; `false` means the session handle is gone and
    /// the caller must abort its current context.
    async fn is_alive(&self) -> bool;

    /// Query nodes matching a CSS selector, optionally scoped to a subtree.
    /// A miss returns an empty list, not an error.
    async fn query(
        &self,
        scope: Option<&NodeHandle>,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<NodeHandle>, BrowserError>;

    /// Evaluate a script in page context and return its JSON result.
    async fn evaluate(&self, expression: &str, timeout: Duration) -> Result<Value, BrowserError>;

    /// Snapshot a node's tag, text, attributes, visibility and geometry.
    async fn describe(&self, node: &NodeHandle) -> Result<NodeSnapshot, BrowserError>;

    /// Dispatch a trusted click on the node.
    async fn click(&self, node: &NodeHandle, timeout: Duration) -> Result<(), BrowserError>;

    /// Replace the node's value with `value` (input/textarea only).
    async fn fill(
        &self,
        node: &NodeHandle,
        value: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Best-effort dismissal of the topmost overlay (Escape key or backdrop
    /// click); a no-op when nothing is layered.
    async fn dismiss_overlay(&self, timeout: Duration) -> Result<(), BrowserError>;

    /// Block until `condition` holds or the timeout elapses. Returns whether
    /// the condition was met; a timeout here is an answer, not an error.
    async fn wait_for(
        &self,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<bool, BrowserError>;
}
