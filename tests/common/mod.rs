//! Scripted in-memory browser used by the integration tests.
//!
//! The fake models just enough of a page to drive the exploration loop: a
//! current URL, a stack of open overlays, nodes that belong to a page and a
//! container, click effects, and value storage for inputs. Probes the fake
//! does not model (layering scripts, menu markers) return misses, which is
//! exactly how a real session degrades.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uiscout::{
    BrowserError, BrowserSession, KnowledgeHit, KnowledgeStore, NodeHandle, NodeSnapshot,
    PatternRecord, Rect, ScoutError, SelectorRecord, WaitCondition,
};

pub const ROOT: &str = "root";

#[derive(Clone, Debug)]
pub enum ClickEffect {
    None,
    OpenOverlay(&'static str),
    CloseTopOverlay,
    Navigate(&'static str),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeRole {
    Body,
    OverlayContainer,
    Element,
}

#[derive(Clone, Debug)]
pub struct NodeSpec {
    pub id: u64,
    pub page: &'static str,
    pub container: &'static str,
    pub role: NodeRole,
    pub tag: &'static str,
    pub text: &'static str,
    pub attrs: Vec<(&'static str, &'static str)>,
    pub enabled: bool,
    /// When set, the node only reports enabled once every listed input
    /// holds a non-empty value.
    pub enabled_when_filled: Option<Vec<u64>>,
    pub effect: ClickEffect,
}

pub fn page_body(id: u64, page: &'static str) -> NodeSpec {
    NodeSpec {
        id,
        page,
        container: ROOT,
        role: NodeRole::Body,
        tag: "body",
        text: "",
        attrs: Vec::new(),
        enabled: true,
        enabled_when_filled: None,
        effect: ClickEffect::None,
    }
}

pub fn overlay_container(id: u64, page: &'static str, overlay_id: &'static str) -> NodeSpec {
    NodeSpec {
        id,
        page,
        container: overlay_id,
        role: NodeRole::OverlayContainer,
        tag: "div",
        text: "",
        attrs: vec![("role", "dialog"), ("id", overlay_id)],
        enabled: true,
        enabled_when_filled: None,
        effect: ClickEffect::None,
    }
}

pub fn button(
    id: u64,
    page: &'static str,
    container: &'static str,
    text: &'static str,
    effect: ClickEffect,
) -> NodeSpec {
    NodeSpec {
        id,
        page,
        container,
        role: NodeRole::Element,
        tag: "button",
        text,
        attrs: Vec::new(),
        enabled: true,
        enabled_when_filled: None,
        effect,
    }
}

pub fn text_input(id: u64, page: &'static str, container: &'static str, name: &'static str) -> NodeSpec {
    NodeSpec {
        id,
        page,
        container,
        role: NodeRole::Element,
        tag: "input",
        text: "",
        attrs: vec![("name", name)],
        enabled: true,
        enabled_when_filled: None,
        effect: ClickEffect::None,
    }
}

pub fn close_button(id: u64, page: &'static str, container: &'static str) -> NodeSpec {
    NodeSpec {
        id,
        page,
        container,
        role: NodeRole::Element,
        tag: "button",
        text: "×",
        attrs: vec![("aria-label", "close")],
        enabled: true,
        enabled_when_filled: None,
        effect: ClickEffect::CloseTopOverlay,
    }
}

pub fn day_cell(id: u64, page: &'static str, container: &'static str, day: &'static str) -> NodeSpec {
    NodeSpec {
        id,
        page,
        container,
        role: NodeRole::Element,
        tag: "button",
        text: day,
        attrs: vec![("role", "gridcell")],
        enabled: true,
        enabled_when_filled: None,
        effect: ClickEffect::CloseTopOverlay,
    }
}

#[derive(Debug, Default)]
struct Inner {
    url: String,
    overlays: Vec<&'static str>,
    values: HashMap<u64, String>,
    opened: Vec<&'static str>,
    max_open: usize,
    alive: bool,
}

/// Scripted [`BrowserSession`] implementation.
pub struct FakeBrowser {
    nodes: Vec<NodeSpec>,
    inner: Mutex<Inner>,
}

impl FakeBrowser {
    pub fn new(start_url: &str, nodes: Vec<NodeSpec>) -> Self {
        Self {
            nodes,
            inner: Mutex::new(Inner {
                url: start_url.to_string(),
                alive: true,
                ..Inner::default()
            }),
        }
    }

    pub fn kill(&self) {
        self.inner.lock().unwrap().alive = false;
    }

    pub fn opened_overlays(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().opened.clone()
    }

    pub fn max_open_overlays(&self) -> usize {
        self.inner.lock().unwrap().max_open
    }

    pub fn url(&self) -> String {
        self.inner.lock().unwrap().url.clone()
    }

    pub fn value_of(&self, id: u64) -> String {
        self.inner.lock().unwrap().values.get(&id).cloned().unwrap_or_default()
    }

    pub fn set_value(&self, id: u64, value: &str) {
        self.inner.lock().unwrap().values.insert(id, value.to_string());
    }

    fn spec(&self, handle: &NodeHandle) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == handle.0)
    }

    fn is_open(&self, inner: &Inner, spec: &NodeSpec) -> bool {
        spec.page == inner.url
            && (spec.container == ROOT || inner.overlays.contains(&spec.container))
    }

    fn snapshot_of(&self, inner: &Inner, spec: &NodeSpec) -> NodeSnapshot {
        let enabled = spec.enabled
            && spec
                .enabled_when_filled
                .as_ref()
                .map(|ids| {
                    ids.iter().all(|id| {
                        inner.values.get(id).map(|v| !v.is_empty()).unwrap_or(false)
                    })
                })
                .unwrap_or(true);
        let value = if spec.tag == "input" || spec.tag == "textarea" {
            Some(inner.values.get(&spec.id).cloned().unwrap_or_default())
        } else {
            None
        };
        NodeSnapshot {
            tag: spec.tag.to_string(),
            text: spec.text.to_string(),
            attributes: spec
                .attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            visible: true,
            enabled,
            geometry: Rect {
                x: 0.0,
                y: 0.0,
                width: 120.0,
                height: 40.0,
            },
            value,
        }
    }

    fn scope_container(&self, scope: Option<&NodeHandle>) -> Option<&'static str> {
        let handle = scope?;
        let spec = self.spec(handle)?;
        match spec.role {
            NodeRole::Body => Some(ROOT),
            NodeRole::OverlayContainer => Some(spec.container),
            NodeRole::Element => None,
        }
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }
        inner.url = url.to_string();
        inner.overlays.clear();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }
        Ok(inner.url.clone())
    }

    async fn is_alive(&self) -> bool {
        self.inner.lock().unwrap().alive
    }

    async fn query(
        &self,
        scope: Option<&NodeHandle>,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Vec<NodeHandle>, BrowserError> {
        let inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }

        let container_filter = self.scope_container(scope);
        let in_scope = |spec: &NodeSpec| {
            self.is_open(&inner, spec)
                && spec.role == NodeRole::Element
                && container_filter.map(|c| spec.container == c).unwrap_or(true)
        };
        let has_attr = |spec: &NodeSpec, key: &str, value: &str| {
            spec.attrs.iter().any(|(k, v)| *k == key && *v == value)
        };

        let handles: Vec<NodeHandle> = if selector.contains("gridcell") {
            self.nodes
                .iter()
                .filter(|n| in_scope(n) && has_attr(n, "role", "gridcell"))
                .map(|n| NodeHandle(n.id))
                .collect()
        } else if selector.contains("role=\"option\"") {
            self.nodes
                .iter()
                .filter(|n| in_scope(n) && has_attr(n, "role", "option"))
                .map(|n| NodeHandle(n.id))
                .collect()
        } else if selector.contains("role=\"dialog\"") {
            inner
                .overlays
                .last()
                .and_then(|top| {
                    self.nodes.iter().find(|n| {
                        n.role == NodeRole::OverlayContainer
                            && n.container == *top
                            && n.page == inner.url
                    })
                })
                .map(|n| vec![NodeHandle(n.id)])
                .unwrap_or_default()
        } else if selector == "body" {
            self.nodes
                .iter()
                .find(|n| n.role == NodeRole::Body && n.page == inner.url)
                .map(|n| vec![NodeHandle(n.id)])
                .unwrap_or_default()
        } else if selector.starts_with("input") {
            self.nodes
                .iter()
                .filter(|n| {
                    in_scope(n) && matches!(n.tag, "input" | "textarea" | "select")
                })
                .map(|n| NodeHandle(n.id))
                .collect()
        } else if selector.starts_with("button") {
            self.nodes
                .iter()
                .filter(|n| {
                    in_scope(n)
                        && (n.tag == "button"
                            || has_attr(n, "role", "button")
                            || (n.tag == "input" && has_attr(n, "type", "submit")))
                })
                .map(|n| NodeHandle(n.id))
                .collect()
        } else if selector == "a" {
            self.nodes
                .iter()
                .filter(|n| in_scope(n) && n.tag == "a")
                .map(|n| NodeHandle(n.id))
                .collect()
        } else {
            Vec::new()
        };
        Ok(handles)
    }

    async fn evaluate(&self, _expression: &str, _timeout: Duration) -> Result<Value, BrowserError> {
        Ok(Value::Bool(false))
    }

    async fn describe(&self, node: &NodeHandle) -> Result<NodeSnapshot, BrowserError> {
        let inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }
        let spec = self
            .spec(node)
            .ok_or_else(|| BrowserError::NotFound(format!("node {}", node.0)))?;
        if !self.is_open(&inner, spec) {
            return Err(BrowserError::NotFound(format!("node {} not rendered", node.0)));
        }
        Ok(self.snapshot_of(&inner, spec))
    }

    async fn click(&self, node: &NodeHandle, _timeout: Duration) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }
        let spec = self
            .spec(node)
            .ok_or_else(|| BrowserError::NotFound(format!("node {}", node.0)))?
            .clone();
        if !self.is_open(&inner, &spec) {
            return Err(BrowserError::NotFound(format!("node {} not rendered", node.0)));
        }
        match spec.effect {
            ClickEffect::None => {}
            ClickEffect::OpenOverlay(id) => {
                inner.overlays.push(id);
                inner.opened.push(id);
                inner.max_open = inner.max_open.max(inner.overlays.len());
            }
            ClickEffect::CloseTopOverlay => {
                inner.overlays.pop();
            }
            ClickEffect::Navigate(url) => {
                inner.url = url.to_string();
                inner.overlays.clear();
            }
        }
        Ok(())
    }

    async fn fill(
        &self,
        node: &NodeHandle,
        value: &str,
        _timeout: Duration,
    ) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }
        let id = self
            .spec(node)
            .ok_or_else(|| BrowserError::NotFound(format!("node {}", node.0)))?
            .id;
        inner.values.insert(id, value.to_string());
        Ok(())
    }

    async fn dismiss_overlay(&self, _timeout: Duration) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.alive {
            return Err(BrowserError::SessionClosed);
        }
        inner.overlays.pop();
        Ok(())
    }

    async fn wait_for(
        &self,
        _condition: WaitCondition,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        Ok(true)
    }
}

/// Knowledge store that records everything for assertions.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub patterns: Mutex<Vec<PatternRecord>>,
    pub selectors: Mutex<Vec<SelectorRecord>>,
}

#[async_trait]
impl KnowledgeStore for RecordingStore {
    async fn store_selector(&self, record: SelectorRecord) -> Result<(), ScoutError> {
        self.selectors.lock().unwrap().push(record);
        Ok(())
    }

    async fn store_pattern(&self, record: PatternRecord) -> Result<(), ScoutError> {
        self.patterns.lock().unwrap().push(record);
        Ok(())
    }

    async fn query(
        &self,
        _text: &str,
        _kind: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<KnowledgeHit>, ScoutError> {
        Ok(Vec::new())
    }
}
