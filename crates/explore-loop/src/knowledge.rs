//! Knowledge-store capability port.
//!
//! Discovered selectors, learned patterns and confirmed causal rules are
//! mirrored to an external persistence backend so later runs (and the
//! downstream plan/codegen stages) can query them. The backend itself is an
//! external collaborator; this crate only defines the seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uiscout_core_types::ScoutError;

/// A selector worth remembering, with the confidence it carried when stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectorRecord {
    pub selector: String,
    pub text: String,
    pub kind: String,
    pub context: String,
    pub confidence: f64,
}

/// A learned pattern or causal rule, serialized for persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternRecord {
    pub kind: String,
    pub confidence: f64,
    pub payload: Value,
}

/// One query hit from the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnowledgeHit {
    pub content: String,
    pub score: f64,
}

/// Persistent knowledge backend consumed by the exploration loop.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn store_selector(&self, record: SelectorRecord) -> Result<(), ScoutError>;

    async fn store_pattern(&self, record: PatternRecord) -> Result<(), ScoutError>;

    async fn query(
        &self,
        text: &str,
        kind: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KnowledgeHit>, ScoutError>;
}

/// Store that remembers nothing. Used in tests and when persistence is
/// disabled; store failures must never fail a run either way.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopKnowledgeStore;

#[async_trait]
impl KnowledgeStore for NoopKnowledgeStore {
    async fn store_selector(&self, _record: SelectorRecord) -> Result<(), ScoutError> {
        Ok(())
    }

    async fn store_pattern(&self, _record: PatternRecord) -> Result<(), ScoutError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_store_accepts_everything() {
        let store = NoopKnowledgeStore;
        store
            .store_selector(SelectorRecord {
                selector: "#x".into(),
                text: "X".into(),
                kind: "button".into(),
                context: "root".into(),
                confidence: 0.5,
            })
            .await
            .unwrap();
        store
            .store_pattern(PatternRecord {
                kind: "close_control".into(),
                confidence: 0.6,
                payload: Value::Null,
            })
            .await
            .unwrap();
        assert!(store.query("close", None, 5).await.unwrap().is_empty());
    }
}
