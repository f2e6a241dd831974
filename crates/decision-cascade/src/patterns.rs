//! Confidence-weighted learned heuristics.
//!
//! A pattern book is owned by one exploration run and threaded through the
//! traversal; it is merged into the final report rather than living in
//! shared state. Confidence only moves in small bounded increments and is
//! never reset downward by this core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kinds of learned heuristics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    CloseControl,
    NavigationTrigger,
    ModalOpener,
    SafeAction,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::CloseControl => "close_control",
            PatternKind::NavigationTrigger => "navigation_trigger",
            PatternKind::ModalOpener => "modal_opener",
            PatternKind::SafeAction => "safe_action",
        }
    }
}

/// One learned heuristic with its reinforcing examples.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    /// Bounded to [0,1]; monotonically non-decreasing within a run.
    pub confidence: f64,
    pub examples: Vec<String>,
}

/// Seed confidence for a pattern observed for the first time.
pub const SEED_CONFIDENCE: f64 = 0.5;

/// The per-run collection of learned patterns.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PatternBook {
    inner: BTreeMap<PatternKind, Pattern>,
}

impl PatternBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confidence(&self, kind: PatternKind) -> Option<f64> {
        self.inner.get(&kind).map(|p| p.confidence)
    }

    pub fn get(&self, kind: PatternKind) -> Option<&Pattern> {
        self.inner.get(&kind)
    }

    /// True when `selector` has already reinforced the pattern.
    pub fn has_example(&self, kind: PatternKind, selector: &str) -> bool {
        self.inner
            .get(&kind)
            .map(|p| p.examples.iter().any(|e| e == selector))
            .unwrap_or(false)
    }

    /// Reinforce a pattern: bump confidence by `step` up to `cap` and record
    /// the selector as an example. Returns the new confidence.
    pub fn reinforce(&mut self, kind: PatternKind, selector: &str, step: f64, cap: f64) -> f64 {
        let pattern = self.inner.entry(kind).or_insert_with(|| Pattern {
            kind,
            confidence: SEED_CONFIDENCE,
            examples: Vec::new(),
        });
        pattern.confidence = (pattern.confidence + step).min(cap).clamp(0.0, 1.0);
        if !pattern.examples.iter().any(|e| e == selector) {
            pattern.examples.push(selector.to_string());
        }
        pattern.confidence
    }

    /// Merge another book into this one, keeping the higher confidence and
    /// the union of examples.
    pub fn merge(&mut self, other: PatternBook) {
        for (kind, pattern) in other.inner {
            match self.inner.get_mut(&kind) {
                Some(existing) => {
                    existing.confidence = existing.confidence.max(pattern.confidence);
                    for example in pattern.examples {
                        if !existing.examples.iter().any(|e| *e == example) {
                            existing.examples.push(example);
                        }
                    }
                }
                None => {
                    self.inner.insert(kind, pattern);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.inner.values()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
