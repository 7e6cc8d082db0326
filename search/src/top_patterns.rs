//! Bounded store of the best-scoring patterns seen during a search.

use ges_kernel::graph::GraphStore;
use ges_kernel::proof::canon::f64_value;
use ges_kernel::proof::graph_fingerprint;
use ges_kernel::proof::hash::ContentHash;

/// A pattern with the running score it was reached at.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPattern {
    pub score: f64,
    pub pattern: GraphStore,
    pub fingerprint: ContentHash,
}

impl ScoredPattern {
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "fingerprint": self.fingerprint.as_str(),
            "pattern": self.pattern.to_json_value(),
            "score": f64_value(self.score),
        })
    }
}

/// Keeps at most `capacity` distinct patterns, best score first.
///
/// Patterns are deduplicated by fingerprint; a repeat keeps the higher
/// score. Ties order by fingerprint.
#[derive(Debug, Clone)]
pub struct TopPatterns {
    capacity: usize,
    entries: Vec<ScoredPattern>,
}

impl TopPatterns {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Offer a pattern. Returns `true` if the store changed.
    pub fn offer(&mut self, score: f64, pattern: &GraphStore) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() == self.capacity {
            if let Some(worst) = self.entries.last() {
                if score.total_cmp(&worst.score).is_le() {
                    return false;
                }
            }
        }
        let Ok(fingerprint) = graph_fingerprint(pattern) else {
            return false;
        };
        if let Some(existing) = self.entries.iter_mut().find(|e| e.fingerprint == fingerprint) {
            if score.total_cmp(&existing.score).is_le() {
                return false;
            }
            existing.score = score;
        } else {
            self.entries.push(ScoredPattern {
                score,
                pattern: pattern.clone(),
                fingerprint,
            });
        }
        self.entries.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        });
        self.entries.truncate(self.capacity);
        true
    }

    #[must_use]
    pub fn entries(&self) -> &[ScoredPattern] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ScoredPattern> {
        self.entries
    }
}
