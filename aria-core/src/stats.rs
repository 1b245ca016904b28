//! Global normalization record
//!
//! A single record shared by every token; the category scorer divides
//! per-token counters by these totals. Fields start at 1 so the very first
//! message never divides by zero.

use serde::{Deserialize, Serialize};

/// Global statistics, one record per store
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GlobalStats {
    /// Messages accepted so far
    pub total_contexts_seen: u64,
    /// Sum of per-message adjacency windows (n-1 per n-token message)
    pub total_adj_windows: u64,
    /// Largest positional variance ever observed for any token
    pub max_positional_variance: f32,
    /// Total token occurrences ever seen
    pub total_tokens_seen: u64,
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self {
            total_contexts_seen: 1,
            total_adj_windows: 1,
            max_positional_variance: 1.0,
            total_tokens_seen: 1,
        }
    }
}

/// Additive update applied to the global record once per message
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalDelta {
    /// Contexts to add (1 per accepted message)
    pub contexts: u64,
    /// Adjacency windows to add (max(0, n-1))
    pub adj_windows: u64,
    /// Token occurrences to add (n)
    pub tokens: u64,
}

impl GlobalStats {
    /// Apply a delta and optionally raise the variance high-water mark
    pub fn apply(&mut self, delta: &GlobalDelta, new_max_variance: Option<f32>) {
        self.total_contexts_seen += delta.contexts;
        self.total_adj_windows += delta.adj_windows;
        self.total_tokens_seen += delta.tokens;
        if let Some(v) = new_max_variance {
            if v > self.max_positional_variance {
                self.max_positional_variance = v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_avoid_division_by_zero() {
        let g = GlobalStats::default();
        assert_eq!(g.total_contexts_seen, 1);
        assert_eq!(g.total_adj_windows, 1);
        assert_eq!(g.total_tokens_seen, 1);
        assert!(g.max_positional_variance >= 1.0);
    }

    #[test]
    fn test_max_variance_only_rises() {
        let mut g = GlobalStats::default();
        g.apply(&GlobalDelta::default(), Some(4.5));
        assert_eq!(g.max_positional_variance, 4.5);
        g.apply(&GlobalDelta::default(), Some(2.0));
        assert_eq!(g.max_positional_variance, 4.5);
    }
}
