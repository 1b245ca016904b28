//! Per-token statistics
//!
//! One record per distinct lowercase token, created on first sighting and
//! never deleted. Counters feed the category scorer; the inertia fields
//! make category changes sticky.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryScores};

/// Behavioral counters and derived scores for one token
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TokenStat {
    /// The token itself (lowercase, unique)
    pub token: String,

    /// Every occurrence ever seen (not capped per message)
    pub total_occurrences: u64,
    /// Distinct messages this token appeared in
    pub context_count: u64,
    /// High-water mark of distinct neighbors seen in a single message
    pub unique_adjacency_count: u64,
    /// Interior occurrences flanked by stable tokens on both sides
    pub bridge_count: u64,
    /// Messages where a temporal marker sat in the adjacency window
    pub temporal_adj_count: u64,
    /// Messages where a stable token sat in the adjacency window
    pub adjacent_to_stable: u64,
    /// Messages where a known contrast partner co-occurred
    pub contrast_pair_count: u64,
    /// Messages where this token was the whole message
    pub standalone_count: u64,

    /// Variance of recent positions (refreshed each scoring pass)
    pub positional_variance: f32,

    /// The four behavioral scores
    pub scores: CategoryScores,
    /// Currently committed category
    pub category: Category,
    /// Candidate category waiting for confirmation
    pub pending_category: Option<Category>,
    /// Consecutive ticks the pending candidate has won (0..=3)
    pub pending_count: u8,

    /// Index of the last message that touched this token
    pub last_message_index: u64,
    /// Unix seconds of the last update (drives the aging pass)
    pub updated_at: i64,
}

impl TokenStat {
    /// Fresh all-zero record for a token seen for the first time
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            total_occurrences: 0,
            context_count: 0,
            unique_adjacency_count: 0,
            bridge_count: 0,
            temporal_adj_count: 0,
            adjacent_to_stable: 0,
            contrast_pair_count: 0,
            standalone_count: 0,
            positional_variance: 0.0,
            scores: CategoryScores::default(),
            category: Category::Unclassified,
            pending_category: None,
            pending_count: 0,
            last_message_index: 0,
            updated_at: Utc::now().timestamp(),
        }
    }

    /// Apply the inertia protocol for a freshly derived candidate.
    ///
    /// A change of category is committed only after the same non-current
    /// candidate wins three consecutive ticks. Returns true when the
    /// committed category changed.
    pub fn apply_candidate(&mut self, candidate: Category, inertia_threshold: u8) -> bool {
        if candidate == self.category {
            self.pending_category = None;
            self.pending_count = 0;
            return false;
        }
        if Some(candidate) == self.pending_category {
            self.pending_count += 1;
            if self.pending_count >= inertia_threshold {
                self.category = candidate;
                self.pending_category = None;
                self.pending_count = 0;
                return true;
            }
        } else {
            self.pending_category = Some(candidate);
            self.pending_count = 1;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inertia_needs_three_consecutive_wins() {
        let mut stat = TokenStat::new("weather");
        assert!(!stat.apply_candidate(Category::Stable, 3));
        assert_eq!(stat.category, Category::Unclassified);
        assert!(!stat.apply_candidate(Category::Stable, 3));
        assert!(stat.apply_candidate(Category::Stable, 3));
        assert_eq!(stat.category, Category::Stable);
        assert_eq!(stat.pending_count, 0);
        assert!(stat.pending_category.is_none());
    }

    #[test]
    fn test_inertia_reset_on_different_candidate() {
        let mut stat = TokenStat::new("after");
        stat.apply_candidate(Category::Transition, 3);
        stat.apply_candidate(Category::Transition, 3);
        // A different candidate restarts the countdown
        stat.apply_candidate(Category::Structural, 3);
        assert_eq!(stat.pending_category, Some(Category::Structural));
        assert_eq!(stat.pending_count, 1);
        assert_eq!(stat.category, Category::Unclassified);
    }

    #[test]
    fn test_current_candidate_clears_pending() {
        let mut stat = TokenStat::new("the");
        stat.apply_candidate(Category::Structural, 3);
        assert_eq!(stat.pending_count, 1);
        stat.apply_candidate(Category::Unclassified, 3);
        assert_eq!(stat.pending_count, 0);
        assert!(stat.pending_category.is_none());
    }
}
