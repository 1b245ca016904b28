//! Token pairs and strength tiers
//!
//! A pair is the co-occurrence of two adjacent tokens, keyed by the sorted
//! pair joined with `_`. Strength moves a pair across three tiers with
//! progressively slower decay cadences; a pair whose strength collapses is
//! retired to the `decay` tier rather than deleted.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Tier boundary: below this strength a pair is `short`
pub const SHORT_MAX: f32 = 0.30;
/// Tier boundary: below this strength (and at least SHORT_MAX) a pair is `medium`
pub const MEDIUM_MAX: f32 = 0.80;
/// Strength floor: a decayed pair below this is retired
pub const DECAY_MIN: f32 = 0.01;

/// Decay cadence tier of a pair
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Fresh pairs, fast decay
    Short,
    /// Established pairs
    Medium,
    /// Entrenched pairs, near-immortal
    Long,
    /// Retired pairs, invisible to queries until re-seen
    Decay,
}

impl Tier {
    /// Tier a live pair belongs to at a given strength
    pub fn for_strength(strength: f32) -> Tier {
        if strength < SHORT_MAX {
            Tier::Short
        } else if strength < MEDIUM_MAX {
            Tier::Medium
        } else {
            Tier::Long
        }
    }

    /// Short name used in reports and queries
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Short => "short",
            Tier::Medium => "medium",
            Tier::Long => "long",
            Tier::Decay => "decay",
        }
    }
}

/// Canonical key for a two-token pair: sorted, joined with `_`
pub fn pattern_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}

/// A reinforced co-occurrence of two adjacent tokens
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Pair {
    /// Lexicographically smaller token
    pub token_a: String,
    /// Lexicographically larger token
    pub token_b: String,
    /// Total adjacent co-occurrences observed
    pub frequency: u64,
    /// Connection strength in [0, 1]
    pub strength: f32,
    /// Category snapshot at last write, `"catA->catB"`
    pub category_pattern: String,
    /// Times this pair was reinforced
    pub reinforcement_count: u64,
    /// Times this pair was decayed
    pub decay_count: u64,
    /// Current decay tier
    pub tier: Tier,
    /// Message index at which the next decay fires
    pub decay_at_message: u64,
    /// Message index of the last reinforcement
    pub last_seen_message_index: u64,
}

impl Pair {
    /// Fresh pair for a first adjacent occurrence.
    ///
    /// Tokens are sorted into canonical order; the caller supplies the
    /// categories for the snapshot and the decay interval for the short
    /// tier.
    pub fn new(
        a: &str,
        b: &str,
        cat_a: Category,
        cat_b: Category,
        strength: f32,
        message_index: u64,
        short_interval: u64,
    ) -> Self {
        let (token_a, token_b, first, second) = if a <= b {
            (a.to_string(), b.to_string(), cat_a, cat_b)
        } else {
            (b.to_string(), a.to_string(), cat_b, cat_a)
        };
        Self {
            token_a,
            token_b,
            frequency: 1,
            strength,
            category_pattern: format!("{}->{}", first.as_str(), second.as_str()),
            reinforcement_count: 1,
            decay_count: 0,
            tier: Tier::Short,
            decay_at_message: message_index + short_interval,
            last_seen_message_index: message_index,
        }
    }

    /// Canonical key of this pair
    pub fn pattern_key(&self) -> String {
        pattern_key(&self.token_a, &self.token_b)
    }

    /// The pair's other endpoint, if `token` is one of the two
    pub fn partner_of(&self, token: &str) -> Option<&str> {
        if self.token_a == token {
            Some(&self.token_b)
        } else if self.token_b == token {
            Some(&self.token_a)
        } else {
            None
        }
    }

    /// Whether this pair contains the given token
    pub fn contains(&self, token: &str) -> bool {
        self.token_a == token || self.token_b == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_key_is_canonical() {
        assert_eq!(pattern_key("weather", "the"), "the_weather");
        assert_eq!(pattern_key("the", "weather"), "the_weather");
        assert_eq!(pattern_key("good", "morning"), "good_morning");
    }

    #[test]
    fn test_new_pair_sorts_tokens_and_categories() {
        let p = Pair::new(
            "weather",
            "the",
            Category::Stable,
            Category::Structural,
            0.02,
            7,
            50,
        );
        assert_eq!(p.token_a, "the");
        assert_eq!(p.token_b, "weather");
        assert_eq!(p.category_pattern, "structural->stable");
        assert_eq!(p.tier, Tier::Short);
        assert_eq!(p.decay_at_message, 57);
    }

    #[test]
    fn test_tier_derives_from_strength() {
        assert_eq!(Tier::for_strength(0.0), Tier::Short);
        assert_eq!(Tier::for_strength(0.29), Tier::Short);
        assert_eq!(Tier::for_strength(0.30), Tier::Medium);
        assert_eq!(Tier::for_strength(0.79), Tier::Medium);
        assert_eq!(Tier::for_strength(0.80), Tier::Long);
        assert_eq!(Tier::for_strength(1.0), Tier::Long);
    }

    #[test]
    fn test_partner_of() {
        let p = Pair::new(
            "good",
            "morning",
            Category::Unclassified,
            Category::Unclassified,
            0.02,
            1,
            50,
        );
        assert_eq!(p.partner_of("good"), Some("morning"));
        assert_eq!(p.partner_of("morning"), Some("good"));
        assert_eq!(p.partner_of("evening"), None);
    }
}
