//! # Configuration - ARIA's Vital Parameters
//!
//! These parameters define how ARIA learns, forgets, and speaks.
//! Defaults are the tuned values; a handful can be overridden from the
//! environment for experiments.

use serde::{Deserialize, Serialize};
use std::env;

use crate::pair::Tier;

/// Master configuration for ARIA
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AriaConfig {
    /// Pair reinforcement settings
    pub reinforcement: ReinforcementConfig,

    /// Decay cadence and aging settings
    pub decay: DecayConfig,

    /// Category scoring settings
    pub scoring: ScoringConfig,

    /// Response generation settings
    pub generator: GeneratorConfig,
}

impl AriaConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("ARIA_MAX_WORDS") {
            if let Ok(n) = v.parse() {
                config.generator.max_words = n;
            }
        }
        if let Ok(v) = env::var("ARIA_RANDOMNESS") {
            if let Ok(r) = v.parse() {
                config.generator.randomness = r;
            }
        }
        if let Ok(v) = env::var("ARIA_MAX_LENGTH") {
            if let Ok(n) = v.parse() {
                config.generator.max_length_chars = n;
            }
        }
        if let Ok(v) = env::var("ARIA_AGING_INTERVAL") {
            if let Ok(n) = v.parse() {
                config.decay.aging_interval = n;
            }
        }

        config
    }
}

/// Pair reinforcement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReinforcementConfig {
    /// Base strength added per reinforcement (before category modifier)
    pub base: f32,

    /// Strength ceiling
    pub max: f32,
}

impl Default for ReinforcementConfig {
    fn default() -> Self {
        Self {
            base: 0.02,
            max: 1.0,
        }
    }
}

/// Decay cadence per tier, plus the slow aging pass over idle tokens
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Messages between decay events for short-tier pairs
    pub short_interval: u64,
    /// Strength fraction removed per short-tier decay
    pub short_rate: f32,

    /// Messages between decay events for medium-tier pairs
    pub medium_interval: u64,
    /// Strength fraction removed per medium-tier decay
    pub medium_rate: f32,

    /// Messages between decay events for long-tier pairs
    pub long_interval: u64,
    /// Strength fraction removed per long-tier decay
    pub long_rate: f32,

    /// Messages between runs of the aging pass (cost control)
    pub aging_interval: u64,
    /// Seconds of idleness before a token's scores start aging
    pub aging_idle_secs: i64,
    /// Factor applied to an idle token's scores per aging run
    pub aging_factor: f32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            short_interval: 50,
            short_rate: 0.15,
            medium_interval: 200,
            medium_rate: 0.05,
            long_interval: 1000,
            long_rate: 0.01,
            aging_interval: 500,
            aging_idle_secs: 24 * 60 * 60,
            aging_factor: 0.99,
        }
    }
}

impl DecayConfig {
    /// Messages until the next decay event for a live tier
    pub fn interval(&self, tier: Tier) -> Option<u64> {
        match tier {
            Tier::Short => Some(self.short_interval),
            Tier::Medium => Some(self.medium_interval),
            Tier::Long => Some(self.long_interval),
            Tier::Decay => None,
        }
    }

    /// Strength fraction removed when a live tier decays
    pub fn rate(&self, tier: Tier) -> Option<f32> {
        match tier {
            Tier::Short => Some(self.short_rate),
            Tier::Medium => Some(self.medium_rate),
            Tier::Long => Some(self.long_rate),
            Tier::Decay => None,
        }
    }
}

/// Category scoring and inertia
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Best score must exceed this for any category to be assigned
    pub category_floor: f32,

    /// Occurrences required before a token can leave unclassified
    pub min_occurrences: u64,

    /// Consecutive wins a candidate needs to displace the category
    pub inertia_threshold: u8,

    /// Positions considered adjacent on each side of an occurrence
    pub adjacency_window: usize,

    /// Position samples consulted for variance (most recent first)
    pub position_history: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            category_floor: 0.15,
            min_occurrences: 2,
            inertia_threshold: 3,
            adjacency_window: 2,
            position_history: 100,
        }
    }
}

/// Response generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Hard ceiling on words in a response
    pub max_words: usize,
    /// A stage's output below this many words is rejected
    pub min_words: usize,
    /// Pairs weaker than this never enter the graph
    pub strength_threshold: f32,
    /// Random boost factor in neighbor scoring
    pub randomness: f32,
    /// Character ceiling for the final response
    pub max_length_chars: usize,

    /// Keywords explored during emergent phrase discovery
    pub phrase_keywords: usize,
    /// Maximum chain length during phrase discovery
    pub max_chain_len: usize,
    /// Outgoing edges followed per node during phrase discovery
    pub chain_fanout: usize,

    /// Keywords whose pairs seed the walk graph
    pub graph_keywords: usize,
    /// Top pairs fetched globally for the walk graph
    pub global_pairs: usize,

    /// Stable tokens considered for category composition
    pub composition_candidates: usize,
    /// Pairs returned by the raw-pair fallback
    pub fallback_pairs: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_words: 12,
            min_words: 3,
            strength_threshold: 0.01,
            randomness: 0.25,
            max_length_chars: 150,
            phrase_keywords: 5,
            max_chain_len: 5,
            chain_fanout: 5,
            graph_keywords: 10,
            global_pairs: 100,
            composition_candidates: 5,
            fallback_pairs: 3,
        }
    }
}
