//! # The ARIA Engine
//!
//! Public face of the pipeline: feed messages in with
//! [`AriaEngine::process_message`], get text back with
//! [`AriaEngine::generate_response`]. One call to `process_message` is one
//! tick: counter advance, accumulation, scoring, pair updates, decay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

use aria_core::{
    tokenize, AriaConfig, AriaResult, Category, GlobalStats, Pair, ProcessReport, Tier, TokenStat,
};

use crate::generator::{chains, Chain, Generator};
use crate::learning::{accumulator, decay, pairs, scorer};
use crate::store::{with_backend_retry, Store};
use crate::tick::Tick;

/// Options for one generation call
#[derive(Clone, Copy, Debug)]
pub struct ResponseOptions {
    /// Character ceiling for the response
    pub max_length: usize,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self { max_length: 150 }
    }
}

/// Snapshot of what the memory currently holds
#[derive(Serialize, Clone, Debug)]
pub struct MemoryStats {
    /// Current value of the message counter
    pub message_index: u64,
    /// Distinct tokens known
    pub tokens: usize,
    /// Live pairs per tier
    pub pairs_short: usize,
    pub pairs_medium: usize,
    pub pairs_long: usize,
    /// Retired pairs
    pub pairs_decayed: usize,
    /// The global normalization record
    pub globals: GlobalStats,
}

/// Legacy cluster surface: a cluster is a pair viewed as a word group
#[derive(Serialize, Clone, Debug)]
pub struct ClusterView {
    /// The cluster's words
    pub words: Vec<String>,
    /// Connection strength
    pub strength: f32,
    /// Co-occurrence count
    pub frequency: u64,
    /// Decay tier
    pub tier: Tier,
}

impl From<&Pair> for ClusterView {
    fn from(pair: &Pair) -> Self {
        Self {
            words: vec![pair.token_a.clone(), pair.token_b.clone()],
            strength: pair.strength,
            frequency: pair.frequency,
            tier: pair.tier,
        }
    }
}

/// The learning engine over a store
pub struct AriaEngine<S: Store> {
    store: S,
    config: AriaConfig,
    /// Message index of the last aging run (rate limit)
    last_aging_index: AtomicU64,
}

impl<S: Store> AriaEngine<S> {
    /// Create an engine over a store
    pub fn new(store: S, config: AriaConfig) -> Self {
        Self {
            store,
            config,
            last_aging_index: AtomicU64::new(0),
        }
    }

    /// Engine with default configuration
    pub fn with_store(store: S) -> Self {
        Self::new(store, AriaConfig::default())
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one incoming message through the full pipeline.
    ///
    /// Invalid input (empty text, missing user) is reported, not raised;
    /// the counter does not advance for it. Only backend failures surface
    /// as errors.
    pub fn process_message(
        &self,
        text: &str,
        message_id: &str,
        user_id: &str,
    ) -> AriaResult<ProcessReport> {
        if user_id.trim().is_empty() {
            return Ok(ProcessReport::rejected("missing user"));
        }
        if text.trim().is_empty() {
            return Ok(ProcessReport::rejected("empty text"));
        }

        let tokenized = tokenize(text);
        if tokenized.is_empty() {
            return Ok(ProcessReport::no_tokens());
        }

        let message_index = with_backend_retry(|| self.store.next_message_index())?;
        debug!(
            "Tick {} (message {} from {}): {} tokens",
            message_index,
            message_id,
            user_id,
            tokenized.tokens.len()
        );

        let mut tick = Tick::new(message_index, tokenized);
        tick.report.tokens_processed = Some(tick.tokens.len());

        accumulator::accumulate(&self.store, &mut tick, &self.config.scoring)?;
        scorer::score(&self.store, &mut tick, &self.config.scoring)?;
        pairs::reinforce(&self.store, &mut tick, &self.config)?;
        decay::sweep(&self.store, &mut tick, &self.config)?;

        self.maybe_age(message_index)?;

        Ok(tick.report)
    }

    /// Run the aging pass if enough messages have gone by since the last
    /// run. One caller wins the race; everyone else skips.
    fn maybe_age(&self, message_index: u64) -> AriaResult<()> {
        let interval = self.config.decay.aging_interval;
        if interval == 0 {
            return Ok(());
        }
        let last = self.last_aging_index.load(Ordering::Relaxed);
        if message_index.saturating_sub(last) < interval {
            return Ok(());
        }
        if self
            .last_aging_index
            .compare_exchange(last, message_index, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            decay::age_idle_tokens(&self.store, &self.config)?;
        }
        Ok(())
    }

    /// Generate a response to a message. Never fails; empty memory and
    /// internal errors both answer `"..."`.
    pub fn generate_response(&self, text: &str, options: &ResponseOptions) -> String {
        Generator::new(&self.store, &self.config.generator).respond(text, options.max_length)
    }

    // =========================================================================
    // INFORMATIONAL QUERIES
    // =========================================================================

    /// Counts of everything the memory holds
    pub fn memory_stats(&self) -> AriaResult<MemoryStats> {
        let pair_counts = self.store.pair_counts()?;
        let count = |tier: Tier| pair_counts.get(&tier).copied().unwrap_or(0);
        Ok(MemoryStats {
            message_index: self.store.current_message_index()?,
            tokens: self.store.token_count()?,
            pairs_short: count(Tier::Short),
            pairs_medium: count(Tier::Medium),
            pairs_long: count(Tier::Long),
            pairs_decayed: count(Tier::Decay),
            globals: self.store.get_global_stats()?,
        })
    }

    /// Live pairs containing a word, strongest first
    pub fn search_by_word(&self, word: &str) -> AriaResult<Vec<Pair>> {
        let needle = word.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.store.search_pairs_by_word(&needle)
    }

    /// Full statistics for one token
    pub fn get_token_stats(&self, token: &str) -> AriaResult<Option<TokenStat>> {
        self.store.get_token_stat(&token.trim().to_lowercase())
    }

    /// Tokens committed to a category, most occurrences first
    pub fn get_tokens_by_category(
        &self,
        category: Category,
        limit: usize,
    ) -> AriaResult<Vec<TokenStat>> {
        self.store.tokens_by_category(category, limit)
    }

    /// Strongest pairs, optionally restricted to one tier
    pub fn get_top_pairs(&self, limit: usize, tier: Option<Tier>) -> AriaResult<Vec<Pair>> {
        self.store.top_pairs(limit, tier)
    }

    /// Emergent chains reachable from a word (never persisted)
    pub fn get_emergent_chains(&self, word: &str, max_len: usize) -> AriaResult<Vec<Chain>> {
        let seed = word.trim().to_lowercase();
        if seed.is_empty() {
            return Ok(Vec::new());
        }
        chains::discover(
            &self.store,
            &seed,
            max_len,
            self.config.generator.chain_fanout,
        )
    }

    // =========================================================================
    // LEGACY CLUSTER SURFACE (thin views over pairs)
    // =========================================================================

    /// Clusters containing a word: each live pair viewed as a word group
    pub fn search_clusters(&self, word: &str) -> AriaResult<Vec<ClusterView>> {
        Ok(self
            .search_by_word(word)?
            .iter()
            .map(ClusterView::from)
            .collect())
    }

    /// Strongest clusters overall
    pub fn top_clusters(&self, limit: usize) -> AriaResult<Vec<ClusterView>> {
        Ok(self
            .store
            .top_pairs(limit, None)?
            .iter()
            .map(ClusterView::from)
            .collect())
    }

    /// Current categories for a set of tokens, one round-trip
    pub fn categories_of(&self, tokens: &[String]) -> AriaResult<HashMap<String, Category>> {
        self.store.get_many_categories(tokens)
    }
}
