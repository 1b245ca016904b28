//! # Store - Abstractions for ARIA's Persistence
//!
//! The engine owns no data. Every entity lives behind the [`Store`] trait,
//! which any table store with linearizable single-row reads and atomic
//! compare-and-update can implement. The in-memory reference
//! implementation lives in [`memory`].

pub mod memory;

pub use memory::MemoryStore;

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;

use aria_core::{AriaError, AriaResult, Category, GlobalDelta, GlobalStats, Pair, Tier, TokenStat};

/// Result of attempting to insert a pair under its pattern key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The pair was created
    Created,
    /// A pair already exists under this key (a concurrent writer won)
    Conflict,
}

/// Persistent storage for ARIA's learned state.
///
/// All operations fail with [`AriaError::Backend`] on I/O errors. Callers
/// hold entities only transiently during one message tick; the store owns
/// them.
pub trait Store: Send + Sync {
    /// Atomically advance the message counter and return the new value.
    ///
    /// This is the logical clock; every decay schedule hangs off it.
    fn next_message_index(&self) -> AriaResult<u64>;

    /// Fetch one token's statistics
    fn get_token_stat(&self, token: &str) -> AriaResult<Option<TokenStat>>;

    /// Insert or replace a token's statistics (idempotent on `token`)
    fn upsert_token_stat(&self, stat: &TokenStat) -> AriaResult<()>;

    /// Append one position sample for a token occurrence
    fn append_token_position(&self, token: &str, position: u32, message_index: u64)
        -> AriaResult<()>;

    /// Most recent position samples for a token, newest last
    fn recent_positions(&self, token: &str, limit: usize) -> AriaResult<Vec<u32>>;

    /// Current categories for many tokens in one round-trip.
    ///
    /// Unknown tokens are simply absent from the map.
    fn get_many_categories(&self, tokens: &[String]) -> AriaResult<HashMap<String, Category>>;

    /// The global normalization record
    fn get_global_stats(&self) -> AriaResult<GlobalStats>;

    /// Apply a delta to the global record, optionally raising the variance
    /// high-water mark, in one atomic write
    fn update_global_stats(&self, delta: &GlobalDelta, new_max_variance: Option<f32>)
        -> AriaResult<()>;

    /// Fetch a pair by its canonical key
    fn get_pair(&self, pattern_key: &str) -> AriaResult<Option<Pair>>;

    /// Insert a new pair; reports a conflict instead of overwriting
    fn insert_pair(&self, pair: &Pair) -> AriaResult<InsertOutcome>;

    /// Mutate an existing pair in place under the store's row lock.
    ///
    /// Missing keys are a silent no-op; the next tick re-reinforces.
    fn update_pair(&self, pattern_key: &str, apply: &mut dyn FnMut(&mut Pair)) -> AriaResult<()>;

    /// All live (non-decay) pairs containing a token, strongest first
    fn search_pairs_by_word(&self, token: &str) -> AriaResult<Vec<Pair>>;

    /// Strongest pairs overall, optionally restricted to one tier.
    ///
    /// Without a tier filter, decay-tier pairs are excluded.
    fn top_pairs(&self, limit: usize, tier: Option<Tier>) -> AriaResult<Vec<Pair>>;

    /// Live pairs whose decay is due at or before the given index
    fn pairs_due_for_decay(&self, message_index: u64) -> AriaResult<Vec<Pair>>;

    /// Move a pair to another tier
    fn move_pair_tier(&self, pattern_key: &str, new_tier: Tier) -> AriaResult<()>;

    /// Tokens whose last update is at or before the cutoff (unix seconds)
    fn stale_tokens(&self, cutoff: i64, limit: usize) -> AriaResult<Vec<String>>;

    /// Tokens currently committed to a category, most occurrences first
    fn tokens_by_category(&self, category: Category, limit: usize) -> AriaResult<Vec<TokenStat>>;

    /// Number of tokens known
    fn token_count(&self) -> AriaResult<usize>;

    /// Number of pairs in each tier
    fn pair_counts(&self) -> AriaResult<HashMap<Tier, usize>>;

    /// Current value of the message counter without advancing it
    fn current_message_index(&self) -> AriaResult<u64>;
}

/// Maximum attempts for transient backend failures
const RETRY_ATTEMPTS: u32 = 3;

/// Retry a store operation on transient backend errors.
///
/// Used for counter increments and global-stats writes: up to three
/// attempts with a short jittered backoff between them. Non-transient
/// errors propagate immediately.
pub fn with_backend_retry<T>(mut op: impl FnMut() -> AriaResult<T>) -> AriaResult<T> {
    let mut last = None;
    for attempt in 0..RETRY_ATTEMPTS {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt + 1 < RETRY_ATTEMPTS => {
                let jitter = rand::thread_rng().gen_range(0..15u64);
                std::thread::sleep(Duration::from_millis(10 * (attempt as u64 + 1) + jitter));
                last = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last.unwrap_or_else(|| AriaError::backend("retries exhausted")))
}
