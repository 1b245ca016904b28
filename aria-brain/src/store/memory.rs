//! In-memory reference store
//!
//! Concurrent, process-local implementation of [`Store`]. Suitable for
//! tests and single-process deployments; state survives restarts through
//! bincode snapshots.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use aria_core::{AriaError, AriaResult, Category, GlobalDelta, GlobalStats, Pair, Tier, TokenStat};

use super::{InsertOutcome, Store};

/// Position samples kept per token (only the most recent matter)
const POSITION_CAP: usize = 100;

/// How long a cached global-stats read stays valid
const GLOBALS_CACHE_TTL: Duration = Duration::from_secs(5);

/// Concurrent in-memory store
pub struct MemoryStore {
    /// Message counter (the logical clock)
    counter: AtomicU64,
    /// Token statistics by token
    tokens: DashMap<String, TokenStat>,
    /// Recent position samples by token: (position, message_index)
    positions: DashMap<String, Vec<(u32, u64)>>,
    /// Pairs by canonical pattern key
    pairs: DashMap<String, Pair>,
    /// The global normalization record
    globals: RwLock<GlobalStats>,
    /// TTL read cache over the global record, invalidated on write
    globals_cache: RwLock<Option<(Instant, GlobalStats)>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Fresh, empty store
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            tokens: DashMap::new(),
            positions: DashMap::new(),
            pairs: DashMap::new(),
            globals: RwLock::new(GlobalStats::default()),
            globals_cache: RwLock::new(None),
        }
    }

    /// Load a snapshot from disk, or start fresh if the file is missing
    /// or unreadable
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match fs::read(path) {
                Ok(data) => match bincode::deserialize::<Snapshot>(&data) {
                    Ok(snapshot) => {
                        let store = Self::from_snapshot(snapshot);
                        info!(
                            "Memory loaded: {} tokens, {} pairs, index {}",
                            store.tokens.len(),
                            store.pairs.len(),
                            store.counter.load(Ordering::SeqCst)
                        );
                        return store;
                    }
                    Err(e) => {
                        warn!("Memory snapshot corrupted, starting fresh: {}", e);
                    }
                },
                Err(e) => {
                    warn!("Cannot read memory snapshot: {}", e);
                }
            }
        }
        info!("Creating new memory");
        Self::new()
    }

    /// Write a snapshot of the whole store to disk
    pub fn save(&self, path: &Path) -> AriaResult<()> {
        let snapshot = Snapshot {
            message_index: self.counter.load(Ordering::SeqCst),
            tokens: self.tokens.iter().map(|e| e.value().clone()).collect(),
            positions: self
                .positions
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            pairs: self.pairs.iter().map(|e| e.value().clone()).collect(),
            globals: *self.globals.read(),
        };
        let data =
            bincode::serialize(&snapshot).map_err(|e| AriaError::serialization(e.to_string()))?;
        fs::write(path, data)?;
        Ok(())
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        store
            .counter
            .store(snapshot.message_index, Ordering::SeqCst);
        for stat in snapshot.tokens {
            store.tokens.insert(stat.token.clone(), stat);
        }
        for (token, samples) in snapshot.positions {
            store.positions.insert(token, samples);
        }
        for pair in snapshot.pairs {
            store.pairs.insert(pair.pattern_key(), pair);
        }
        *store.globals.write() = snapshot.globals;
        store
    }
}

/// On-disk form of the whole store
#[derive(Serialize, Deserialize)]
struct Snapshot {
    message_index: u64,
    tokens: Vec<TokenStat>,
    positions: Vec<(String, Vec<(u32, u64)>)>,
    pairs: Vec<Pair>,
    globals: GlobalStats,
}

impl Store for MemoryStore {
    fn next_message_index(&self) -> AriaResult<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn current_message_index(&self) -> AriaResult<u64> {
        Ok(self.counter.load(Ordering::SeqCst))
    }

    fn get_token_stat(&self, token: &str) -> AriaResult<Option<TokenStat>> {
        Ok(self.tokens.get(token).map(|e| e.value().clone()))
    }

    fn upsert_token_stat(&self, stat: &TokenStat) -> AriaResult<()> {
        self.tokens.insert(stat.token.clone(), stat.clone());
        Ok(())
    }

    fn append_token_position(
        &self,
        token: &str,
        position: u32,
        message_index: u64,
    ) -> AriaResult<()> {
        let mut samples = self.positions.entry(token.to_string()).or_default();
        samples.push((position, message_index));
        let len = samples.len();
        if len > POSITION_CAP {
            samples.drain(0..len - POSITION_CAP);
        }
        Ok(())
    }

    fn recent_positions(&self, token: &str, limit: usize) -> AriaResult<Vec<u32>> {
        Ok(self
            .positions
            .get(token)
            .map(|samples| {
                let skip = samples.len().saturating_sub(limit);
                samples[skip..].iter().map(|(p, _)| *p).collect()
            })
            .unwrap_or_default())
    }

    fn get_many_categories(&self, tokens: &[String]) -> AriaResult<HashMap<String, Category>> {
        let mut map = HashMap::with_capacity(tokens.len());
        for token in tokens {
            if let Some(stat) = self.tokens.get(token) {
                map.insert(token.clone(), stat.category);
            }
        }
        Ok(map)
    }

    fn get_global_stats(&self) -> AriaResult<GlobalStats> {
        if let Some((at, cached)) = *self.globals_cache.read() {
            if at.elapsed() < GLOBALS_CACHE_TTL {
                return Ok(cached);
            }
        }
        let fresh = *self.globals.read();
        *self.globals_cache.write() = Some((Instant::now(), fresh));
        Ok(fresh)
    }

    fn update_global_stats(
        &self,
        delta: &GlobalDelta,
        new_max_variance: Option<f32>,
    ) -> AriaResult<()> {
        self.globals.write().apply(delta, new_max_variance);
        *self.globals_cache.write() = None;
        Ok(())
    }

    fn get_pair(&self, pattern_key: &str) -> AriaResult<Option<Pair>> {
        Ok(self.pairs.get(pattern_key).map(|e| e.value().clone()))
    }

    fn insert_pair(&self, pair: &Pair) -> AriaResult<InsertOutcome> {
        match self.pairs.entry(pair.pattern_key()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(InsertOutcome::Conflict),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(pair.clone());
                Ok(InsertOutcome::Created)
            }
        }
    }

    fn update_pair(&self, pattern_key: &str, apply: &mut dyn FnMut(&mut Pair)) -> AriaResult<()> {
        if let Some(mut entry) = self.pairs.get_mut(pattern_key) {
            apply(entry.value_mut());
        }
        Ok(())
    }

    fn search_pairs_by_word(&self, token: &str) -> AriaResult<Vec<Pair>> {
        let mut found: Vec<Pair> = self
            .pairs
            .iter()
            .filter(|e| e.value().tier != Tier::Decay && e.value().contains(token))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));
        Ok(found)
    }

    fn top_pairs(&self, limit: usize, tier: Option<Tier>) -> AriaResult<Vec<Pair>> {
        let mut found: Vec<Pair> = self
            .pairs
            .iter()
            .filter(|e| match tier {
                Some(t) => e.value().tier == t,
                None => e.value().tier != Tier::Decay,
            })
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));
        found.truncate(limit);
        Ok(found)
    }

    fn pairs_due_for_decay(&self, message_index: u64) -> AriaResult<Vec<Pair>> {
        Ok(self
            .pairs
            .iter()
            .filter(|e| {
                e.value().tier != Tier::Decay && e.value().decay_at_message <= message_index
            })
            .map(|e| e.value().clone())
            .collect())
    }

    fn move_pair_tier(&self, pattern_key: &str, new_tier: Tier) -> AriaResult<()> {
        if let Some(mut entry) = self.pairs.get_mut(pattern_key) {
            entry.value_mut().tier = new_tier;
        }
        Ok(())
    }

    fn stale_tokens(&self, cutoff: i64, limit: usize) -> AriaResult<Vec<String>> {
        Ok(self
            .tokens
            .iter()
            .filter(|e| e.value().updated_at <= cutoff)
            .map(|e| e.key().clone())
            .take(limit)
            .collect())
    }

    fn tokens_by_category(&self, category: Category, limit: usize) -> AriaResult<Vec<TokenStat>> {
        let mut found: Vec<TokenStat> = self
            .tokens
            .iter()
            .filter(|e| e.value().category == category)
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| b.total_occurrences.cmp(&a.total_occurrences));
        found.truncate(limit);
        Ok(found)
    }

    fn token_count(&self) -> AriaResult<usize> {
        Ok(self.tokens.len())
    }

    fn pair_counts(&self) -> AriaResult<HashMap<Tier, usize>> {
        let mut counts = HashMap::new();
        for entry in self.pairs.iter() {
            *counts.entry(entry.value().tier).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
