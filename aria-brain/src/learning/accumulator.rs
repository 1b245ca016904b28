//! Token statistics accumulator
//!
//! First pipeline stage after the counter: loads every token's stats,
//! snapshots the stable set, appends position samples, and applies the
//! per-message counter increments.

use std::collections::{HashMap, HashSet};

use aria_core::{lexicon, AriaResult, Category, GlobalDelta, ScoringConfig, TokenStat};

use crate::store::{with_backend_retry, Store};
use crate::tick::Tick;

/// Accumulate one message's occurrences into token statistics.
///
/// Mutates the stats held in the tick; position samples and the global
/// delta are written to the store here, the stats themselves are persisted
/// by the scorer once scores are refreshed.
pub fn accumulate<S: Store>(store: &S, tick: &mut Tick, config: &ScoringConfig) -> AriaResult<()> {
    let n = tick.tokens.len();

    // Load or create stats for every distinct token
    for token in &tick.token_set {
        let stat = store
            .get_token_stat(token)?
            .unwrap_or_else(|| TokenStat::new(token.clone()));
        tick.stats.insert(token.clone(), stat);
    }

    // Stable-set snapshot: taken once, before any update in this message
    tick.stable_set = tick
        .stats
        .values()
        .filter(|s| s.category == Category::Stable)
        .map(|s| s.token.clone())
        .collect();

    // Neighborhoods: distinct adjacent tokens per token for this message
    let mut adj_sets: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut occurrences: HashMap<&str, u64> = HashMap::new();
    let mut bridges: HashMap<&str, u64> = HashMap::new();
    let window = config.adjacency_window;

    for (i, token) in tick.tokens.iter().enumerate() {
        store.append_token_position(token, i as u32, tick.message_index)?;
        *occurrences.entry(token.as_str()).or_insert(0) += 1;

        let lo = i.saturating_sub(window);
        let hi = (i + window).min(n.saturating_sub(1));
        let adj = adj_sets.entry(token.as_str()).or_default();
        for (j, neighbor) in tick.tokens.iter().enumerate().take(hi + 1).skip(lo) {
            if j != i {
                adj.insert(neighbor.as_str());
            }
        }

        // Interior occurrence flanked by stable tokens on both sides
        if i > 0
            && i < n - 1
            && tick.stable_set.contains(&tick.tokens[i - 1])
            && tick.stable_set.contains(&tick.tokens[i + 1])
        {
            *bridges.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let token_set: HashSet<&str> = tick.tokens.iter().map(|t| t.as_str()).collect();

    for token in tick.token_set.clone() {
        let adj = adj_sets.remove(token.as_str()).unwrap_or_default();
        let stat = tick
            .stats
            .get_mut(&token)
            .expect("stat loaded for every distinct token");

        stat.total_occurrences += occurrences.get(token.as_str()).copied().unwrap_or(0);

        // One context per distinct message
        if stat.last_message_index != tick.message_index {
            stat.context_count += 1;
        }

        stat.bridge_count += bridges.get(token.as_str()).copied().unwrap_or(0);

        if adj.iter().any(|w| lexicon::is_temporal_marker(w)) {
            stat.temporal_adj_count += 1;
        }
        if adj.iter().any(|w| tick.stable_set.contains(*w)) {
            stat.adjacent_to_stable += 1;
        }
        if let Some(partner) = lexicon::contrast_partner(&token) {
            if token_set.contains(partner) {
                stat.contrast_pair_count += 1;
            }
        }
        if tick.standalone {
            stat.standalone_count += 1;
        }

        // High-water mark over distinct neighbors in one message
        let adj_count = adj.len() as u64;
        if adj_count > stat.unique_adjacency_count {
            stat.unique_adjacency_count = adj_count;
        }

        stat.last_message_index = tick.message_index;
    }

    // One global write per message
    let delta = GlobalDelta {
        contexts: 1,
        adj_windows: n.saturating_sub(1) as u64,
        tokens: n as u64,
    };
    with_backend_retry(|| store.update_global_stats(&delta, None))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use aria_core::tokenize;

    fn run_tick(store: &MemoryStore, text: &str, index: u64) -> Tick {
        let mut tick = Tick::new(index, tokenize(text));
        accumulate(store, &mut tick, &ScoringConfig::default()).unwrap();
        tick
    }

    #[test]
    fn test_counts_after_one_message() {
        let store = MemoryStore::new();
        let tick = run_tick(&store, "the weather is beautiful today", 1);

        let weather = &tick.stats["weather"];
        assert_eq!(weather.total_occurrences, 1);
        assert_eq!(weather.context_count, 1);
        // Neighbors of "weather" at position 1: the, is, beautiful
        assert_eq!(weather.unique_adjacency_count, 3);
        assert_eq!(weather.last_message_index, 1);

        // "today" sits next to the temporal marker... itself. "today" is
        // a marker but its own neighbors are not.
        let today = &tick.stats["today"];
        assert_eq!(today.temporal_adj_count, 0);
        // "beautiful" has "today" in its window
        assert_eq!(tick.stats["beautiful"].temporal_adj_count, 1);
    }

    #[test]
    fn test_context_count_once_per_message_for_repeats() {
        let store = MemoryStore::new();
        let tick = run_tick(&store, "good morning good evening good night", 1);

        let good = &tick.stats["good"];
        assert_eq!(good.total_occurrences, 3);
        assert_eq!(good.context_count, 1);
    }

    #[test]
    fn test_standalone_message() {
        let store = MemoryStore::new();
        let tick = run_tick(&store, "hello", 1);
        let hello = &tick.stats["hello"];
        assert_eq!(hello.standalone_count, 1);
        assert_eq!(hello.unique_adjacency_count, 0);
    }

    #[test]
    fn test_contrast_pair_needs_both_partners() {
        let store = MemoryStore::new();
        let tick = run_tick(&store, "good food bad mood", 1);
        assert_eq!(tick.stats["good"].contrast_pair_count, 1);
        assert_eq!(tick.stats["bad"].contrast_pair_count, 1);
        assert_eq!(tick.stats["food"].contrast_pair_count, 0);

        let tick = run_tick(&store, "good food great mood", 2);
        assert_eq!(tick.stats["good"].contrast_pair_count, 0);
    }

    #[test]
    fn test_unique_adjacency_is_high_water_mark() {
        let store = MemoryStore::new();
        let tick = run_tick(&store, "alpha beta gamma delta", 1);
        // "beta" at 1 sees alpha, gamma, delta
        assert_eq!(tick.stats["beta"].unique_adjacency_count, 3);
        for stat in tick.stats.values() {
            store.upsert_token_stat(stat).unwrap();
        }

        // Narrower context later must not lower the mark
        let tick = run_tick(&store, "beta alpha", 2);
        assert_eq!(tick.stats["beta"].unique_adjacency_count, 3);
    }

    #[test]
    fn test_global_delta_single_write() {
        let store = MemoryStore::new();
        run_tick(&store, "the weather is beautiful today", 1);
        let globals = store.get_global_stats().unwrap();
        // Initialized at {1,1,1}; one message adds 1 ctx, 4 windows, 5 tokens
        assert_eq!(globals.total_contexts_seen, 2);
        assert_eq!(globals.total_adj_windows, 5);
        assert_eq!(globals.total_tokens_seen, 6);
    }
}
