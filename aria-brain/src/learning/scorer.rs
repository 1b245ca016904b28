//! Category scorer
//!
//! Runs immediately after accumulation, in two passes: refresh positional
//! variances (and the global high-water mark), then derive the four scores
//! and feed the winner through the inertia protocol.

use chrono::Utc;
use tracing::debug;

use aria_core::{clamp01, AriaResult, Category, CategoryScores, GlobalDelta, ScoringConfig};

use crate::store::{with_backend_retry, Store};
use crate::tick::Tick;

/// Variance of integer positions: `mean(x^2) - mean(x)^2`
fn position_variance(positions: &[u32]) -> f32 {
    if positions.is_empty() {
        return 0.0;
    }
    let n = positions.len() as f32;
    let mean: f32 = positions.iter().map(|p| *p as f32).sum::<f32>() / n;
    let mean_sq: f32 = positions.iter().map(|p| (*p as f32) * (*p as f32)).sum::<f32>() / n;
    (mean_sq - mean * mean).max(0.0)
}

/// Score every token touched by this tick and apply category inertia.
///
/// Returns the number of tokens holding a committed category afterwards.
pub fn score<S: Store>(store: &S, tick: &mut Tick, config: &ScoringConfig) -> AriaResult<usize> {
    // Pass A: refresh variances, then a single global write so Pass B
    // reads the updated high-water mark
    let mut batch_max = 0.0f32;
    for token in tick.token_set.clone() {
        let positions = store.recent_positions(&token, config.position_history)?;
        let variance = position_variance(&positions);
        if variance > batch_max {
            batch_max = variance;
        }
        if let Some(stat) = tick.stats.get_mut(&token) {
            stat.positional_variance = variance;
        }
    }
    with_backend_retry(|| store.update_global_stats(&GlobalDelta::default(), Some(batch_max)))?;

    // Pass B: scores and categories against the updated globals
    let globals = store.get_global_stats()?;
    let g_ctx = globals.total_contexts_seen.max(1) as f32;
    let g_adj = globals.total_adj_windows.max(1) as f32;
    let g_var = globals.max_positional_variance.max(1.0);

    let now = Utc::now().timestamp();
    let mut categorized = 0;

    for token in tick.token_set.clone() {
        let stat = tick
            .stats
            .get_mut(&token)
            .expect("stat loaded for every distinct token");

        let occ = stat.total_occurrences.max(1) as f32;
        let variance_share = stat.positional_variance / g_var;

        stat.scores = CategoryScores {
            stability: clamp01(
                stat.context_count as f32 / g_ctx + stat.unique_adjacency_count as f32 / g_adj
                    - variance_share,
            ),
            transition: clamp01(
                stat.bridge_count as f32 / occ
                    + stat.temporal_adj_count as f32 / occ
                    + variance_share,
            ),
            dependency: clamp01(
                stat.adjacent_to_stable as f32 / occ + stat.contrast_pair_count as f32 / occ
                    - stat.standalone_count as f32 / occ,
            ),
            structural: clamp01(
                stat.total_occurrences as f32 / g_ctx + stat.temporal_adj_count as f32 / occ
                    - stat.unique_adjacency_count as f32 / g_adj
                    - stat.standalone_count as f32 / occ
                    - variance_share,
            ),
        };

        let candidate = if stat.total_occurrences < config.min_occurrences {
            Category::Unclassified
        } else if stat.scores.max() <= config.category_floor {
            Category::Unclassified
        } else {
            stat.scores.dominant()
        };

        if stat.apply_candidate(candidate, config.inertia_threshold) {
            debug!(
                "Category committed: '{}' -> {}",
                stat.token,
                stat.category.as_str()
            );
        }

        if stat.category != Category::Unclassified {
            categorized += 1;
        }

        stat.updated_at = now;
        store.upsert_token_stat(stat)?;
    }

    tick.report.categorized = Some(categorized);
    Ok(categorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::accumulator::accumulate;
    use crate::store::MemoryStore;
    use aria_core::tokenize;

    fn process(store: &MemoryStore, text: &str) {
        let index = store.next_message_index().unwrap();
        let mut tick = Tick::new(index, tokenize(text));
        let config = ScoringConfig::default();
        accumulate(store, &mut tick, &config).unwrap();
        score(store, &mut tick, &config).unwrap();
    }

    #[test]
    fn test_variance_formula() {
        assert_eq!(position_variance(&[]), 0.0);
        assert_eq!(position_variance(&[3]), 0.0);
        assert_eq!(position_variance(&[2, 2, 2]), 0.0);
        // positions 0 and 2: mean 1, mean_sq 2, variance 1
        assert!((position_variance(&[0, 2]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_occurrence_stays_unclassified() {
        let store = MemoryStore::new();
        process(&store, "ephemeral visitor");
        let stat = store.get_token_stat("ephemeral").unwrap().unwrap();
        assert_eq!(stat.category, Category::Unclassified);
        assert_eq!(stat.total_occurrences, 1);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let store = MemoryStore::new();
        for _ in 0..30 {
            process(&store, "the weather is beautiful today");
            process(&store, "the weather was terrible yesterday");
        }
        for token in ["the", "weather", "is", "beautiful", "today"] {
            let stat = store.get_token_stat(token).unwrap().unwrap();
            for s in [
                stat.scores.stability,
                stat.scores.transition,
                stat.scores.dependency,
                stat.scores.structural,
            ] {
                assert!((0.0..=1.0).contains(&s), "{} score {} out of range", token, s);
            }
        }
    }

    #[test]
    fn test_category_changes_are_inert() {
        let store = MemoryStore::new();
        // Every category change must survive three consecutive wins, so
        // after two messages nothing can be committed yet
        process(&store, "morning coffee tastes wonderful");
        process(&store, "morning coffee tastes wonderful");
        let stat = store.get_token_stat("coffee").unwrap().unwrap();
        assert_eq!(stat.category, Category::Unclassified);

        process(&store, "morning coffee tastes wonderful");
        process(&store, "morning coffee tastes wonderful");
        let stat = store.get_token_stat("coffee").unwrap().unwrap();
        // By now a candidate has had three consecutive wins available
        if stat.category == Category::Unclassified {
            // Still pending: scores never beat the floor, which is also valid
            assert!(stat.scores.max() <= 0.15 || stat.pending_count < 3);
        }
    }

    #[test]
    fn test_max_variance_visible_to_same_tick() {
        let store = MemoryStore::new();
        // A token that jumps around: "echo" at positions 0, then 3
        process(&store, "echo alpha beta gamma");
        process(&store, "alpha beta gamma echo");
        let globals = store.get_global_stats().unwrap();
        // echo positions {0, 3}: variance 2.25, above the 1.0 floor
        assert!(globals.max_positional_variance >= 2.25 - 1e-5);
    }
}
