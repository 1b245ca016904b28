//! Decay engine
//!
//! Forgetting is what keeps the graph honest. Every tick sweeps the pairs
//! whose decay is due; a slower aging pass nudges the scores of tokens
//! nobody has mentioned in a day.

use chrono::Utc;
use tracing::{debug, info};

use aria_core::{AriaConfig, AriaResult, Tier, DECAY_MIN};

use crate::store::Store;
use crate::tick::Tick;

/// Outcome of one decay sweep
#[derive(Clone, Copy, Debug, Default)]
pub struct SweepOutcome {
    /// Pairs whose strength was reduced but stayed live
    pub decayed: usize,
    /// Pairs retired to the decay tier
    pub removed: usize,
}

/// Decay every pair whose `decay_at_message` has arrived.
///
/// A pair falling under the strength floor is retired to the decay tier
/// under its own key; everything else is re-tiered and rescheduled.
pub fn sweep<S: Store>(store: &S, tick: &mut Tick, config: &AriaConfig) -> AriaResult<SweepOutcome> {
    let mut outcome = SweepOutcome::default();
    let due = store.pairs_due_for_decay(tick.message_index)?;

    for pair in due {
        let rate = match config.decay.rate(pair.tier) {
            Some(r) => r,
            None => continue,
        };
        let new_strength = pair.strength * (1.0 - rate);
        let key = pair.pattern_key();

        if new_strength < DECAY_MIN {
            store.update_pair(&key, &mut |p| {
                p.strength = new_strength;
                p.decay_count += 1;
            })?;
            store.move_pair_tier(&key, Tier::Decay)?;
            debug!("Pair retired: {} ({:.4})", key, new_strength);
            outcome.removed += 1;
        } else {
            let new_tier = Tier::for_strength(new_strength);
            let decay_at = tick.message_index + config.decay.interval(new_tier).unwrap_or(0);
            store.update_pair(&key, &mut |p| {
                p.strength = new_strength;
                p.tier = new_tier;
                p.decay_at_message = decay_at;
                p.decay_count += 1;
            })?;
            outcome.decayed += 1;
        }
    }

    if outcome.decayed + outcome.removed > 0 {
        debug!(
            "Decay sweep at {}: {} decayed, {} retired",
            tick.message_index, outcome.decayed, outcome.removed
        );
    }

    tick.report.decayed = Some(outcome.decayed);
    tick.report.removed = Some(outcome.removed);
    Ok(outcome)
}

/// Maximum tokens touched per aging run (cost control)
const AGING_BATCH: usize = 1024;

/// Damp the scores of tokens idle for longer than the configured window.
///
/// Categories are not re-derived here; the damped scores only nudge future
/// assignments.
pub fn age_idle_tokens<S: Store>(store: &S, config: &AriaConfig) -> AriaResult<usize> {
    let cutoff = Utc::now().timestamp() - config.decay.aging_idle_secs;
    let stale = store.stale_tokens(cutoff, AGING_BATCH)?;
    let mut aged = 0;

    for token in stale {
        if let Some(mut stat) = store.get_token_stat(&token)? {
            stat.scores.damp(config.decay.aging_factor);
            store.upsert_token_stat(&stat)?;
            aged += 1;
        }
    }

    if aged > 0 {
        info!("Aged {} idle tokens", aged);
    }
    Ok(aged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use aria_core::{tokenize, Category, Pair, TokenStat};

    fn seeded_pair(store: &MemoryStore, a: &str, b: &str, strength: f32, decay_at: u64) {
        let mut p = Pair::new(
            a,
            b,
            Category::Unclassified,
            Category::Unclassified,
            strength,
            1,
            50,
        );
        p.tier = Tier::for_strength(strength);
        p.decay_at_message = decay_at;
        store.insert_pair(&p).unwrap();
    }

    fn sweep_at(store: &MemoryStore, index: u64) -> SweepOutcome {
        let mut tick = Tick::new(index, tokenize("unrelated filler text"));
        sweep(store, &mut tick, &AriaConfig::default()).unwrap()
    }

    #[test]
    fn test_due_pairs_lose_strength() {
        let store = MemoryStore::new();
        seeded_pair(&store, "good", "morning", 0.2, 51);

        // Not due yet
        let outcome = sweep_at(&store, 50);
        assert_eq!(outcome.decayed, 0);

        let outcome = sweep_at(&store, 51);
        assert_eq!(outcome.decayed, 1);
        let pair = store.get_pair("good_morning").unwrap().unwrap();
        assert!((pair.strength - 0.17).abs() < 1e-6);
        assert_eq!(pair.decay_count, 1);
        assert_eq!(pair.decay_at_message, 101);
    }

    #[test]
    fn test_weak_pairs_are_retired_not_deleted() {
        let store = MemoryStore::new();
        seeded_pair(&store, "rare", "sight", 0.011, 10);

        let outcome = sweep_at(&store, 10);
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.decayed, 0);

        let pair = store.get_pair("rare_sight").unwrap().unwrap();
        assert_eq!(pair.tier, Tier::Decay);
        assert!(pair.strength < DECAY_MIN);
        assert_eq!(pair.decay_count, 1);
    }

    #[test]
    fn test_decay_can_demote_across_tiers() {
        let store = MemoryStore::new();
        // Just above the medium boundary; one 5% decay drops it to short
        seeded_pair(&store, "fading", "bond", 0.31, 20);

        sweep_at(&store, 20);
        let pair = store.get_pair("bond_fading").unwrap().unwrap();
        assert_eq!(pair.tier, Tier::Short);
        // Rescheduled on the new tier's cadence
        assert_eq!(pair.decay_at_message, 70);
    }

    #[test]
    fn test_decay_tier_pairs_are_left_alone() {
        let store = MemoryStore::new();
        seeded_pair(&store, "old", "ghost", 0.005, 5);
        store.move_pair_tier("ghost_old", Tier::Decay).unwrap();

        let outcome = sweep_at(&store, 100);
        assert_eq!(outcome.decayed + outcome.removed, 0);
    }

    #[test]
    fn test_full_cycle_reduces_every_untouched_pair() {
        let store = MemoryStore::new();
        seeded_pair(&store, "aa", "bb", 0.25, 30);
        seeded_pair(&store, "cc", "dd", 0.5, 40);
        seeded_pair(&store, "ee", "ff", 0.011, 35);

        let before: Vec<f32> = ["aa_bb", "cc_dd", "ee_ff"]
            .iter()
            .map(|k| store.get_pair(k).unwrap().unwrap().strength)
            .collect();

        sweep_at(&store, 1000);

        for (key, old) in ["aa_bb", "cc_dd", "ee_ff"].iter().zip(before) {
            let pair = store.get_pair(key).unwrap().unwrap();
            assert!(
                pair.strength < old || pair.tier == Tier::Decay,
                "{} neither weakened nor retired",
                key
            );
        }
    }

    #[test]
    fn test_aging_damps_idle_token_scores() {
        let store = MemoryStore::new();
        let mut idle = TokenStat::new("forgotten");
        idle.scores.stability = 0.5;
        idle.updated_at = Utc::now().timestamp() - 48 * 60 * 60;
        store.upsert_token_stat(&idle).unwrap();

        let mut active = TokenStat::new("current");
        active.scores.stability = 0.5;
        store.upsert_token_stat(&active).unwrap();

        let aged = age_idle_tokens(&store, &AriaConfig::default()).unwrap();
        assert_eq!(aged, 1);

        let idle = store.get_token_stat("forgotten").unwrap().unwrap();
        assert!((idle.scores.stability - 0.495).abs() < 1e-6);
        let active = store.get_token_stat("current").unwrap().unwrap();
        assert!((active.scores.stability - 0.5).abs() < 1e-6);
    }
}
