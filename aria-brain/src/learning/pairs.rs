//! Pair engine
//!
//! Creates and reinforces adjacent token pairs. Strength growth is scaled
//! by the stronger endpoint's category; tier follows strength; every write
//! refreshes the pair's category snapshot and decay schedule.

use tracing::{debug, info};

use aria_core::{pattern_key, AriaConfig, AriaResult, Category, Pair, Tier};

use crate::store::{InsertOutcome, Store};
use crate::tick::Tick;

/// Reinforcement modifier for a pair of endpoint categories.
///
/// The stronger endpoint wins; a pair with no classified endpoint yet is
/// neutral (1.0) rather than dampened.
fn modifier_for(cat_a: Category, cat_b: Category) -> f32 {
    if cat_a == Category::Unclassified && cat_b == Category::Unclassified {
        1.0
    } else {
        cat_a.promotion_modifier().max(cat_b.promotion_modifier())
    }
}

/// Create or reinforce every adjacent pair in the tick's message.
///
/// Categories are re-read from storage in one batched call; the pair's
/// stored `category_pattern` is only ever written, never trusted.
pub fn reinforce<S: Store>(store: &S, tick: &mut Tick, config: &AriaConfig) -> AriaResult<()> {
    let mut new_pairs = 0;
    let mut reinforced = 0;
    let mut promoted = 0;

    // Adjacent pairs, equal tokens skipped
    let adjacencies: Vec<(&str, &str)> = tick
        .tokens
        .windows(2)
        .filter(|w| w[0] != w[1])
        .map(|w| (w[0].as_str(), w[1].as_str()))
        .collect();

    if adjacencies.is_empty() {
        tick.report.new_pairs = Some(0);
        tick.report.reinforced = Some(0);
        tick.report.promoted = Some(0);
        return Ok(());
    }

    // One category round-trip for every token that appears in a pair
    let mut involved: Vec<String> = adjacencies
        .iter()
        .flat_map(|(a, b)| [a.to_string(), b.to_string()])
        .collect();
    involved.sort();
    involved.dedup();
    let categories = store.get_many_categories(&involved)?;

    let category_of =
        |token: &str| -> Category { categories.get(token).copied().unwrap_or_default() };

    let short_interval = config.decay.short_interval;

    for (a, b) in adjacencies {
        let key = pattern_key(a, b);
        let cat_a = category_of(a);
        let cat_b = category_of(b);

        match store.get_pair(&key)? {
            Some(existing) if existing.tier == Tier::Decay => {
                // A decayed pair re-seen is reborn, not revived: fresh
                // strength, fresh counters, short tier again
                let fresh = Pair::new(
                    a,
                    b,
                    cat_a,
                    cat_b,
                    config.reinforcement.base,
                    tick.message_index,
                    short_interval,
                );
                store.update_pair(&key, &mut |slot| *slot = fresh.clone())?;
                debug!("Pair reborn from decay: {}", key);
                new_pairs += 1;
            }
            Some(existing) => {
                let cat_first = category_of(&existing.token_a);
                let cat_second = category_of(&existing.token_b);
                let was_promoted = reinforce_existing(
                    store,
                    &existing,
                    cat_first,
                    cat_second,
                    tick.message_index,
                    config,
                )?;
                reinforced += 1;
                if was_promoted {
                    promoted += 1;
                }
            }
            None => {
                let fresh = Pair::new(
                    a,
                    b,
                    cat_a,
                    cat_b,
                    config.reinforcement.base,
                    tick.message_index,
                    short_interval,
                );
                match store.insert_pair(&fresh)? {
                    InsertOutcome::Created => {
                        new_pairs += 1;
                    }
                    InsertOutcome::Conflict => {
                        // A concurrent tick created it first; reinforce it
                        if let Some(existing) = store.get_pair(&key)? {
                            let cat_first = category_of(&existing.token_a);
                            let cat_second = category_of(&existing.token_b);
                            let was_promoted = reinforce_existing(
                                store,
                                &existing,
                                cat_first,
                                cat_second,
                                tick.message_index,
                                config,
                            )?;
                            reinforced += 1;
                            if was_promoted {
                                promoted += 1;
                            }
                        }
                    }
                }
            }
        }
    }

    tick.report.new_pairs = Some(new_pairs);
    tick.report.reinforced = Some(reinforced);
    tick.report.promoted = Some(promoted);
    Ok(())
}

/// Reinforce a live pair; returns whether its tier changed.
///
/// `cat_first`/`cat_second` are the current categories of `token_a` and
/// `token_b` in the pair's canonical order.
fn reinforce_existing<S: Store>(
    store: &S,
    existing: &Pair,
    cat_first: Category,
    cat_second: Category,
    message_index: u64,
    config: &AriaConfig,
) -> AriaResult<bool> {
    let add = config.reinforcement.base * modifier_for(cat_first, cat_second);
    let new_strength = (existing.strength + add).min(config.reinforcement.max);
    let new_tier = Tier::for_strength(new_strength);
    let was_promoted = new_tier != existing.tier;
    let decay_at = message_index + config.decay.interval(new_tier).unwrap_or(0);
    let pattern = format!("{}->{}", cat_first.as_str(), cat_second.as_str());

    store.update_pair(&existing.pattern_key(), &mut |p| {
        p.strength = new_strength;
        p.tier = new_tier;
        p.category_pattern = pattern.clone();
        p.frequency += 1;
        p.reinforcement_count += 1;
        p.decay_at_message = decay_at;
        p.last_seen_message_index = message_index;
    })?;

    if was_promoted {
        info!(
            "Pair promoted: {} -> {} ({:.3})",
            existing.pattern_key(),
            new_tier.as_str(),
            new_strength
        );
    }
    Ok(was_promoted)
}
