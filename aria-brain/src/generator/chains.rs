//! Emergent phrase discovery
//!
//! Chains are never persisted. They exist only at query time, discovered
//! by walking overlapping pairs outward from a keyword.

use std::collections::HashSet;

use aria_core::AriaResult;

use crate::store::Store;

/// An ordered token chain discovered by walking pairs
#[derive(Clone, Debug)]
pub struct Chain {
    /// Tokens in walk order, starting at the seed keyword
    pub tokens: Vec<String>,
    /// Ranking weight, `1 / len`
    pub weight: f32,
}

impl Chain {
    fn from_path(path: &[String]) -> Self {
        Self {
            tokens: path.to_vec(),
            weight: 1.0 / path.len() as f32,
        }
    }

    /// Key used for deduplication
    pub fn key(&self) -> String {
        self.tokens.join("_")
    }
}

/// Depth-first chain discovery from one seed token.
///
/// Visits each token at most once per chain, follows at most `fanout`
/// outgoing edges per node (strongest first) and collects every chain of
/// length 2..=`max_len`, deduplicated by key.
pub fn discover<S: Store>(
    store: &S,
    seed: &str,
    max_len: usize,
    fanout: usize,
) -> AriaResult<Vec<Chain>> {
    let mut chains = Vec::new();
    let mut seen = HashSet::new();
    if max_len < 2 {
        return Ok(chains);
    }

    let mut path = vec![seed.to_string()];
    extend(store, &mut path, max_len, fanout, &mut chains, &mut seen)?;
    Ok(chains)
}

fn extend<S: Store>(
    store: &S,
    path: &mut Vec<String>,
    max_len: usize,
    fanout: usize,
    chains: &mut Vec<Chain>,
    seen: &mut HashSet<String>,
) -> AriaResult<()> {
    let current = path.last().cloned().expect("path never empty");

    let partners: Vec<String> = store
        .search_pairs_by_word(&current)?
        .iter()
        .take(fanout)
        .filter_map(|p| p.partner_of(&current).map(|s| s.to_string()))
        .collect();

    for partner in partners {
        if path.contains(&partner) {
            continue;
        }
        path.push(partner);

        let chain = Chain::from_path(path);
        if seen.insert(chain.key()) {
            chains.push(chain);
        }
        if path.len() < max_len {
            extend(store, path, max_len, fanout, chains, seen)?;
        }

        path.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use aria_core::{Category, Pair};

    fn link(store: &MemoryStore, a: &str, b: &str, strength: f32) {
        let mut p = Pair::new(
            a,
            b,
            Category::Unclassified,
            Category::Unclassified,
            strength,
            1,
            50,
        );
        p.tier = aria_core::Tier::for_strength(strength);
        store.insert_pair(&p).unwrap();
    }

    #[test]
    fn test_chains_follow_overlapping_pairs() {
        let store = MemoryStore::new();
        link(&store, "the", "weather", 0.5);
        link(&store, "weather", "is", 0.4);
        link(&store, "is", "beautiful", 0.3);

        let chains = discover(&store, "the", 5, 5).unwrap();
        let keys: Vec<String> = chains.iter().map(|c| c.key()).collect();
        assert!(keys.contains(&"the_weather".to_string()));
        assert!(keys.contains(&"the_weather_is".to_string()));
        assert!(keys.contains(&"the_weather_is_beautiful".to_string()));
    }

    #[test]
    fn test_no_single_token_chains() {
        let store = MemoryStore::new();
        let chains = discover(&store, "lonely", 5, 5).unwrap();
        assert!(chains.is_empty());

        link(&store, "lonely", "word", 0.2);
        let chains = discover(&store, "lonely", 5, 5).unwrap();
        assert!(chains.iter().all(|c| c.tokens.len() >= 2));
    }

    #[test]
    fn test_chains_never_revisit_a_token() {
        let store = MemoryStore::new();
        link(&store, "ping", "pong", 0.5);
        link(&store, "pong", "ball", 0.4);
        link(&store, "ball", "ping", 0.3);

        let chains = discover(&store, "ping", 5, 5).unwrap();
        for chain in &chains {
            let mut unique = HashSet::new();
            assert!(chain.tokens.iter().all(|t| unique.insert(t.clone())));
        }
    }

    #[test]
    fn test_chain_length_capped() {
        let store = MemoryStore::new();
        let words = ["aa", "bb", "cc", "dd", "ee", "ff", "gg", "hh"];
        for w in words.windows(2) {
            link(&store, w[0], w[1], 0.5);
        }
        let chains = discover(&store, "aa", 5, 5).unwrap();
        assert!(chains.iter().all(|c| c.tokens.len() <= 5));
        assert!(chains.iter().any(|c| c.tokens.len() == 5));
    }

    #[test]
    fn test_weight_is_inverse_length() {
        let store = MemoryStore::new();
        link(&store, "aa", "bb", 0.5);
        link(&store, "bb", "cc", 0.5);
        let chains = discover(&store, "aa", 5, 5).unwrap();
        for chain in chains {
            assert!((chain.weight - 1.0 / chain.tokens.len() as f32).abs() < 1e-6);
        }
    }
}
