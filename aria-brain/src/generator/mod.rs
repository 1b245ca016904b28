//! Response generation
//!
//! ARIA answers by walking what she has learned. Four stages run in
//! order, each accepted only if it yields enough words:
//!
//! 1. Emergent phrase discovery over pair chains
//! 2. A category-aware weighted walk over the pair graph
//! 3. Category composition around a stable base token
//! 4. Raw top pairs
//!
//! Every failure, however deep, collapses to `"..."`.

pub mod chains;
pub mod graph;

pub use chains::Chain;
pub use graph::TokenGraph;

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use aria_core::{tokenize, AriaResult, Category, GeneratorConfig, Pair};

use crate::store::Store;

/// Response generator over a store
pub struct Generator<'a, S: Store> {
    store: &'a S,
    config: &'a GeneratorConfig,
}

impl<'a, S: Store> Generator<'a, S> {
    pub fn new(store: &'a S, config: &'a GeneratorConfig) -> Self {
        Self { store, config }
    }

    /// Generate a response to a message.
    ///
    /// Infallible by design: backend errors, empty memory and empty
    /// outputs all come back as `"..."`.
    pub fn respond(&self, text: &str, max_length: usize) -> String {
        let keywords = tokenize(text).distinct();
        match self.try_respond(&keywords, max_length) {
            Ok(response) if !response.is_empty() => response,
            Ok(_) => "...".to_string(),
            Err(e) => {
                debug!("Generation failed, answering with silence: {}", e);
                "...".to_string()
            }
        }
    }

    fn try_respond(&self, keywords: &[String], max_length: usize) -> AriaResult<String> {
        let mut rng = rand::thread_rng();

        if let Some(words) = self.emergent_phrases(keywords)? {
            return Ok(postprocess(&words, max_length));
        }
        if let Some(words) = self.graph_walk(keywords, &mut rng)? {
            return Ok(postprocess(&words, max_length));
        }
        if let Some(words) = self.compose(keywords, &mut rng)? {
            return Ok(postprocess(&words, max_length));
        }
        let words = self.raw_pairs(keywords)?;
        Ok(postprocess(&words, max_length))
    }

    /// Stage 1: concatenate the best non-overlapping chains found around
    /// the first few keywords
    fn emergent_phrases(&self, keywords: &[String]) -> AriaResult<Option<Vec<String>>> {
        let mut found: Vec<Chain> = Vec::new();
        let mut seen = HashSet::new();
        for keyword in keywords.iter().take(self.config.phrase_keywords) {
            for chain in chains::discover(
                self.store,
                keyword,
                self.config.max_chain_len,
                self.config.chain_fanout,
            )? {
                if seen.insert(chain.key()) {
                    found.push(chain);
                }
            }
        }
        if found.is_empty() {
            return Ok(None);
        }

        found.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));

        let mut words: Vec<String> = Vec::new();
        let mut used: HashSet<String> = HashSet::new();
        for chain in &found {
            if words.len() >= self.config.max_words {
                break;
            }
            let overlap = chain.tokens.iter().filter(|t| used.contains(*t)).count();
            if overlap * 2 > chain.tokens.len() {
                continue;
            }
            for token in &chain.tokens {
                if words.len() >= self.config.max_words {
                    break;
                }
                words.push(token.clone());
                used.insert(token.clone());
            }
        }

        if words.len() >= self.config.min_words {
            Ok(Some(words))
        } else {
            Ok(None)
        }
    }

    /// Stage 2: build the pair graph and walk it
    fn graph_walk<R: Rng>(
        &self,
        keywords: &[String],
        rng: &mut R,
    ) -> AriaResult<Option<Vec<String>>> {
        let mut pairs: Vec<Pair> = Vec::new();
        let mut seen_keys = HashSet::new();

        for keyword in keywords.iter().take(self.config.graph_keywords) {
            for pair in self.store.search_pairs_by_word(keyword)? {
                if seen_keys.insert(pair.pattern_key()) {
                    pairs.push(pair);
                }
            }
        }
        for pair in self.store.top_pairs(self.config.global_pairs, None)? {
            if seen_keys.insert(pair.pattern_key()) {
                pairs.push(pair);
            }
        }
        if pairs.is_empty() {
            return Ok(None);
        }

        // One category round-trip for every token in the graph
        let mut tokens: Vec<String> = pairs
            .iter()
            .flat_map(|p| [p.token_a.clone(), p.token_b.clone()])
            .collect();
        tokens.sort();
        tokens.dedup();
        let categories = self.store.get_many_categories(&tokens)?;

        let graph = TokenGraph::build(&pairs, &categories, self.config.strength_threshold);
        if graph.is_empty() {
            return Ok(None);
        }

        let start = match graph.pick_start(keywords, rng) {
            Some(s) => s,
            None => return Ok(None),
        };
        let path = graph.walk(start, keywords, self.config, rng);

        if path.len() >= self.config.min_words {
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// Stage 3: compose around a stable base token.
    ///
    /// Slot template: `[modifier?] base [modifier?] [structural?]
    /// [transition?]`, at most one word per slot.
    fn compose<R: Rng>(&self, keywords: &[String], rng: &mut R) -> AriaResult<Option<Vec<String>>> {
        let stables = self
            .store
            .tokens_by_category(Category::Stable, self.config.composition_candidates * 5)?;
        if stables.is_empty() {
            return Ok(None);
        }

        // Prefer stable tokens textually overlapping the keywords
        let mut candidates: Vec<(bool, String)> = stables
            .iter()
            .map(|s| {
                let overlaps = keywords
                    .iter()
                    .any(|k| s.token.contains(k.as_str()) || k.contains(&s.token));
                (overlaps, s.token.clone())
            })
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.truncate(self.config.composition_candidates);

        let base = candidates[rng.gen_range(0..candidates.len())].1.clone();

        let base_pairs = self.store.search_pairs_by_word(&base)?;
        let partners: Vec<String> = base_pairs
            .iter()
            .filter_map(|p| p.partner_of(&base).map(|s| s.to_string()))
            .collect();
        if partners.is_empty() {
            return Ok(None);
        }
        let categories = self.store.get_many_categories(&partners)?;

        let by_category = |wanted: Category| -> Option<&String> {
            partners
                .iter()
                .find(|p| categories.get(*p).copied().unwrap_or_default() == wanted)
        };

        let modifier = by_category(Category::Modifier);
        let structural = by_category(Category::Structural);
        let transition = by_category(Category::Transition);

        let mut words: Vec<String> = Vec::new();
        match modifier {
            Some(m) => {
                if rng.gen::<f32>() < 0.3 {
                    // Skip the modifier slot entirely
                    words.push(base.clone());
                } else if rng.gen::<f32>() < 0.3 {
                    // Reversed order: base before modifier
                    words.push(base.clone());
                    words.push(m.clone());
                } else {
                    words.push(m.clone());
                    words.push(base.clone());
                }
            }
            None => words.push(base.clone()),
        }
        if let Some(s) = structural {
            if rng.gen::<f32>() < 0.2 {
                words.push(s.clone());
            }
        }
        if let Some(t) = transition {
            words.push(t.clone());
        }

        if words.len() >= self.config.min_words {
            Ok(Some(words))
        } else {
            Ok(None)
        }
    }

    /// Stage 4: raw top pairs, keyword-relevant first
    fn raw_pairs(&self, keywords: &[String]) -> AriaResult<Vec<String>> {
        let mut pairs: Vec<Pair> = Vec::new();
        let mut seen_keys = HashSet::new();

        for keyword in keywords {
            for pair in self.store.search_pairs_by_word(keyword)? {
                if seen_keys.insert(pair.pattern_key()) {
                    pairs.push(pair);
                }
                if pairs.len() >= self.config.fallback_pairs {
                    break;
                }
            }
            if pairs.len() >= self.config.fallback_pairs {
                break;
            }
        }
        if pairs.is_empty() {
            pairs = self.store.top_pairs(self.config.fallback_pairs, None)?;
        }

        Ok(pairs
            .iter()
            .take(self.config.fallback_pairs)
            .flat_map(|p| [p.token_a.clone(), p.token_b.clone()])
            .collect())
    }
}

/// Final cleanup: collapse whitespace, drop immediate duplicates, truncate
/// at a word boundary when possible
pub fn postprocess(words: &[String], max_length: usize) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    for word in words {
        let word = word.trim();
        if word.is_empty() {
            continue;
        }
        if cleaned.last().map(|prev| *prev == word).unwrap_or(false) {
            continue;
        }
        cleaned.push(word);
    }

    let mut text = cleaned.join(" ").to_lowercase();
    if text.len() > max_length {
        let cut = floor_char_boundary(&text, max_length);
        let min_break = (max_length as f32 * 0.7) as usize;
        let boundary = text[..cut]
            .rfind(' ')
            .filter(|i| *i >= min_break)
            .unwrap_or(cut);
        text.truncate(boundary);
        text = text.trim_end().to_string();
    }
    text
}

/// Largest index <= `at` that lands on a char boundary
fn floor_char_boundary(s: &str, at: usize) -> usize {
    if at >= s.len() {
        return s.len();
    }
    let mut i = at;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
