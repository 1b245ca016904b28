//! Token graph and category-aware walk
//!
//! An undirected graph assembled at query time: nodes are tokens annotated
//! with their current category, edges are live pairs weighted by strength.
//! The walk is stochastic on purpose; two identical queries may answer
//! differently.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use aria_core::{Category, GeneratorConfig, Pair};

/// Query-time graph over tokens and pair strengths
pub struct TokenGraph {
    /// Category per node
    categories: HashMap<String, Category>,
    /// Adjacency lists sorted by weight, strongest first
    edges: HashMap<String, Vec<(String, f32)>>,
}

impl TokenGraph {
    /// Build from deduplicated pairs and a batch of current categories.
    ///
    /// Edges weaker than the threshold never enter the graph.
    pub fn build(
        pairs: &[Pair],
        categories: &HashMap<String, Category>,
        threshold: f32,
    ) -> Self {
        let mut edges: HashMap<String, Vec<(String, f32)>> = HashMap::new();
        let mut node_cats: HashMap<String, Category> = HashMap::new();

        for pair in pairs {
            if pair.strength < threshold {
                continue;
            }
            for (from, to) in [
                (&pair.token_a, &pair.token_b),
                (&pair.token_b, &pair.token_a),
            ] {
                edges
                    .entry(from.clone())
                    .or_default()
                    .push((to.clone(), pair.strength));
                node_cats
                    .entry(from.clone())
                    .or_insert_with(|| categories.get(from).copied().unwrap_or_default());
            }
        }

        for list in edges.values_mut() {
            list.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        }

        Self {
            categories: node_cats,
            edges,
        }
    }

    /// Whether the graph has any nodes at all
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether a token is a node
    pub fn contains(&self, token: &str) -> bool {
        self.edges.contains_key(token)
    }

    /// Number of edges at a node
    pub fn degree(&self, token: &str) -> usize {
        self.edges.get(token).map(|e| e.len()).unwrap_or(0)
    }

    /// Current category of a node
    pub fn category(&self, token: &str) -> Category {
        self.categories.get(token).copied().unwrap_or_default()
    }

    /// Neighbors of a node, strongest first
    fn neighbors(&self, token: &str) -> &[(String, f32)] {
        self.edges.get(token).map(|e| e.as_slice()).unwrap_or(&[])
    }

    /// Choose the walk's starting node.
    ///
    /// Keywords present in the graph compete on category start weight,
    /// degree, and a little noise; with no keyword in the graph the
    /// highest-degree stable node wins, then the highest-degree node.
    pub fn pick_start<R: Rng>(&self, keywords: &[String], rng: &mut R) -> Option<String> {
        let mut best: Option<(String, f32)> = None;
        for keyword in keywords {
            if !self.contains(keyword) {
                continue;
            }
            let degree_boost = 1.0 + (self.degree(keyword) as f32 / 10.0).min(1.0);
            let score = self.category(keyword).start_weight()
                * degree_boost
                * (1.0 + rng.gen_range(0.0..0.3));
            if best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                best = Some((keyword.clone(), score));
            }
        }
        if let Some((token, _)) = best {
            return Some(token);
        }

        self.top_by_degree(|cat| cat == Category::Stable, &HashSet::new(), &HashSet::new())
            .or_else(|| self.top_by_degree(|_| true, &HashSet::new(), &HashSet::new()))
    }

    fn top_by_degree(
        &self,
        accept: impl Fn(Category) -> bool,
        visited: &HashSet<String>,
        excluded: &HashSet<String>,
    ) -> Option<String> {
        self.edges
            .keys()
            .filter(|t| !visited.contains(*t) && !excluded.contains(*t))
            .filter(|t| accept(self.category(t)))
            .max_by_key(|t| self.degree(t))
            .cloned()
    }

    /// Category-aware weighted random walk with dead-end recovery.
    ///
    /// Recovery picks an alternative start when the path stalls below the
    /// minimum length; recovery tokens go into a retry set that excludes
    /// them from later recoveries, so the walk always terminates.
    pub fn walk<R: Rng>(
        &self,
        start: String,
        keywords: &[String],
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Vec<String> {
        let mut path = vec![start.clone()];
        let mut visited: HashSet<String> = HashSet::from([start.clone()]);
        let mut retry_set: HashSet<String> = HashSet::new();
        let mut current = start;

        while path.len() < config.max_words {
            let candidates: Vec<(&str, f32)> = self
                .neighbors(&current)
                .iter()
                .filter(|(token, weight)| {
                    !visited.contains(token) && *weight >= config.strength_threshold
                })
                .map(|(token, weight)| (token.as_str(), *weight))
                .collect();

            if candidates.is_empty() {
                if path.len() >= config.min_words {
                    break;
                }
                match self.pick_recovery(keywords, &visited, &retry_set) {
                    Some(next) => {
                        retry_set.insert(next.clone());
                        visited.insert(next.clone());
                        path.push(next.clone());
                        current = next;
                        continue;
                    }
                    None => break,
                }
            }

            let preferred = self.category(&current).walk_transitions();
            let mut scored: Vec<(&str, f32)> = candidates
                .iter()
                .map(|(token, weight)| {
                    let mut score = weight * (1.0 + rng.gen_range(0.0..config.randomness));
                    if preferred.contains(&self.category(token)) {
                        score *= 1.5;
                    }
                    (*token, score)
                })
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            let roll: f32 = rng.gen();
            let index = if roll < 0.7 {
                0
            } else if roll < 0.9 {
                1
            } else {
                2
            };
            let next = scored[index.min(scored.len() - 1)].0.to_string();

            visited.insert(next.clone());
            path.push(next.clone());
            current = next;
        }

        path
    }

    /// Alternative start for a stalled walk: another keyword in the graph,
    /// then the best unvisited stable node, then anything unvisited
    fn pick_recovery(
        &self,
        keywords: &[String],
        visited: &HashSet<String>,
        retry_set: &HashSet<String>,
    ) -> Option<String> {
        keywords
            .iter()
            .find(|k| self.contains(k) && !visited.contains(*k) && !retry_set.contains(*k))
            .cloned()
            .or_else(|| {
                self.top_by_degree(|cat| cat == Category::Stable, visited, retry_set)
            })
            .or_else(|| self.top_by_degree(|_| true, visited, retry_set))
    }
}
