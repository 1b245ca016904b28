//! Behavioral token categories
//!
//! Categories are not grammatical classes. They are derived purely from how
//! a token behaves in the stream: whether it anchors contexts (stable),
//! bridges them (transition), leans on anchors (modifier), or scaffolds
//! messages (structural).

use serde::{Deserialize, Serialize};

/// Behavioral category of a token
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// High-context anchor words
    Stable,
    /// Words that bridge between stable anchors
    Transition,
    /// Words that depend on stable neighbors (named from the dependency score)
    Modifier,
    /// High-frequency scaffolding words
    Structural,
    /// Not enough evidence yet
    Unclassified,
}

impl Default for Category {
    fn default() -> Self {
        Category::Unclassified
    }
}

impl Category {
    /// Short name used in pair `category_pattern` snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Stable => "stable",
            Category::Transition => "transition",
            Category::Modifier => "modifier",
            Category::Structural => "structural",
            Category::Unclassified => "unclassified",
        }
    }

    /// Parse a category name (the reverse of [`Category::as_str`])
    pub fn parse(name: &str) -> Option<Category> {
        match name {
            "stable" => Some(Category::Stable),
            "transition" => Some(Category::Transition),
            "modifier" => Some(Category::Modifier),
            "structural" => Some(Category::Structural),
            "unclassified" => Some(Category::Unclassified),
            _ => None,
        }
    }

    /// Multiplier applied to pair reinforcement when this category
    /// is the stronger of the two endpoints
    pub fn promotion_modifier(&self) -> f32 {
        match self {
            Category::Stable => 1.5,
            Category::Structural => 0.6,
            Category::Transition => 1.0,
            Category::Modifier => 1.0,
            Category::Unclassified => 0.8,
        }
    }

    /// Weight used when scoring walk starting points
    pub fn start_weight(&self) -> f32 {
        match self {
            Category::Stable => 1.5,
            Category::Transition => 1.0,
            Category::Modifier => 0.7,
            Category::Structural => 0.3,
            Category::Unclassified => 0.5,
        }
    }

    /// Categories a walk prefers to move into from this one.
    /// An unclassified node is happy to go anywhere.
    pub fn walk_transitions(&self) -> &'static [Category] {
        match self {
            Category::Stable => &[Category::Modifier, Category::Transition, Category::Structural],
            Category::Modifier => &[Category::Stable, Category::Structural],
            Category::Transition => &[Category::Stable, Category::Modifier, Category::Structural],
            Category::Structural => &[Category::Stable, Category::Modifier, Category::Transition],
            Category::Unclassified => &[
                Category::Stable,
                Category::Transition,
                Category::Modifier,
                Category::Structural,
                Category::Unclassified,
            ],
        }
    }
}

/// The four behavioral scores, each clamped to [0, 1]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct CategoryScores {
    /// Consistent presence across many contexts
    pub stability: f32,
    /// Bridging and temporal-marker proximity
    pub transition: f32,
    /// Reliance on stable neighbors and contrast partners
    pub dependency: f32,
    /// Scaffolding: frequent, low-variance, rarely standalone
    pub structural: f32,
}

impl CategoryScores {
    /// Highest of the four scores
    pub fn max(&self) -> f32 {
        self.stability
            .max(self.transition)
            .max(self.dependency)
            .max(self.structural)
    }

    /// Category owning the highest score.
    ///
    /// Tie-break priority: stable > transition > modifier > structural.
    /// The modifier category is named from the dependency score.
    pub fn dominant(&self) -> Category {
        let m = self.max();
        if self.stability >= m {
            Category::Stable
        } else if self.transition >= m {
            Category::Transition
        } else if self.dependency >= m {
            Category::Modifier
        } else {
            Category::Structural
        }
    }

    /// Damp all four scores by a factor (used by the aging pass)
    pub fn damp(&mut self, factor: f32) {
        self.stability *= factor;
        self.transition *= factor;
        self.dependency *= factor;
        self.structural *= factor;
    }
}

/// Clamp a score into [0, 1]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_tie_break_priority() {
        // All equal: stable wins
        let s = CategoryScores {
            stability: 0.5,
            transition: 0.5,
            dependency: 0.5,
            structural: 0.5,
        };
        assert_eq!(s.dominant(), Category::Stable);

        // transition vs dependency tie: transition wins
        let s = CategoryScores {
            stability: 0.1,
            transition: 0.6,
            dependency: 0.6,
            structural: 0.2,
        };
        assert_eq!(s.dominant(), Category::Transition);

        // dependency vs structural tie: modifier wins
        let s = CategoryScores {
            stability: 0.0,
            transition: 0.0,
            dependency: 0.4,
            structural: 0.4,
        };
        assert_eq!(s.dominant(), Category::Modifier);
    }

    #[test]
    fn test_pattern_roundtrip() {
        for cat in [
            Category::Stable,
            Category::Transition,
            Category::Modifier,
            Category::Structural,
            Category::Unclassified,
        ] {
            assert_eq!(Category::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(Category::parse("noun"), None);
    }
}
