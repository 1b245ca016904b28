//! # ARIA Core
//!
//! Core types for ARIA - an online, unsupervised text-learning engine.
//!
//! This crate provides the fundamental building blocks:
//! - **TokenStat**: behavioral counters and scores for one token
//! - **Pair**: a reinforced two-token co-occurrence with a decay tier
//! - **Category**: one of five behavioral categories, assigned with inertia
//! - **Tokenizer**: raw text to ordered lowercase tokens
//!
//! ## Design Philosophy
//!
//! ARIA is not trained. She learns from whoever talks to her.
//!
//! There is no vocabulary, no grammar, no stopword list. Every table in
//! this crate except the tiny [`lexicon`] is empty at birth and filled by
//! the stream.

pub mod category;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod pair;
pub mod report;
pub mod stats;
pub mod token;
pub mod tokenizer;

// Re-export main types at crate root
pub use category::{clamp01, Category, CategoryScores};
pub use config::{AriaConfig, DecayConfig, GeneratorConfig, ReinforcementConfig, ScoringConfig};
pub use error::{AriaError, AriaResult};
pub use pair::{pattern_key, Pair, Tier, DECAY_MIN, MEDIUM_MAX, SHORT_MAX};
pub use report::ProcessReport;
pub use stats::{GlobalDelta, GlobalStats};
pub use token::TokenStat;
pub use tokenizer::{tokenize, Tokenized};
