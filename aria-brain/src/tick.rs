//! Message tick context
//!
//! One [`Tick`] is the working state of a single message moving through
//! the pipeline: counter advance, accumulation, scoring, pair updates,
//! decay. Stages mutate it in order and observe each other's writes.

use std::collections::{HashMap, HashSet};

use aria_core::{ProcessReport, TokenStat, Tokenized};

/// Working state for one message's pass through the pipeline
pub struct Tick {
    /// Logical clock value for this message
    pub message_index: u64,
    /// Tokens in message order
    pub tokens: Vec<String>,
    /// Distinct tokens, first-occurrence order
    pub token_set: Vec<String>,
    /// Whether the message was a single token
    pub standalone: bool,

    /// Tokens whose category was `stable` when the tick began.
    /// Snapshot taken before any update; all adjacent-to-stable signals in
    /// this message use it.
    pub stable_set: HashSet<String>,

    /// Stats loaded (or created) for this tick, mutated in place by the
    /// accumulator and scorer, persisted at the end of scoring
    pub stats: HashMap<String, TokenStat>,

    /// Report being assembled
    pub report: ProcessReport,
}

impl Tick {
    /// Start a tick for a tokenized message at a counter value
    pub fn new(message_index: u64, tokenized: Tokenized) -> Self {
        let token_set = tokenized.distinct();
        Self {
            message_index,
            standalone: tokenized.standalone,
            tokens: tokenized.tokens,
            token_set,
            stable_set: HashSet::new(),
            stats: HashMap::new(),
            report: ProcessReport {
                processed: true,
                message_index: Some(message_index),
                ..ProcessReport::default()
            },
        }
    }
}
