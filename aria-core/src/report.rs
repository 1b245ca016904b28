//! Processing reports
//!
//! One product type for everything `process_message` can say about a tick.
//! Short-circuit paths leave the per-stage counts as `None` and carry a
//! reason instead.

use serde::{Deserialize, Serialize};

/// Outcome of processing one message
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProcessReport {
    /// Whether the message was accepted by the pipeline
    pub processed: bool,
    /// Logical clock value assigned to this tick
    pub message_index: Option<u64>,
    /// Tokens extracted from the message
    pub tokens_processed: Option<usize>,
    /// Tokens holding a committed category after scoring
    pub categorized: Option<usize>,
    /// Pairs created this tick
    pub new_pairs: Option<usize>,
    /// Pairs reinforced this tick
    pub reinforced: Option<usize>,
    /// Pairs that changed tier upward this tick
    pub promoted: Option<usize>,
    /// Pairs decayed (strength reduced, still live)
    pub decayed: Option<usize>,
    /// Pairs retired to the decay tier
    pub removed: Option<usize>,
    /// Why the pipeline short-circuited, if it did
    pub reason: Option<String>,
}

impl ProcessReport {
    /// Report for a message rejected before the counter advanced
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            processed: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Report for an accepted message that produced no tokens
    pub fn no_tokens() -> Self {
        Self {
            processed: true,
            reason: Some("no tokens".to_string()),
            ..Self::default()
        }
    }
}
