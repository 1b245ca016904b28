//! # ARIA Brain - The Learning Engine
//!
//! This is where ARIA listens, remembers, and answers.
//!
//! Feed the engine messages and it maintains an evolving statistical model
//! of tokens, adjacent-pair strengths across three decay tiers, and
//! behavioral token categories. Ask it a question and it walks the graph
//! it has grown. No pre-trained vocabulary, no grammar, no neural network:
//! everything ARIA says, someone once said to her.
//!
//! ```no_run
//! use aria_brain::{AriaEngine, MemoryStore, ResponseOptions};
//!
//! let engine = AriaEngine::with_store(MemoryStore::new());
//! engine.process_message("the weather is beautiful today", "m1", "user-7").unwrap();
//! let reply = engine.generate_response("weather", &ResponseOptions::default());
//! ```

pub mod engine;
pub mod generator;
pub mod learning;
pub mod store;
pub mod tick;

pub use engine::{AriaEngine, ClusterView, MemoryStats, ResponseOptions};
pub use generator::{Chain, Generator, TokenGraph};
pub use store::{with_backend_retry, InsertOutcome, MemoryStore, Store};
pub use tick::Tick;
