//! The ingestion pipeline
//!
//! One message tick runs these stages strictly in order:
//!
//! 1. [`accumulator`] - counter updates and position samples
//! 2. [`scorer`] - variance refresh, four scores, category inertia
//! 3. [`pairs`] - adjacent pair creation and reinforcement
//! 4. [`decay`] - the due-pair sweep, plus the slow aging pass

pub mod accumulator;
pub mod decay;
pub mod pairs;
pub mod scorer;

pub use decay::SweepOutcome;
