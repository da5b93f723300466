//! Deterministic lucky-number picks for 4D draws.
//!
//! [`daily_picks`] turns a profile's related numbers and raw text sources,
//! plus the draw history, into a ranked and explained list of 4-digit
//! numbers. It is a pure function of its arguments: the date is passed in,
//! and nothing is cached between calls.

pub mod birthday;
pub mod config;
pub mod digits;
pub mod engine;
pub mod frequency;
pub mod patterns;
pub mod ranker;
pub mod scoring;
pub mod seeder;

pub use config::{ConfigError, EngineConfig};
pub use engine::{daily_picks, daily_picks_with, PredictionInput};
pub use ranker::ScoredCandidate;
