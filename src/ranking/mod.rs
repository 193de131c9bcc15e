// =============================================================================
// Ranking Module
// =============================================================================
//
// Per-ticker folding and scoring:
// - Top-K aggregation with hard title dedup
// - Certainty / trust / impact scores
// - Magnitude × Intensity × Timing combiner
// - The end-to-end ranking engine

pub mod aggregator;
pub mod certainty;
pub mod mit;
pub mod pipeline;

pub use pipeline::RankingEngine;
