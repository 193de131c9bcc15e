// =============================================================================
// Signals Module
// =============================================================================
//
// Per-article signal extraction for the ranking engine:
// - Pattern tables and text features
// - Ordered event classification
// - Deal-size extraction and normalisation
// - Source reliability weights
// - Half-life recency decay
// - Article scoring strategies

pub mod article_scorer;
pub mod event_classifier;
pub mod magnitude;
pub mod patterns;
pub mod signal_decay;
pub mod source_reliability;

pub use article_scorer::ArticleScorer;
pub use event_classifier::{classify, EventType};
pub use patterns::is_listicle;
pub use source_reliability::MAX_SOURCE_WEIGHT;
