// =============================================================================
// Shared types used across the news ranking engine
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::news::dedup::normalize_title;
use crate::signals::EventType;

/// One article block lifted out of a text dump.
///
/// `published` is kept exactly as it appeared in the dump; its age is
/// resolved at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub ticker: String,
    pub title: String,
    pub source: String,
    pub published: String,
    pub url: String,
    pub body: String,
}

impl Article {
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

/// An article that survived entity validation and scored above zero.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredArticle {
    pub article: Article,
    /// Score after every content/source multiplier, before recency decay.
    pub raw_score: f64,
    /// `raw_score` after recency decay. This is what gets ranked.
    pub decayed_score: f64,
    pub event_type: EventType,
    pub magnitude_cr: f64,
    /// In [0, 1]. Zero never reaches this type.
    pub entity_confidence: f64,
    pub source_weight: f64,
    pub age_hours: Option<f64>,
    /// Capacity figure or percentage present in the text.
    pub quantitative: bool,
}

/// Per-ticker fold of the top-K validated articles.
#[derive(Debug, Clone, Serialize)]
pub struct TickerAggregate {
    pub ticker: String,
    pub total_score: f64,
    pub article_count: usize,
    pub best_article: Option<ScoredArticle>,
    pub impact_score: f64,
    pub certainty_score: f64,
    pub trust_score: f64,
    /// How many validated articles share the best article's headline
    /// (including itself).
    pub duplicate_count: usize,
    /// Republished headlines dropped before the top-K cut.
    pub duplicates_dropped: usize,
}

impl TickerAggregate {
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            total_score: 0.0,
            article_count: 0,
            best_article: None,
            impact_score: 0.0,
            certainty_score: 0.0,
            trust_score: 0.0,
            duplicate_count: 0,
            duplicates_dropped: 0,
        }
    }
}

/// One row of the ranked output.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRow {
    pub ticker: String,
    pub article_count: usize,
    pub total_score: f64,
    pub best_title: String,
    pub best_source: String,
    pub news_age_hours: Option<f64>,
    pub event_type: EventType,
    pub amt_cr: f64,
    pub impact_score: f64,
    pub news_certainty: f64,
    pub trust_score: f64,
    pub mit_magnitude: f64,
    pub mit_intensity: f64,
    pub mit_timing: f64,
    pub mit_score: f64,
    /// Live-day price return in percent, when market data was available.
    pub day_return_pct: Option<f64>,
}
