// =============================================================================
// Per-Ticker Aggregator — top-K fold of validated, scored articles
// =============================================================================
//
// Ordering is stable: equal scores keep their parse order, and tickers come
// out in first-seen order. Republished headlines are hard-dropped before the
// top-K cut, so syndication never inflates a ticker's total.
// =============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::news::dedup::{dedup_by_title, duplicate_counts};
use crate::types::{ScoredArticle, TickerAggregate};

use super::certainty::{certainty_score, impact_score, trust_score};

/// Default number of articles folded per ticker.
pub const DEFAULT_TOP_K: usize = 10;

/// Group scored articles by ticker, preserving first-seen ticker order and
/// article order within each ticker.
pub fn group_by_ticker(articles: Vec<ScoredArticle>) -> Vec<(String, Vec<ScoredArticle>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<ScoredArticle>)> = Vec::new();
    for a in articles {
        let ticker = a.article.ticker.clone();
        match index.get(&ticker) {
            Some(&i) => groups[i].1.push(a),
            None => {
                index.insert(ticker.clone(), groups.len());
                groups.push((ticker, vec![a]));
            }
        }
    }
    groups
}

/// Fold one ticker's articles. A zero `top_k` falls back to the default.
///
/// Articles with zero confidence or zero score are ignored, so a ticker with
/// nothing usable comes back as [`TickerAggregate::empty`].
pub fn aggregate(
    ticker: &str,
    articles: Vec<ScoredArticle>,
    top_k: usize,
    market_cap_cr: Option<f64>,
) -> TickerAggregate {
    let top_k = if top_k == 0 { DEFAULT_TOP_K } else { top_k };

    let mut usable: Vec<ScoredArticle> = articles
        .into_iter()
        .filter(|a| a.entity_confidence > 0.0 && a.decayed_score > 0.0)
        .collect();
    if usable.is_empty() {
        return TickerAggregate::empty(ticker);
    }

    // sort_by is stable: ties keep parse order.
    usable.sort_by(|a, b| b.decayed_score.total_cmp(&a.decayed_score));

    let counts = duplicate_counts(&usable);
    let (mut kept, duplicates_dropped) = dedup_by_title(usable);
    kept.truncate(top_k);

    let total_score: f64 = kept.iter().map(|a| a.decayed_score).sum();
    let article_count = kept.len();
    let best = kept.into_iter().next();

    let Some(best) = best else {
        return TickerAggregate::empty(ticker);
    };
    let duplicate_count = counts
        .get(&best.article.normalized_title())
        .copied()
        .unwrap_or(1);

    debug!(
        ticker,
        total_score,
        article_count,
        duplicates_dropped,
        "ticker aggregated"
    );

    TickerAggregate {
        ticker: ticker.to_string(),
        total_score,
        article_count,
        impact_score: impact_score(best.magnitude_cr, market_cap_cr, best.event_type),
        certainty_score: certainty_score(&best, article_count, duplicate_count),
        trust_score: trust_score(best.source_weight, best.entity_confidence),
        best_article: Some(best),
        duplicate_count,
        duplicates_dropped,
    }
}
