// =============================================================================
// Headline Deduplication
// =============================================================================
//
// Two policies, never mixed within one stage:
//   - Hard drop (aggregation): the first occurrence of a normalized headline
//     is kept, later ones are discarded. Callers sort by score first so the
//     kept copy is the highest-scored one.
//   - Damping (certainty / intensity): a syndicated headline is weighted by
//     (1 / max(1, n))^0.5 where n is its republication count.
// =============================================================================

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::ScoredArticle;

/// Trim, case-fold and collapse inner whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hard-drop deduplication. Returns the surviving articles (order kept)
/// and the number dropped.
pub fn dedup_by_title(articles: Vec<ScoredArticle>) -> (Vec<ScoredArticle>, usize) {
    let mut seen = HashSet::new();
    let before = articles.len();
    let kept: Vec<ScoredArticle> = articles
        .into_iter()
        .filter(|a| {
            let key = a.article.normalized_title();
            let fresh = seen.insert(key);
            if !fresh {
                debug!(
                    ticker = %a.article.ticker,
                    title = %a.article.title,
                    "duplicate headline dropped"
                );
            }
            fresh
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Republication count per normalized headline.
pub fn duplicate_counts(articles: &[ScoredArticle]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for a in articles {
        *counts.entry(a.article.normalized_title()).or_insert(0) += 1;
    }
    counts
}

/// Damping weight for a headline seen `count` times.
pub fn duplicate_damping(count: usize) -> f64 {
    (1.0 / count.max(1) as f64).sqrt()
}
