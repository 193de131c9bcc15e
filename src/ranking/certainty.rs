// =============================================================================
// Certainty, Trust and Impact — per-ticker confidence scores in [0, 1]
// =============================================================================
//
//   trust     = 0.6 · min(1, source_weight / 1.6) + 0.4 · entity_confidence
//   certainty = (0.5 · confidence + 0.25 · corroboration + 0.25 · specificity)
//               · (1 / max(1, dup))^0.5
//   impact    = 0.6 · size + 0.4 · event_baseline
//
// `dup` counts republications of the best headline. This is the damping form
// of deduplication; the ranking path itself hard-drops repeats.
// =============================================================================

use crate::news::dedup::duplicate_damping;
use crate::signals::magnitude::{normalize_abs, normalize_relative};
use crate::signals::{EventType, MAX_SOURCE_WEIGHT};
use crate::types::ScoredArticle;

/// Articles needed for full corroboration credit.
const CORROBORATION_ARTICLES: f64 = 3.0;

pub fn trust_score(source_weight: f64, entity_confidence: f64) -> f64 {
    let source = (source_weight / MAX_SOURCE_WEIGHT).clamp(0.0, 1.0);
    (0.6 * source + 0.4 * entity_confidence.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// How concrete the best article is: an amount, a figure, a known event.
pub fn specificity(best: &ScoredArticle) -> f64 {
    let mut s = 0.0;
    if best.magnitude_cr > 0.0 {
        s += 0.5;
    }
    if best.quantitative {
        s += 0.25;
    }
    if best.event_type != EventType::General {
        s += 0.25;
    }
    s
}

pub fn certainty_score(best: &ScoredArticle, article_count: usize, duplicate_count: usize) -> f64 {
    let corroboration = (article_count as f64 / CORROBORATION_ARTICLES).min(1.0);
    let base = 0.5 * best.entity_confidence.clamp(0.0, 1.0)
        + 0.25 * corroboration
        + 0.25 * specificity(best);
    (base * duplicate_damping(duplicate_count)).clamp(0.0, 1.0)
}

/// Deal size relative to cap when the cap is known, absolute otherwise.
pub fn size_score(amount_cr: f64, market_cap_cr: Option<f64>) -> f64 {
    match market_cap_cr {
        Some(cap) if cap > 0.0 => normalize_relative(amount_cr, cap),
        _ => normalize_abs(amount_cr),
    }
}

pub fn impact_score(amount_cr: f64, market_cap_cr: Option<f64>, event: EventType) -> f64 {
    (0.6 * size_score(amount_cr, market_cap_cr) + 0.4 * event.baseline()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Article;

    fn best(confidence: f64, amount: f64, quantitative: bool, event: EventType) -> ScoredArticle {
        ScoredArticle {
            article: Article {
                ticker: "ACME".into(),
                title: "ACME wins order".into(),
                source: "reuters".into(),
                published: "2024-05-02 12:00:00".into(),
                url: String::new(),
                body: "body".into(),
            },
            raw_score: 3.0,
            decayed_score: 3.0,
            event_type: event,
            magnitude_cr: amount,
            entity_confidence: confidence,
            source_weight: 1.6,
            age_hours: Some(1.0),
            quantitative,
        }
    }

    #[test]
    fn trust_blends_source_and_entity() {
        assert!((trust_score(1.6, 1.0) - 1.0).abs() < 1e-9);
        assert!((trust_score(1.0, 0.3) - (0.6 * 0.625 + 0.12)).abs() < 1e-9);
        assert!((trust_score(5.0, 1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn specificity_components() {
        let full = best(1.0, 100.0, true, EventType::OrderContract);
        assert!((specificity(&full) - 1.0).abs() < 1e-9);
        let bare = best(1.0, 0.0, false, EventType::General);
        assert!(specificity(&bare).abs() < 1e-9);
        let quantitative = best(1.0, 0.0, true, EventType::General);
        assert!((specificity(&quantitative) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn certainty_full_marks() {
        let b = best(1.0, 100.0, true, EventType::OrderContract);
        assert!((certainty_score(&b, 3, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn republication_damps_certainty() {
        let b = best(1.0, 100.0, true, EventType::OrderContract);
        let single = certainty_score(&b, 3, 1);
        let syndicated = certainty_score(&b, 3, 4);
        assert!((syndicated - single * 0.5).abs() < 1e-9);
    }

    #[test]
    fn weak_entity_match_lowers_certainty() {
        let b = best(0.3, 0.0, false, EventType::General);
        assert!(certainty_score(&b, 1, 1) < 0.5);
    }

    #[test]
    fn impact_uses_cap_when_known() {
        let with_cap = impact_score(1200.0, Some(10_000.0), EventType::OrderContract);
        let expected = 0.6 * normalize_relative(1200.0, 10_000.0) + 0.4 * 0.8;
        assert!((with_cap - expected).abs() < 1e-9);

        let no_cap = impact_score(1200.0, None, EventType::OrderContract);
        assert!((no_cap - (0.6 * normalize_abs(1200.0) + 0.32)).abs() < 1e-9);
    }

    #[test]
    fn impact_without_amount_is_baseline_share() {
        assert!((impact_score(0.0, None, EventType::General) - 0.14).abs() < 1e-9);
    }
}
