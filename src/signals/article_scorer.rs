// =============================================================================
// Article Scorer — pattern features into a decayed news score
// =============================================================================
//
// Additive content score:
//
//   +2.0  per positive group hit (each group counts once)
//   -2.5  per negative group hit
//   +1.5  capacity figure (MW/GW)
//   +1.0  currency amount
//   +0.5  percentage
//   +0.5  long body (> 300 words)
//
// Zero positive hits, or a non-positive sum, scores 0. Otherwise:
//
//   raw     = content × fund_damp × (1 + cues) × listicle × source_weight
//   decayed = raw × exp(-ln2 · age / half_life)
//
// `cues` = inst + upper − lower circuit weights, clamped to ±2%.
// The two strategies differ only in where the source table and cue weights
// come from; the formula is shared.
// =============================================================================

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::news::parser::age_hours;
use crate::runtime_config::{FeatureWeights, RankingConfig, ScoringStrategy};

use super::patterns::TextFeatures;
use super::signal_decay::RecencyDecay;
use super::source_reliability::SourceTable;

const POSITIVE_HIT_POINTS: f64 = 2.0;
const NEGATIVE_HIT_POINTS: f64 = -2.5;
const CAPACITY_POINTS: f64 = 1.5;
const CURRENCY_POINTS: f64 = 1.0;
const PERCENT_POINTS: f64 = 0.5;
const LONG_BODY_POINTS: f64 = 0.5;

/// Damping for "fund"/"funds" with no raise/invest context.
pub const BARE_FUND_FACTOR: f64 = 0.7;

/// Damping for roundup/live-blog headlines.
pub const LISTICLE_FACTOR: f64 = 0.7;

/// Net institutional/circuit adjustment is bounded to ±2%.
pub const MAX_CUE_ADJUSTMENT: f64 = 0.02;

static BUILTIN_TABLE: LazyLock<SourceTable> = LazyLock::new(SourceTable::builtin);
static BUILTIN_WEIGHTS: LazyLock<FeatureWeights> = LazyLock::new(FeatureWeights::default);

/// Every intermediate of one scoring pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub features: TextFeatures,
    /// Additive content score before multipliers.
    pub content: f64,
    /// Product of fund, cue and listicle multipliers.
    pub multiplier: f64,
    pub source_weight: f64,
    pub age_hours: Option<f64>,
    pub decay: f64,
    pub raw_score: f64,
    pub decayed_score: f64,
}

/// Scoring strategy, fixed for a run.
#[derive(Debug, Clone)]
pub enum ArticleScorer {
    /// Built-in source table and cue weights.
    Heuristic { decay: RecencyDecay },
    /// Source table extended from config, cue weights from config.
    ConfigWeighted {
        decay: RecencyDecay,
        sources: SourceTable,
        weights: FeatureWeights,
    },
}

impl ArticleScorer {
    pub fn from_config(config: &RankingConfig) -> Self {
        let decay = RecencyDecay::new(config.half_life_hours);
        match config.strategy {
            ScoringStrategy::Heuristic => Self::Heuristic { decay },
            ScoringStrategy::ConfigWeighted => Self::ConfigWeighted {
                decay,
                sources: SourceTable::with_overrides(&config.source_bonus),
                weights: config.feature_weights.clone(),
            },
        }
    }

    pub fn strategy(&self) -> ScoringStrategy {
        match self {
            Self::Heuristic { .. } => ScoringStrategy::Heuristic,
            Self::ConfigWeighted { .. } => ScoringStrategy::ConfigWeighted,
        }
    }

    fn parts(&self) -> (&RecencyDecay, &SourceTable, &FeatureWeights) {
        match self {
            Self::Heuristic { decay } => (decay, &*BUILTIN_TABLE, &*BUILTIN_WEIGHTS),
            Self::ConfigWeighted {
                decay,
                sources,
                weights,
            } => (decay, sources, weights),
        }
    }

    pub fn decay(&self) -> &RecencyDecay {
        self.parts().0
    }

    /// Score one article. `decayed_score` is the ranked value; the rest is
    /// kept for auditing. Pure in its inputs.
    pub fn breakdown(
        &self,
        title: &str,
        body: &str,
        source: &str,
        published: &str,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let (decay, sources, weights) = self.parts();
        let features = TextFeatures::extract(title, body);
        let source_weight = sources.weight(source);
        let age = age_hours(published, now);
        let decay_factor = decay.factor(age);

        let content = content_points(&features);
        let multiplier = content_multiplier(&features, weights);

        let raw_score = if features.positive_hits.is_empty() || content <= 0.0 {
            0.0
        } else {
            content * multiplier * source_weight
        };

        ScoreBreakdown {
            features,
            content,
            multiplier,
            source_weight,
            age_hours: age,
            decay: decay_factor,
            raw_score,
            decayed_score: raw_score * decay_factor,
        }
    }
}

fn content_points(f: &TextFeatures) -> f64 {
    let mut points = POSITIVE_HIT_POINTS * f.positive_hits.len() as f64
        + NEGATIVE_HIT_POINTS * f.negative_hits.len() as f64;
    if f.has_capacity {
        points += CAPACITY_POINTS;
    }
    if f.has_currency {
        points += CURRENCY_POINTS;
    }
    if f.has_percentage {
        points += PERCENT_POINTS;
    }
    if f.long_body {
        points += LONG_BODY_POINTS;
    }
    points
}

fn content_multiplier(f: &TextFeatures, w: &FeatureWeights) -> f64 {
    let mut multiplier: f64 = 1.0;
    if f.bare_fund_mention {
        multiplier *= BARE_FUND_FACTOR;
    }

    let mut cues: f64 = 0.0;
    if f.institutional {
        cues += w.inst_cues;
    }
    if f.upper_circuit {
        cues += w.circuit_upper;
    }
    if f.lower_circuit {
        cues -= w.circuit_lower;
    }
    multiplier *= 1.0 + cues.clamp(-MAX_CUE_ADJUSTMENT, MAX_CUE_ADJUSTMENT);

    if f.listicle {
        multiplier *= LISTICLE_FACTOR;
    }
    multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
    }

    fn scorer() -> ArticleScorer {
        ArticleScorer::from_config(&RankingConfig::default())
    }

    const FRESH: &str = "2024-05-02 12:00:00";

    fn decayed(s: &ArticleScorer, title: &str, source: &str, published: &str) -> f64 {
        let b = s.breakdown(title, "body", source, published, now());
        b.decayed_score
    }

    #[test]
    fn order_with_amount_scores_positive() {
        let b = scorer().breakdown(
            "ACME wins ₹1,200 crore order",
            "The order was placed by the ministry.",
            "someblog.example",
            FRESH,
            now(),
        );
        // order + currency
        assert!((b.content - 3.0).abs() < 1e-9);
        assert!((b.raw_score - 3.0).abs() < 1e-9);
        assert!((b.decayed_score - 3.0).abs() < 1e-9);
    }

    #[test]
    fn scoring_is_idempotent() {
        let s = scorer();
        let a = decayed(&s, "ACME bags order", "reuters", FRESH);
        let b = decayed(&s, "ACME bags order", "reuters", FRESH);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn no_positive_hits_scores_zero() {
        let b = scorer().breakdown(
            "ACME shares trade flat",
            "₹500 crore",
            "reuters",
            FRESH,
            now(),
        );
        assert_eq!(b.decayed_score, 0.0);
    }

    #[test]
    fn negatives_floor_at_zero() {
        let s = scorer();
        let title = "ACME wins order but posts loss, faces penalty";
        assert_eq!(decayed(&s, title, "reuters", FRESH), 0.0);
    }

    #[test]
    fn strictly_decreasing_in_age() {
        let s = scorer();
        let ages = [
            "2024-05-02 12:00:00",
            "2024-05-02 06:00:00",
            "2024-05-01 12:00:00",
            "2024-04-29 12:00:00",
        ];
        let scores: Vec<f64> = ages
            .iter()
            .map(|p| decayed(&s, "ACME wins order", "reuters", p))
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1], "{scores:?}");
        }
    }

    #[test]
    fn one_half_life_halves_the_score() {
        let s = scorer();
        let fresh = decayed(&s, "ACME wins order", "reuters", FRESH);
        let old = decayed(&s, "ACME wins order", "reuters", "2024-04-30 12:00:00");
        assert!((old - fresh / 2.0).abs() < 1e-9);
    }

    #[test]
    fn undated_article_decays_to_zero() {
        let b = scorer().breakdown("ACME wins order", "body", "reuters", "sometime", now());
        assert!(b.raw_score > 0.0);
        assert_eq!(b.decayed_score, 0.0);
    }

    #[test]
    fn listicle_headline_is_damped() {
        let s = scorer();
        let plain = s.breakdown("ACME wins order", "body", "x", FRESH, now());
        let title = "Stocks to watch: ACME wins order";
        let listy = s.breakdown(title, "body", "x", FRESH, now());
        assert!(listy.features.listicle);
        let expected = plain.raw_score * LISTICLE_FACTOR;
        assert!((listy.raw_score - expected).abs() < 1e-9);
    }

    #[test]
    fn bare_fund_mention_is_damped() {
        let title = "Mutual funds add ACME after order win";
        let b = scorer().breakdown(title, "body", "x", FRESH, now());
        assert!(b.features.bare_fund_mention);
        assert!((b.multiplier - BARE_FUND_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn cue_adjustment_is_clamped() {
        let mut cfg = RankingConfig::default();
        cfg.feature_weights.inst_cues = 0.5;
        cfg.feature_weights.circuit_upper = 0.5;
        let s = ArticleScorer::from_config(&cfg);
        let b = s.breakdown(
            "FIIs buy into ACME order win, stock hits upper circuit",
            "body",
            "x",
            FRESH,
            now(),
        );
        assert!((b.multiplier - (1.0 + MAX_CUE_ADJUSTMENT)).abs() < 1e-9);
    }

    #[test]
    fn lower_circuit_pulls_down() {
        let title = "ACME wins order yet hits lower circuit";
        let b = scorer().breakdown(title, "body", "x", FRESH, now());
        assert!((b.multiplier - 0.99).abs() < 1e-9);
    }

    #[test]
    fn source_weight_scales_score() {
        let s = scorer();
        let wire = decayed(&s, "ACME wins order", "reuters.com", FRESH);
        let blog = decayed(&s, "ACME wins order", "someblog.example", FRESH);
        assert!((wire - blog * 1.6).abs() < 1e-9);
    }

    #[test]
    fn strategies_differ_only_in_weights() {
        let mut overrides = BTreeMap::new();
        overrides.insert("someblog".to_string(), 1.2);
        let mut cfg = RankingConfig::default();
        cfg.source_bonus = overrides;

        let weighted = ArticleScorer::from_config(&cfg);
        cfg.strategy = ScoringStrategy::Heuristic;
        let heuristic = ArticleScorer::from_config(&cfg);
        assert_eq!(heuristic.strategy(), ScoringStrategy::Heuristic);

        let title = "ACME wins order";
        let w = weighted.breakdown(title, "body", "someblog.example", FRESH, now());
        let h = heuristic.breakdown(title, "body", "someblog.example", FRESH, now());
        assert!((w.source_weight - 1.2).abs() < f64::EPSILON);
        assert!((h.source_weight - 1.0).abs() < f64::EPSILON);
        assert!((w.raw_score - h.raw_score * 1.2).abs() < 1e-9);
    }
}
