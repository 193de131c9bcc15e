// =============================================================================
// Ranking Pipeline — articles in, ranked rows out
// =============================================================================
//
// Stages, each a pure function of (inputs, config, entity DB, learning
// snapshot, market snapshot, now):
//
//   validate → score → group by ticker → top-K fold → MIT → stable sort
//
// Entity rejections and zero scores are designed outcomes: they are counted
// and logged at debug, never surfaced as errors.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::entity::{EntityDb, EntityValidator, ValidationReason};
use crate::learning_store::LearningSnapshot;
use crate::market_data::MarketSnapshot;
use crate::runtime_config::RankingConfig;
use crate::signals::magnitude::extract_article_amount_cr;
use crate::signals::{classify, is_listicle, ArticleScorer};
use crate::types::{Article, RankedRow, ScoredArticle, TickerAggregate};

use super::aggregator::{aggregate, group_by_ticker};
use super::certainty::impact_score;
use super::mit::{MitCombiner, MitInputs};

/// What happened to one article.
#[derive(Debug, Clone)]
pub enum ArticleOutcome {
    Rejected(ValidationReason),
    ZeroScore,
    Scored(ScoredArticle),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub articles_seen: usize,
    pub entity_rejected: usize,
    pub zero_scored: usize,
    pub duplicates_dropped: usize,
}

/// Read-only per-run ranking state.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    config: RankingConfig,
    entities: EntityDb,
    learning: LearningSnapshot,
    scorer: ArticleScorer,
}

impl RankingEngine {
    pub fn new(config: RankingConfig, entities: EntityDb, learning: LearningSnapshot) -> Self {
        let scorer = ArticleScorer::from_config(&config);
        info!(
            strategy = %scorer.strategy(),
            half_life_hours = scorer.decay().half_life_hours(),
            top_k = config.top_k,
            entities = entities.entities.len(),
            "ranking engine ready"
        );
        Self {
            config,
            entities,
            learning,
            scorer,
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn score_article(&self, article: &Article, now: DateTime<Utc>) -> ArticleOutcome {
        let validation = EntityValidator::new(&self.entities).validate(
            &article.ticker,
            &article.title,
            &article.body,
        );
        if validation.is_rejected() {
            return ArticleOutcome::Rejected(validation.reason);
        }

        let breakdown = self.scorer.breakdown(
            &article.title,
            &article.body,
            &article.source,
            &article.published,
            now,
        );
        if breakdown.decayed_score <= 0.0 {
            return ArticleOutcome::ZeroScore;
        }

        ArticleOutcome::Scored(ScoredArticle {
            article: article.clone(),
            raw_score: breakdown.raw_score,
            decayed_score: breakdown.decayed_score,
            event_type: classify(&article.title),
            magnitude_cr: extract_article_amount_cr(&article.title, &article.body),
            entity_confidence: validation.confidence,
            source_weight: breakdown.source_weight,
            age_hours: breakdown.age_hours,
            quantitative: breakdown.features.quantitative(),
        })
    }

    /// Score every article and fold per ticker. Tickers with nothing usable
    /// are omitted. Output is in first-seen ticker order.
    pub fn aggregate(
        &self,
        articles: &[Article],
        now: DateTime<Utc>,
    ) -> (Vec<TickerAggregate>, AggregateStats) {
        let mut stats = AggregateStats {
            articles_seen: articles.len(),
            ..Default::default()
        };

        let mut scored = Vec::new();
        for article in articles {
            match self.score_article(article, now) {
                ArticleOutcome::Rejected(reason) => {
                    stats.entity_rejected += 1;
                    debug!(
                        ticker = %article.ticker,
                        title = %article.title,
                        reason = %reason,
                        "article rejected by entity validation"
                    );
                }
                ArticleOutcome::ZeroScore => {
                    stats.zero_scored += 1;
                    debug!(
                        ticker = %article.ticker,
                        title = %article.title,
                        "article scored zero"
                    );
                }
                ArticleOutcome::Scored(s) => scored.push(s),
            }
        }

        let mut aggregates = Vec::new();
        for (ticker, group) in group_by_ticker(scored) {
            let cap = self.entities.market_cap_cr(&ticker);
            let agg = aggregate(&ticker, group, self.config.top_k, cap);
            stats.duplicates_dropped += agg.duplicates_dropped;
            if agg.total_score > 0.0 {
                aggregates.push(agg);
            }
        }

        info!(
            articles = stats.articles_seen,
            rejected = stats.entity_rejected,
            zero_scored = stats.zero_scored,
            duplicates_dropped = stats.duplicates_dropped,
            tickers = aggregates.len(),
            "articles aggregated"
        );
        (aggregates, stats)
    }

    /// MIT-score and sort. Ties keep aggregate order.
    pub fn rank(&self, aggregates: &[TickerAggregate], market: &MarketSnapshot) -> Vec<RankedRow> {
        let mut rows: Vec<RankedRow> = aggregates
            .iter()
            .filter_map(|agg| self.rank_one(agg, market))
            .collect();
        rows.sort_by(|a, b| b.mit_score.total_cmp(&a.mit_score));
        rows
    }

    fn rank_one(&self, agg: &TickerAggregate, market: &MarketSnapshot) -> Option<RankedRow> {
        if agg.total_score <= 0.0 {
            return None;
        }
        let best = agg.best_article.as_ref()?;

        let quote = market.get(&agg.ticker);
        let live_cap = quote.and_then(|q| q.market_cap_cr);
        let market_cap_cr = live_cap.or_else(|| self.entities.market_cap_cr(&agg.ticker));
        // The aggregate already carries impact at the profile cap.
        let impact = match live_cap {
            Some(cap) => impact_score(best.magnitude_cr, Some(cap), best.event_type),
            None => agg.impact_score,
        };
        let label = best.event_type.label();

        let mit = MitCombiner::score(&MitInputs {
            ticker: &agg.ticker,
            headline: &best.article.title,
            event: best.event_type,
            amount_cr: best.magnitude_cr,
            market_cap_cr,
            event_bonus: self.config.event_bonus_for(label),
            source_weight: best.source_weight,
            duplicate_count: agg.duplicate_count,
            listicle: is_listicle(&best.article.title),
            learning_multiplier: self.learning.event_multiplier(label),
            quote,
        });

        debug!(
            ticker = %agg.ticker,
            magnitude = mit.magnitude,
            intensity = mit.intensity,
            timing = mit.timing,
            live_timing = mit.live_timing,
            score = mit.score,
            "ticker ranked"
        );

        Some(RankedRow {
            ticker: agg.ticker.clone(),
            article_count: agg.article_count,
            total_score: agg.total_score,
            best_title: best.article.title.clone(),
            best_source: best.article.source.clone(),
            news_age_hours: best.age_hours,
            event_type: best.event_type,
            amt_cr: best.magnitude_cr,
            impact_score: impact,
            news_certainty: agg.certainty_score,
            trust_score: agg.trust_score,
            mit_magnitude: mit.magnitude,
            mit_intensity: mit.intensity,
            mit_timing: mit.timing,
            mit_score: mit.score,
            day_return_pct: quote.and_then(|q| q.pct_change),
        })
    }
}
