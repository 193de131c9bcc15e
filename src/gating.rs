// =============================================================================
// Best-Buy-Today Gate — hard rejections and soft flags per ranked row
// =============================================================================
//
// Any hard reason disqualifies a row. Soft reasons are recorded on eligible
// rows but never block them.
//
// Hard:
//   STALE_NEWS     — best article older than max_age_hours, or undated
//   LISTICLE       — roundup / live-update headline
//   LOW_CERTAINTY  — news_certainty < min_certainty
//   LOW_TRUST      — trust_score < min_trust
//   NEGATIVE_DAY   — live-day return < min_day_return_pct
// Soft:
//   SOFT_EVENT_TYPE — event outside Order/contract, IPO/listing, Regulatory
//   SOFT_LOW_IMPACT — impact_score < soft_min_impact
//
// Eligible rows are taken in rank order and capped at max_picks.
// =============================================================================

use tracing::{debug, info};

use crate::runtime_config::GateThresholds;
use crate::signals::is_listicle;
use crate::types::RankedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    StaleNews,
    Listicle,
    LowCertainty,
    LowTrust,
    NegativeDay,
    SoftEventType,
    SoftLowImpact,
}

impl ReasonCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::StaleNews => "STALE_NEWS",
            Self::Listicle => "LISTICLE",
            Self::LowCertainty => "LOW_CERTAINTY",
            Self::LowTrust => "LOW_TRUST",
            Self::NegativeDay => "NEGATIVE_DAY",
            Self::SoftEventType => "SOFT_EVENT_TYPE",
            Self::SoftLowImpact => "SOFT_LOW_IMPACT",
        }
    }

    pub fn is_hard(&self) -> bool {
        !matches!(self, Self::SoftEventType | Self::SoftLowImpact)
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateVerdict {
    pub eligible: bool,
    pub reasons: Vec<ReasonCode>,
}

impl GateVerdict {
    /// `;`-joined codes, as written to the `bb_reasons` column.
    pub fn reason_string(&self) -> String {
        self.reasons
            .iter()
            .map(ReasonCode::code)
            .collect::<Vec<_>>()
            .join(";")
    }
}

pub struct BestBuyGate {
    thresholds: GateThresholds,
}

impl BestBuyGate {
    pub fn new(thresholds: GateThresholds) -> Self {
        Self { thresholds }
    }

    pub fn eligible(&self, row: &RankedRow) -> GateVerdict {
        let t = &self.thresholds;
        let mut reasons = Vec::new();

        // ── Hard ─────────────────────────────────────────────────────────
        match row.news_age_hours {
            Some(age) if age <= t.max_age_hours => {}
            _ => reasons.push(ReasonCode::StaleNews),
        }
        if is_listicle(&row.best_title) {
            reasons.push(ReasonCode::Listicle);
        }
        if row.news_certainty < t.min_certainty {
            reasons.push(ReasonCode::LowCertainty);
        }
        if row.trust_score < t.min_trust {
            reasons.push(ReasonCode::LowTrust);
        }
        if row.day_return_pct.is_some_and(|r| r < t.min_day_return_pct) {
            reasons.push(ReasonCode::NegativeDay);
        }

        // ── Soft ─────────────────────────────────────────────────────────
        if !row.event_type.is_priority() {
            reasons.push(ReasonCode::SoftEventType);
        }
        if row.impact_score < t.soft_min_impact {
            reasons.push(ReasonCode::SoftLowImpact);
        }

        let eligible = !reasons.iter().any(ReasonCode::is_hard);
        GateVerdict { eligible, reasons }
    }

    /// Eligible rows in rank order, at most `max_picks`.
    pub fn select(&self, rows: &[RankedRow]) -> Vec<(RankedRow, GateVerdict)> {
        let mut picks = Vec::new();
        for row in rows {
            if picks.len() >= self.thresholds.max_picks {
                break;
            }
            let verdict = self.eligible(row);
            if verdict.eligible {
                picks.push((row.clone(), verdict));
            } else {
                debug!(ticker = %row.ticker, reasons = %verdict.reason_string(), "gated out");
            }
        }
        info!(ranked = rows.len(), picks = picks.len(), "best-buy-today selection done");
        picks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::EventType;

    fn row(ticker: &str) -> RankedRow {
        RankedRow {
            ticker: ticker.into(),
            article_count: 2,
            total_score: 5.0,
            best_title: format!("{ticker} wins ₹500 crore order"),
            best_source: "reuters.com".into(),
            news_age_hours: Some(6.0),
            event_type: EventType::OrderContract,
            amt_cr: 500.0,
            impact_score: 0.8,
            news_certainty: 0.9,
            trust_score: 0.9,
            mit_magnitude: 0.7,
            mit_intensity: 1.0,
            mit_timing: 0.65,
            mit_score: 0.455,
            day_return_pct: None,
        }
    }

    fn gate() -> BestBuyGate {
        BestBuyGate::new(GateThresholds::default())
    }

    #[test]
    fn clean_row_passes_without_reasons() {
        let v = gate().eligible(&row("ACME"));
        assert!(v.eligible);
        assert!(v.reasons.is_empty());
        assert_eq!(v.reason_string(), "");
    }

    #[test]
    fn low_certainty_is_ineligible_despite_strong_scores() {
        let mut r = row("ACME");
        r.news_certainty = 0.40;
        r.impact_score = 1.0;
        r.trust_score = 1.0;
        let v = gate().eligible(&r);
        assert!(!v.eligible);
        assert_eq!(v.reasons, vec![ReasonCode::LowCertainty]);
    }

    fn reasons(r: &RankedRow) -> Vec<ReasonCode> {
        gate().eligible(r).reasons
    }

    #[test]
    fn each_hard_reason() {
        let mut stale = row("A");
        stale.news_age_hours = Some(49.0);
        assert!(reasons(&stale).contains(&ReasonCode::StaleNews));

        let mut undated = row("A");
        undated.news_age_hours = None;
        assert!(reasons(&undated).contains(&ReasonCode::StaleNews));

        let mut untrusted = row("A");
        untrusted.trust_score = 0.44;
        assert!(reasons(&untrusted).contains(&ReasonCode::LowTrust));

        let mut red = row("A");
        red.day_return_pct = Some(-0.6);
        assert!(reasons(&red).contains(&ReasonCode::NegativeDay));

        let mut listy = row("A");
        listy.best_title = "Stocks to watch today".into();
        assert!(reasons(&listy).contains(&ReasonCode::Listicle));
    }

    #[test]
    fn boundaries_are_inclusive() {
        let mut r = row("A");
        r.news_age_hours = Some(48.0);
        r.news_certainty = 0.50;
        r.trust_score = 0.45;
        r.day_return_pct = Some(-0.5);
        assert!(gate().eligible(&r).eligible);
    }

    #[test]
    fn soft_flags_do_not_block() {
        let mut r = row("A");
        r.event_type = EventType::Results;
        r.impact_score = 0.1;
        let v = gate().eligible(&r);
        assert!(v.eligible);
        assert_eq!(v.reason_string(), "SOFT_EVENT_TYPE;SOFT_LOW_IMPACT");
    }

    #[test]
    fn selection_is_capped_and_ordered() {
        let mut thresholds = GateThresholds::default();
        thresholds.max_picks = 2;
        let gate = BestBuyGate::new(thresholds);

        let mut blocked = row("B");
        blocked.news_certainty = 0.1;
        let rows = vec![row("A"), blocked, row("C"), row("D")];
        let picks: Vec<String> = gate
            .select(&rows)
            .into_iter()
            .map(|(r, _)| r.ticker)
            .collect();
        assert_eq!(picks, vec!["A", "C"]);
    }
}
