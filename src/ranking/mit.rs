// =============================================================================
// MIT Combiner — Magnitude × Intensity × Timing
// =============================================================================
//
// Magnitude  = 0.85 · size + 0.15 · event_baseline
//              size = ½ abs + ½ relative when a market cap is known, else abs
// Intensity  = baseline × event_bonus × source_weight × name_precision
//              × dedup_damping × listicle × learning
// Timing     = live: ½ · clamp(pct, 0..5)/5 + ½ · (clamp(vol, 1..3) − 1)/2
//              fallback: 0.25 + 0.5 · event_baseline
//
// Every factor is kept alongside the product so a ranked row can be audited.
// =============================================================================

use serde::Serialize;

use crate::entity::validator::contains_phrase;
use crate::market_data::LiveQuote;
use crate::news::dedup::duplicate_damping;
use crate::signals::magnitude::{normalize_abs, normalize_relative};
use crate::signals::EventType;

/// Intensity multiplier when the ticker is not an exact word in the headline.
pub const LOOSE_NAME_FACTOR: f64 = 0.85;

/// Intensity multiplier for listicle / live-update headlines.
pub const LISTICLE_INTENSITY_FACTOR: f64 = 0.8;

/// Live-day move that saturates the price half of Timing.
const PCT_SATURATION: f64 = 5.0;

/// Volume ratio range mapped onto the volume half of Timing.
const VOLUME_RATIO_FLOOR: f64 = 1.0;
const VOLUME_RATIO_CEILING: f64 = 3.0;

/// Timing never drops below this so a flat day does not erase a strong story.
pub const MIN_TIMING: f64 = 0.05;

/// Everything Intensity multiplies together.
#[derive(Debug, Clone, Serialize)]
pub struct IntensityFactors {
    pub baseline: f64,
    pub event_bonus: f64,
    pub source_weight: f64,
    pub name_precision: f64,
    pub dedup_damping: f64,
    pub listicle: f64,
    pub learning: f64,
}

impl IntensityFactors {
    pub fn product(&self) -> f64 {
        (self.baseline
            * self.event_bonus
            * self.source_weight
            * self.name_precision
            * self.dedup_damping
            * self.listicle
            * self.learning)
            .max(0.0)
    }
}

/// Inputs for one ticker's MIT score.
#[derive(Debug, Clone)]
pub struct MitInputs<'a> {
    pub ticker: &'a str,
    pub headline: &'a str,
    pub event: EventType,
    pub amount_cr: f64,
    pub market_cap_cr: Option<f64>,
    pub event_bonus: f64,
    pub source_weight: f64,
    pub duplicate_count: usize,
    pub listicle: bool,
    pub learning_multiplier: f64,
    pub quote: Option<&'a LiveQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MitScore {
    pub magnitude: f64,
    pub intensity: f64,
    pub timing: f64,
    pub score: f64,
    pub factors: IntensityFactors,
    /// `true` when Timing came from a live quote.
    pub live_timing: bool,
}

/// 1.0 when the ticker appears as a whole word in the headline.
pub fn name_precision(ticker: &str, headline: &str) -> f64 {
    if contains_phrase(&headline.to_lowercase(), &ticker.trim().to_lowercase()) {
        1.0
    } else {
        LOOSE_NAME_FACTOR
    }
}

pub fn magnitude(amount_cr: f64, market_cap_cr: Option<f64>, event: EventType) -> f64 {
    let abs = normalize_abs(amount_cr);
    let size = match market_cap_cr {
        Some(cap) if cap > 0.0 => 0.5 * abs + 0.5 * normalize_relative(amount_cr, cap),
        _ => abs,
    };
    (0.85 * size + 0.15 * event.baseline()).clamp(0.0, 1.0)
}

/// Live-quote Timing, or `None` when the quote carries neither a move nor a
/// volume ratio.
pub fn live_timing(quote: &LiveQuote) -> Option<f64> {
    let price = quote
        .pct_change
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, PCT_SATURATION) / PCT_SATURATION);
    let volume = quote.volume_ratio.filter(|v| v.is_finite()).map(|v| {
        (v.clamp(VOLUME_RATIO_FLOOR, VOLUME_RATIO_CEILING) - VOLUME_RATIO_FLOOR)
            / (VOLUME_RATIO_CEILING - VOLUME_RATIO_FLOOR)
    });
    let blended = match (price, volume) {
        (Some(p), Some(v)) => 0.5 * p + 0.5 * v,
        (Some(p), None) => p,
        (None, Some(v)) => v,
        (None, None) => return None,
    };
    Some(blended.max(MIN_TIMING))
}

pub fn fallback_timing(event: EventType) -> f64 {
    0.25 + 0.5 * event.baseline()
}

pub struct MitCombiner;

impl MitCombiner {
    pub fn score(inputs: &MitInputs<'_>) -> MitScore {
        let magnitude = magnitude(inputs.amount_cr, inputs.market_cap_cr, inputs.event);

        let factors = IntensityFactors {
            baseline: inputs.event.baseline(),
            event_bonus: inputs.event_bonus,
            source_weight: inputs.source_weight,
            name_precision: name_precision(inputs.ticker, inputs.headline),
            dedup_damping: duplicate_damping(inputs.duplicate_count),
            listicle: if inputs.listicle {
                LISTICLE_INTENSITY_FACTOR
            } else {
                1.0
            },
            learning: inputs.learning_multiplier,
        };
        let intensity = factors.product();

        let live = inputs.quote.and_then(live_timing);
        let timing = live.unwrap_or_else(|| fallback_timing(inputs.event));

        MitScore {
            magnitude,
            intensity,
            timing,
            score: magnitude * intensity * timing,
            factors,
            live_timing: live.is_some(),
        }
    }
}
