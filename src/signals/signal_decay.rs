// =============================================================================
// Recency Decay — half-life freshness for article scores
// =============================================================================
//
// factor(age) = exp(-ln2 · age_hours / half_life_hours)
//
// Unknown ages (unparseable publication stamps) fail closed with a factor
// of zero: an article we cannot date is treated as maximally old.
// =============================================================================

use serde::{Deserialize, Serialize};

const DEFAULT_HALF_LIFE_HOURS: f64 = 48.0;

/// Exponential decay with a fixed half-life in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyDecay {
    half_life_hours: f64,
}

impl RecencyDecay {
    /// Non-positive or non-finite half-lives fall back to the default.
    pub fn new(half_life_hours: f64) -> Self {
        let half_life_hours = if half_life_hours.is_finite() && half_life_hours > 0.0 {
            half_life_hours
        } else {
            DEFAULT_HALF_LIFE_HOURS
        };
        Self { half_life_hours }
    }

    pub fn half_life_hours(&self) -> f64 {
        self.half_life_hours
    }

    /// Multiplier in (0, 1] for a known age, 0 for an unknown one.
    pub fn factor(&self, age_hours: Option<f64>) -> f64 {
        match age_hours {
            Some(age) if age.is_finite() => {
                let age = age.max(0.0);
                (-age * (2.0_f64.ln()) / self.half_life_hours).exp()
            }
            _ => 0.0,
        }
    }
}

impl Default for RecencyDecay {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_LIFE_HOURS)
    }
}
