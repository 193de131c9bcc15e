// =============================================================================
// Source Reliability — outlet → multiplicative weight
// =============================================================================
//
// Matching is by lower-cased substring of the `Source:` field; when several
// keys match, the longest key wins so "economictimes" beats "times".
// Unknown outlets weigh 1.0.
// =============================================================================

use std::collections::BTreeMap;

/// Neutral weight for outlets not in the table.
pub const UNKNOWN_SOURCE_WEIGHT: f64 = 1.0;

/// Highest weight in the built-in table; used to normalise trust.
pub const MAX_SOURCE_WEIGHT: f64 = 1.6;

const BUILTIN_SOURCES: &[(&str, f64)] = &[
    // Premium wires
    ("reuters", 1.6),
    ("bloomberg", 1.6),
    ("ft.com", 1.5),
    ("wsj", 1.5),
    // Exchange filings
    ("bseindia", 1.5),
    ("nseindia", 1.5),
    // Top Indian financial dailies
    ("economictimes", 1.4),
    ("business-standard", 1.35),
    ("livemint", 1.3),
    ("moneycontrol", 1.3),
    ("thehindubusinessline", 1.25),
    ("financialexpress", 1.2),
    ("ndtvprofit", 1.2),
    ("cnbctv18", 1.2),
];

#[derive(Debug, Clone)]
pub struct SourceTable {
    weights: BTreeMap<String, f64>,
}

impl SourceTable {
    /// The fixed built-in table.
    pub fn builtin() -> Self {
        Self {
            weights: BUILTIN_SOURCES
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }

    /// Built-in table with `overrides` layered on top.
    pub fn with_overrides(overrides: &BTreeMap<String, f64>) -> Self {
        let mut table = Self::builtin();
        for (key, weight) in overrides {
            let key = key.trim().to_lowercase();
            if !key.is_empty() && weight.is_finite() && *weight > 0.0 {
                table.weights.insert(key, *weight);
            }
        }
        table
    }

    pub fn weight(&self, source: &str) -> f64 {
        let source = source.to_lowercase();
        self.weights
            .iter()
            .filter(|(key, _)| source.contains(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, w)| *w)
            .unwrap_or(UNKNOWN_SOURCE_WEIGHT)
    }
}

impl Default for SourceTable {
    fn default() -> Self {
        Self::builtin()
    }
}
