// =============================================================================
// Ranking Configuration — read-once tunables
// =============================================================================
//
// Every tunable of the ranking run lives here: source bonuses, event bonuses,
// feature weights, the recency half-life and the Best-Buy-Today thresholds.
//
// All fields carry `#[serde(default)]` so a partial (or empty) JSON file still
// loads, and a missing file falls back to neutral defaults with a warning.
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_half_life_hours() -> f64 {
    48.0
}

fn default_top_k() -> usize {
    10
}

fn default_inst_cues() -> f64 {
    0.01
}

fn default_circuit_weight() -> f64 {
    0.01
}

fn default_max_age_hours() -> f64 {
    48.0
}

fn default_min_certainty() -> f64 {
    0.50
}

fn default_min_trust() -> f64 {
    0.45
}

fn default_min_day_return_pct() -> f64 {
    -0.5
}

fn default_soft_min_impact() -> f64 {
    0.25
}

fn default_max_picks() -> usize {
    25
}

// =============================================================================
// ScoringStrategy
// =============================================================================

/// Which article-scoring variant the run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Fixed source table and built-in feature weights.
    Heuristic,
    /// Source table extended by `source_bonus`, weights from `feature_weights`.
    ConfigWeighted,
}

impl Default for ScoringStrategy {
    fn default() -> Self {
        Self::ConfigWeighted
    }
}

impl std::fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::ConfigWeighted => write!(f, "config_weighted"),
        }
    }
}

// =============================================================================
// FeatureWeights
// =============================================================================

/// Small multiplicative nudges applied by the article scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeights {
    /// Boost when FII/FPI/DII/QIB/anchor/block/bulk-deal cues appear.
    #[serde(default = "default_inst_cues")]
    pub inst_cues: f64,

    /// Penalty when a lower-circuit hit is mentioned.
    #[serde(default = "default_circuit_weight")]
    pub circuit_lower: f64,

    /// Boost when an upper-circuit hit is mentioned.
    #[serde(default = "default_circuit_weight")]
    pub circuit_upper: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            inst_cues: default_inst_cues(),
            circuit_lower: default_circuit_weight(),
            circuit_upper: default_circuit_weight(),
        }
    }
}

// =============================================================================
// GateThresholds
// =============================================================================

/// Hard and soft limits for the Best-Buy-Today subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Best article older than this (or of unknown age) is rejected.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: f64,

    #[serde(default = "default_min_certainty")]
    pub min_certainty: f64,

    #[serde(default = "default_min_trust")]
    pub min_trust: f64,

    /// Live-day return in percent below which the ticker is rejected.
    #[serde(default = "default_min_day_return_pct")]
    pub min_day_return_pct: f64,

    /// Impact below this is flagged, not rejected.
    #[serde(default = "default_soft_min_impact")]
    pub soft_min_impact: f64,

    /// Upper bound on the size of the gated output.
    #[serde(default = "default_max_picks")]
    pub max_picks: usize,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            min_certainty: default_min_certainty(),
            min_trust: default_min_trust(),
            min_day_return_pct: default_min_day_return_pct(),
            soft_min_impact: default_soft_min_impact(),
            max_picks: default_max_picks(),
        }
    }
}

// =============================================================================
// RankingConfig
// =============================================================================

/// Top-level configuration for one ranking run.
///
/// Loaded once at start-up and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Source domain (lower-case substring) → reliability weight.
    #[serde(default)]
    pub source_bonus: BTreeMap<String, f64>,

    /// Event label (e.g. "Order/contract") → intensity multiplier.
    #[serde(default)]
    pub event_bonus: BTreeMap<String, f64>,

    #[serde(default)]
    pub feature_weights: FeatureWeights,

    /// Article scores halve every `half_life_hours`.
    #[serde(default = "default_half_life_hours")]
    pub half_life_hours: f64,

    /// Articles per ticker that count toward the aggregate.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub strategy: ScoringStrategy,

    #[serde(default)]
    pub thresholds: GateThresholds,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            source_bonus: BTreeMap::new(),
            event_bonus: BTreeMap::new(),
            feature_weights: FeatureWeights::default(),
            half_life_hours: default_half_life_hours(),
            top_k: default_top_k(),
            strategy: ScoringStrategy::default(),
            thresholds: GateThresholds::default(),
        }
    }
}

impl RankingConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ranking config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse ranking config from {}", path.display()))?;

        info!(
            path = %path.display(),
            strategy = %config.strategy,
            half_life_hours = config.half_life_hours,
            sources = config.source_bonus.len(),
            "ranking config loaded"
        );

        Ok(config)
    }

    /// Load, falling back to neutral defaults when the file is missing or
    /// unparseable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "ranking config unavailable, using defaults");
            Self::default()
        })
    }

    /// Multiplier for an event label; 1.0 when the label is not configured.
    pub fn event_bonus_for(&self, label: &str) -> f64 {
        self.event_bonus.get(label).copied().unwrap_or(1.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RankingConfig::default();
        assert_eq!(cfg.top_k, 10);
        assert_eq!(cfg.strategy, ScoringStrategy::ConfigWeighted);
        assert!((cfg.half_life_hours - 48.0).abs() < f64::EPSILON);
        assert!((cfg.thresholds.min_certainty - 0.50).abs() < f64::EPSILON);
        assert!((cfg.thresholds.min_trust - 0.45).abs() < f64::EPSILON);
        assert!((cfg.thresholds.min_day_return_pct + 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds.max_picks, 25);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RankingConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.source_bonus.is_empty());
        assert!((cfg.feature_weights.inst_cues - 0.01).abs() < f64::EPSILON);
        assert!((cfg.thresholds.max_age_hours - 48.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "source_bonus": { "reuters": 1.6 },
            "event_bonus": { "Order/contract": 1.2 },
            "feature_weights": { "inst_cues": 0.015 },
            "strategy": "heuristic"
        }"#;
        let cfg: RankingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.strategy, ScoringStrategy::Heuristic);
        assert!((cfg.source_bonus["reuters"] - 1.6).abs() < f64::EPSILON);
        assert!((cfg.feature_weights.inst_cues - 0.015).abs() < f64::EPSILON);
        assert!((cfg.feature_weights.circuit_upper - 0.01).abs() < f64::EPSILON);
        assert_eq!(cfg.top_k, 10);
    }

    #[test]
    fn event_bonus_defaults_to_neutral() {
        let mut cfg = RankingConfig::default();
        cfg.event_bonus.insert("Regulatory".into(), 1.1);
        assert!((cfg.event_bonus_for("Regulatory") - 1.1).abs() < f64::EPSILON);
        assert!((cfg.event_bonus_for("General") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RankingConfig::load_or_default(dir.path().join("absent.json"));
        assert_eq!(cfg.top_k, 10);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking_config.json");
        let json = r#"{ "top_k": 7, "source_bonus": { "livemint": 1.3 } }"#;
        std::fs::write(&path, json).unwrap();
        let loaded = RankingConfig::load(&path).unwrap();
        assert_eq!(loaded.top_k, 7);
        assert!((loaded.source_bonus["livemint"] - 1.3).abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(RankingConfig::load(&path).is_err());
        assert_eq!(RankingConfig::load_or_default(&path).top_k, 10);
    }
}
