// =============================================================================
// Learning Store — event-type outcome counters, loaded once per run
// =============================================================================
//
// Snapshot format:
//
//   {
//     "patterns": { "Order/contract": { "success": 12, "failure": 5 }, ... },
//     "ingested": ["<sha256 of an outcomes file>", ...]
//   }
//
// The ranking pipeline only reads a `LearningSnapshot`. New outcomes are
// folded in from an optional CSV (`event_type,success`) before ranking and
// the updated snapshot is saved atomically. Each outcomes file is counted
// once: its SHA-256 is recorded and a file with a known digest is skipped.
//
// Success rate is Laplace-smoothed: (s + 1) / (s + f + 2). The intensity
// multiplier maps that rate linearly onto [0.9, 1.1], so an event type with no
// history is neutral (1.0).
// =============================================================================

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

const MIN_MULTIPLIER: f64 = 0.9;
const MAX_MULTIPLIER: f64 = 1.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStats {
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failure: u64,
}

impl PatternStats {
    pub fn total(&self) -> u64 {
        self.success + self.failure
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningSnapshot {
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternStats>,
    /// Hex SHA-256 digests of outcome files already folded in.
    #[serde(default)]
    pub ingested: BTreeSet<String>,
}

impl LearningSnapshot {
    /// Laplace-smoothed success rate; 0.5 with no history.
    pub fn success_rate(&self, label: &str) -> f64 {
        let stats = self.patterns.get(label).copied().unwrap_or_default();
        (stats.success as f64 + 1.0) / (stats.total() as f64 + 2.0)
    }

    /// Intensity multiplier in [0.9, 1.1] for an event label.
    pub fn event_multiplier(&self, label: &str) -> f64 {
        MIN_MULTIPLIER + (MAX_MULTIPLIER - MIN_MULTIPLIER) * self.success_rate(label)
    }

    pub fn record(&mut self, label: &str, success: bool) {
        let stats = self.patterns.entry(label.to_string()).or_default();
        if success {
            stats.success += 1;
        } else {
            stats.failure += 1;
        }
    }
}

#[derive(Debug, Deserialize)]
struct OutcomeRecord {
    event_type: String,
    success: String,
}

fn parse_success(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "win" | "success" => Some(true),
        "0" | "false" | "no" | "n" | "loss" | "failure" => Some(false),
        _ => None,
    }
}

/// Snapshot plus the file it persists to.
#[derive(Debug, Clone)]
pub struct LearningStore {
    path: PathBuf,
    snapshot: LearningSnapshot,
}

impl LearningStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read learning store from {}", path.display()))?;
        let snapshot: LearningSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse learning store from {}", path.display()))?;

        info!(
            path = %path.display(),
            patterns = snapshot.patterns.len(),
            "learning store loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            snapshot,
        })
    }

    /// Load, or start empty (every multiplier neutral) when the file is
    /// missing or unparseable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "learning store unavailable, starting empty");
            Self {
                path: path.to_path_buf(),
                snapshot: LearningSnapshot::default(),
            }
        })
    }

    pub fn snapshot(&self) -> &LearningSnapshot {
        &self.snapshot
    }

    /// Fold outcomes from a CSV with header `event_type,success` into the
    /// snapshot. Rows with an empty label or an unreadable flag are skipped.
    /// A file whose content was ingested before records nothing.
    /// Returns the number of outcomes recorded.
    pub fn ingest_outcomes(&mut self, csv_path: impl AsRef<Path>) -> Result<usize> {
        let csv_path = csv_path.as_ref();
        let bytes = std::fs::read(csv_path)
            .with_context(|| format!("failed to read outcomes {}", csv_path.display()))?;

        let digest = hex::encode(Sha256::digest(&bytes));
        if self.snapshot.ingested.contains(&digest) {
            info!(path = %csv_path.display(), digest = %digest, "outcomes already ingested");
            return Ok(0);
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let mut recorded = 0;
        for (line, row) in reader.deserialize::<OutcomeRecord>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    debug!(line = line + 2, error = %e, "skipping malformed outcome row");
                    continue;
                }
            };
            match parse_success(&row.success) {
                Some(success) if !row.event_type.is_empty() => {
                    self.snapshot.record(&row.event_type, success);
                    recorded += 1;
                }
                _ => debug!(line = line + 2, "skipping unreadable outcome row"),
            }
        }

        self.snapshot.ingested.insert(digest);
        info!(path = %csv_path.display(), recorded, "outcomes ingested");
        Ok(recorded)
    }

    /// Persist the snapshot atomically (write to `.tmp`, then rename).
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.snapshot)
            .context("failed to serialise learning store to JSON")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp store to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename tmp store to {}", self.path.display()))?;

        info!(path = %self.path.display(), "learning store saved (atomic)");
        Ok(())
    }
}
