// =============================================================================
// Reports — ranked CSV, Best-Buy-Today CSV and the run summary
// =============================================================================
//
// Both CSVs are staged to `.tmp` siblings and renamed into place together,
// so a reader never sees a half-written report or one without its partner.
// Floats are written with four decimals; an unknown news age is an empty
// cell.
// =============================================================================

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::gating::GateVerdict;
use crate::types::RankedRow;

pub const RANKED_COLUMNS: [&str; 15] = [
    "ticker",
    "article_count",
    "total_score",
    "best_title",
    "best_source",
    "news_age_hours",
    "event_type",
    "amt_cr",
    "impact_score",
    "news_certainty",
    "trust_score",
    "mit_magnitude",
    "mit_intensity",
    "mit_timing",
    "mit_score",
];

fn f4(v: f64) -> String {
    format!("{:.4}", v)
}

fn row_fields(row: &RankedRow) -> Vec<String> {
    vec![
        row.ticker.clone(),
        row.article_count.to_string(),
        f4(row.total_score),
        row.best_title.clone(),
        row.best_source.clone(),
        row.news_age_hours.map(f4).unwrap_or_default(),
        row.event_type.label().to_string(),
        f4(row.amt_cr),
        f4(row.impact_score),
        f4(row.news_certainty),
        f4(row.trust_score),
        f4(row.mit_magnitude),
        f4(row.mit_intensity),
        f4(row.mit_timing),
        f4(row.mit_score),
    ]
}

/// Write a CSV to its `.tmp` sibling and return that path. The tmp file is
/// removed again when filling it fails.
fn stage_csv<F>(path: &Path, fill: F) -> Result<PathBuf>
where
    F: FnOnce(&mut csv::Writer<File>) -> Result<()>,
{
    let tmp_path = path.with_extension("csv.tmp");
    match write_csv(&tmp_path, fill) {
        Ok(()) => Ok(tmp_path),
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn write_csv<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<File>) -> Result<()>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    fill(&mut writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}

fn fill_ranked(w: &mut csv::Writer<File>, rows: &[RankedRow]) -> Result<()> {
    w.write_record(RANKED_COLUMNS)
        .context("failed to write ranked header")?;
    for row in rows {
        w.write_record(row_fields(row))
            .with_context(|| format!("failed to write ranked row for {}", row.ticker))?;
    }
    Ok(())
}

fn fill_best_buy(w: &mut csv::Writer<File>, picks: &[(RankedRow, GateVerdict)]) -> Result<()> {
    let mut header: Vec<&str> = RANKED_COLUMNS.to_vec();
    header.push("bb_reasons");
    w.write_record(&header)
        .context("failed to write best-buy header")?;
    for (row, verdict) in picks {
        let mut fields = row_fields(row);
        fields.push(verdict.reason_string());
        w.write_record(&fields)
            .with_context(|| format!("failed to write best-buy row for {}", row.ticker))?;
    }
    Ok(())
}

/// Write the ranked and Best-Buy-Today CSVs, both or neither.
///
/// Both files are staged as `.tmp` siblings first and only renamed into
/// place once both are complete. If the second rename fails the first
/// report is removed again.
pub fn write_reports(
    paths: &ReportPaths,
    ranked: &[RankedRow],
    picks: &[(RankedRow, GateVerdict)],
) -> Result<()> {
    let ranked_tmp = stage_csv(&paths.ranked, |w| fill_ranked(w, ranked))?;
    let best_buy_tmp = match stage_csv(&paths.best_buy, |w| fill_best_buy(w, picks)) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = std::fs::remove_file(&ranked_tmp);
            return Err(e);
        }
    };

    if let Err(e) = std::fs::rename(&ranked_tmp, &paths.ranked) {
        let _ = std::fs::remove_file(&ranked_tmp);
        let _ = std::fs::remove_file(&best_buy_tmp);
        return Err(e).with_context(|| {
            format!("failed to rename tmp report to {}", paths.ranked.display())
        });
    }
    if let Err(e) = std::fs::rename(&best_buy_tmp, &paths.best_buy) {
        let _ = std::fs::remove_file(&paths.ranked);
        let _ = std::fs::remove_file(&best_buy_tmp);
        return Err(e).with_context(|| {
            format!("failed to rename tmp report to {}", paths.best_buy.display())
        });
    }

    info!(
        ranked = %paths.ranked.display(),
        best_buy = %paths.best_buy.display(),
        rows = ranked.len(),
        picks = picks.len(),
        "reports written"
    );
    Ok(())
}

/// Output file names for one run, stamped with the reference time.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub ranked: PathBuf,
    pub best_buy: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn for_run(output_dir: impl AsRef<Path>, now: DateTime<Utc>) -> Self {
        let dir = output_dir.as_ref();
        let stamp = now.format("%Y%m%d_%H%M%S");
        Self {
            ranked: dir.join(format!("ranked_{stamp}.csv")),
            best_buy: dir.join(format!("best_buy_today_{stamp}.csv")),
            summary: dir.join(format!("run_summary_{stamp}.json")),
        }
    }
}

/// Counters for one run. Always logged; saved when outputs are written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: String,
    pub strategy: String,
    pub files_found: usize,
    pub files_parsed: usize,
    pub files_failed: usize,
    pub blocks_skipped: usize,
    pub articles_parsed: usize,
    pub articles_entity_rejected: usize,
    pub articles_zero_scored: usize,
    pub duplicates_dropped: usize,
    pub tickers_ranked: usize,
    pub tickers_gated: usize,
    pub outputs: Vec<String>,
}

impl RunSummary {
    pub fn new(run_id: impl Into<String>, now: DateTime<Utc>, strategy: impl ToString) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: now.to_rfc3339(),
            strategy: strategy.to_string(),
            ..Default::default()
        }
    }

    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            files_found = self.files_found,
            files_parsed = self.files_parsed,
            files_failed = self.files_failed,
            blocks_skipped = self.blocks_skipped,
            articles_parsed = self.articles_parsed,
            entity_rejected = self.articles_entity_rejected,
            zero_scored = self.articles_zero_scored,
            duplicates_dropped = self.duplicates_dropped,
            tickers_ranked = self.tickers_ranked,
            tickers_gated = self.tickers_gated,
            "run summary"
        );
    }

    /// Persist as pretty JSON using an atomic write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).context("failed to serialise run summary")?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp summary to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp summary to {}", path.display()))?;
        info!(path = %path.display(), "run summary saved (atomic)");
        Ok(())
    }
}
