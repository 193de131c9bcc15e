// =============================================================================
// News Signal Ranker — Main Entry Point
// =============================================================================
//
// One batch run: discover recent dumps, parse, validate, score, aggregate,
// optionally fetch live quotes, rank by Magnitude × Intensity × Timing, gate
// the Best-Buy-Today subset and write the reports.
//
// No dumps in the window is a normal outcome: the summary is logged and no
// output files are produced.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod entity;
mod gating;
mod learning_store;
mod market_data;
mod news;
mod ranking;
mod report;
mod runtime_config;
mod signals;
mod types;

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::entity::EntityDb;
use crate::gating::BestBuyGate;
use crate::learning_store::LearningStore;
use crate::market_data::{MarketSnapshot, QuoteClient};
use crate::news::{find_dumps, parse_file};
use crate::ranking::RankingEngine;
use crate::report::{ReportPaths, RunSummary};
use crate::runtime_config::RankingConfig;

const DEFAULT_WINDOW_HOURS: f64 = 72.0;

/// Where the run reads from and writes to. Every field has a default and
/// can be overridden from the environment (or `.env`).
#[derive(Debug, Clone)]
struct RunSettings {
    input_dir: PathBuf,
    output_dir: PathBuf,
    window_hours: f64,
    config_path: PathBuf,
    entities_path: PathBuf,
    learning_path: PathBuf,
    outcomes_path: Option<PathBuf>,
    quote_url: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl RunSettings {
    fn from_env() -> Self {
        let window_hours = match env_opt("NEWSRANK_WINDOW_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or_else(|| {
                    warn!(value = %raw, "invalid NEWSRANK_WINDOW_HOURS, using default");
                    DEFAULT_WINDOW_HOURS
                }),
            None => DEFAULT_WINDOW_HOURS,
        };

        Self {
            input_dir: env_or("NEWSRANK_INPUT_DIR", "news_dumps").into(),
            output_dir: env_or("NEWSRANK_OUTPUT_DIR", "output").into(),
            window_hours,
            config_path: env_or("NEWSRANK_CONFIG", "ranking_config.json").into(),
            entities_path: env_or("NEWSRANK_ENTITIES", "entity_db.json").into(),
            learning_path: env_or("NEWSRANK_LEARNING", "learning_store.json").into(),
            outcomes_path: env_opt("NEWSRANK_OUTCOMES").map(PathBuf::from),
            quote_url: env_opt("NEWSRANK_QUOTE_URL"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment ───────────────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        News Signal Ranker — Batch Run                   ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let settings = RunSettings::from_env();
    let run_id = Uuid::new_v4().to_string();

    info!(
        run_id = %run_id,
        input_dir = %settings.input_dir.display(),
        output_dir = %settings.output_dir.display(),
        window_hours = settings.window_hours,
        live_quotes = settings.quote_url.is_some(),
        "run configured"
    );

    let summary = run(&settings, &run_id, Utc::now()).await?;
    summary.log();
    info!(outputs = summary.outputs.len(), "run complete");
    Ok(())
}

/// One batch run against `settings`, stamped with `now`. Returns the run
/// summary; report files are written only when at least one dump is found.
async fn run(
    settings: &RunSettings,
    run_id: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<RunSummary> {
    // ── 2. Config, entities & learning store ─────────────────────────────
    let config = RankingConfig::load_or_default(&settings.config_path);
    let entities = EntityDb::load_or_empty(&settings.entities_path);

    let mut learning = LearningStore::load_or_default(&settings.learning_path);
    if let Some(outcomes) = &settings.outcomes_path {
        match learning.ingest_outcomes(outcomes) {
            Ok(0) => info!("no new outcomes recorded"),
            Ok(_) => {
                if let Err(e) = learning.save() {
                    warn!(error = %e, "failed to persist learning store");
                }
            }
            Err(e) => warn!(error = %e, "outcomes unavailable, learning store unchanged"),
        }
    }

    let mut summary = RunSummary::new(run_id, now, config.strategy);

    // ── 3. Discover & parse dumps ────────────────────────────────────────
    let scan_time = SystemTime::from(now);
    let files = find_dumps(&settings.input_dir, settings.window_hours, scan_time)
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to list input directory");
            Vec::new()
        });
    summary.files_found = files.len();

    if files.is_empty() {
        info!(
            input_dir = %settings.input_dir.display(),
            "no news dumps in window, nothing to rank"
        );
        return Ok(summary);
    }

    let mut articles = Vec::new();
    for path in &files {
        match parse_file(path) {
            Ok(parsed) => {
                summary.files_parsed += 1;
                summary.blocks_skipped += parsed.skipped_blocks;
                articles.extend(parsed.articles);
            }
            Err(e) => {
                summary.files_failed += 1;
                warn!(path = %path.display(), error = %e, "skipping unreadable dump");
            }
        }
    }
    summary.articles_parsed = articles.len();

    // ── 4. Validate, score, aggregate ────────────────────────────────────
    let engine = RankingEngine::new(config, entities, learning.snapshot().clone());
    let (aggregates, stats) = engine.aggregate(&articles, now);
    summary.articles_entity_rejected = stats.entity_rejected;
    summary.articles_zero_scored = stats.zero_scored;
    summary.duplicates_dropped = stats.duplicates_dropped;

    // ── 5. Optional market data ──────────────────────────────────────────
    let market = match &settings.quote_url {
        Some(url) if !aggregates.is_empty() => match QuoteClient::new(url.as_str()) {
            Ok(client) => {
                let tickers: Vec<String> = aggregates.iter().map(|a| a.ticker.clone()).collect();
                client.fetch(&tickers).await
            }
            Err(e) => {
                warn!(error = %e, "quote client unavailable, heuristic timing for all tickers");
                MarketSnapshot::new()
            }
        },
        Some(_) => MarketSnapshot::new(),
        None => {
            info!("no quote endpoint configured, heuristic timing for all tickers");
            MarketSnapshot::new()
        }
    };

    // ── 6. Rank & gate ───────────────────────────────────────────────────
    let ranked = engine.rank(&aggregates, &market);
    let gate = BestBuyGate::new(engine.config().thresholds.clone());
    let picks = gate.select(&ranked);
    summary.tickers_ranked = ranked.len();
    summary.tickers_gated = picks.len();

    for (i, (row, verdict)) in picks.iter().enumerate() {
        info!(
            rank = i + 1,
            ticker = %row.ticker,
            mit_score = row.mit_score,
            event = %row.event_type,
            flags = %verdict.reason_string(),
            "best-buy-today pick"
        );
    }

    // ── 7. Reports ───────────────────────────────────────────────────────
    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            settings.output_dir.display()
        )
    })?;
    let paths = ReportPaths::for_run(&settings.output_dir, now);
    report::write_reports(&paths, &ranked, &picks)?;

    summary.outputs = vec![
        paths.ranked.display().to_string(),
        paths.best_buy.display().to_string(),
    ];
    summary.save(&paths.summary)?;
    Ok(summary)
}
