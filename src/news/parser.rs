// =============================================================================
// Dump Parser — text dumps into Article records
// =============================================================================
//
// A dump is a sequence of blocks:
//
//   Full Article Fetch Test - <TICKER>
//   Title   : <headline>
//   Source  : <domain/outlet>
//   Published: <timestamp or arbitrary string>
//   URL     : <http(s) URL>
//   -----
//   <free-text body until next header/Title>
//
// A `Title:` line inside a body starts a new block for the same ticker.
// Blocks without a title or with an empty body are skipped and counted.
// Output order is file order.
// =============================================================================

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

use crate::types::Article;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Full Article Fetch Test\s*-\s*(\S+)").expect("valid header pattern")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(title|source|published|url)\s*:\s*(.*?)\s*$")
        .expect("valid field pattern")
});

/// Minimum run of dashes that separates the header fields from the body.
const MIN_SEPARATOR_DASHES: usize = 5;

/// Offset applied to stamps suffixed with "IST".
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%d-%m-%Y %H:%M",
];

/// Result of parsing one dump.
#[derive(Debug, Default)]
pub struct ParsedDump {
    pub articles: Vec<Article>,
    pub skipped_blocks: usize,
}

#[derive(Debug)]
struct BlockBuilder {
    ticker: String,
    title: Option<String>,
    source: String,
    published: String,
    url: String,
    body: Vec<String>,
    in_body: bool,
}

impl BlockBuilder {
    fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            title: None,
            source: String::new(),
            published: String::new(),
            url: String::new(),
            body: Vec::new(),
            in_body: false,
        }
    }

    fn set_field(&mut self, key: &str, value: String) {
        match key {
            "title" => self.title = Some(value),
            "source" => self.source = value,
            "published" => self.published = value,
            "url" => self.url = value,
            _ => {}
        }
    }

    fn finish(self) -> Option<Article> {
        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();
        let body = self.body.join("\n").trim().to_string();
        if self.ticker.is_empty() || title.is_empty() || body.is_empty() {
            debug!(ticker = %self.ticker, title = %title, "skipping incomplete article block");
            return None;
        }
        Some(Article {
            ticker: self.ticker,
            title,
            source: self.source,
            published: self.published,
            url: self.url,
            body,
        })
    }
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= MIN_SEPARATOR_DASHES && trimmed.chars().all(|c| c == '-')
}

fn flush(block: Option<BlockBuilder>, out: &mut ParsedDump) {
    if let Some(block) = block {
        match block.finish() {
            Some(article) => out.articles.push(article),
            None => out.skipped_blocks += 1,
        }
    }
}

/// Parse an in-memory dump. Deterministic for a given input.
pub fn parse_dump(text: &str) -> ParsedDump {
    let mut out = ParsedDump::default();
    let mut current: Option<BlockBuilder> = None;

    for line in text.lines() {
        if let Some(caps) = HEADER_RE.captures(line) {
            flush(current.take(), &mut out);
            current = Some(BlockBuilder::new(caps[1].trim().to_uppercase()));
            continue;
        }

        // Anything before the first header has no ticker to belong to.
        let Some(block) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = FIELD_RE.captures(line) {
            let key = caps[1].to_ascii_lowercase();
            let value = caps[2].to_string();

            if !block.in_body {
                block.set_field(&key, value);
            } else if key == "title" {
                let ticker = block.ticker.clone();
                flush(current.take(), &mut out);
                let mut next = BlockBuilder::new(ticker);
                next.title = Some(value);
                current = Some(next);
            } else {
                block.body.push(line.to_string());
            }
            continue;
        }

        if is_separator(line) {
            block.in_body = true;
            continue;
        }

        if block.in_body {
            block.body.push(line.to_string());
        }
    }

    flush(current.take(), &mut out);
    out
}

/// Read and parse a dump file. Invalid UTF-8 is replaced rather than
/// rejected; I/O errors propagate.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedDump> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read dump {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let parsed = parse_dump(&text);
    debug!(
        path = %path.display(),
        articles = parsed.articles.len(),
        skipped = parsed.skipped_blocks,
        "dump parsed"
    );
    Ok(parsed)
}

/// Hours from `published` to `now`; `None` when the stamp is unparseable.
/// Stamps in the future count as age zero.
pub fn age_hours(published: &str, now: DateTime<Utc>) -> Option<f64> {
    let published = parse_timestamp(published)?;
    let secs = (now - published).num_seconds().max(0) as f64;
    Some(secs / 3600.0)
}

/// Best-effort timestamp parsing for the `Published:` field.
///
/// Naive stamps are read as UTC unless suffixed with `IST`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    let (stamp, offset_secs) = if let Some(s) = raw.strip_suffix("IST") {
        (s.trim(), IST_OFFSET_SECS)
    } else if let Some(s) = raw.strip_suffix("UTC").or_else(|| raw.strip_suffix("GMT")) {
        (s.trim(), 0)
    } else {
        (raw, 0)
    };
    let offset = FixedOffset::east_opt(offset_secs)?;

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stamp, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn block(ticker: &str, title: &str, body: &str) -> String {
        format!(
            "Full Article Fetch Test - {ticker}\n\
             Title   : {title}\n\
             Source  : economictimes.indiatimes.com\n\
             Published: 2024-05-01 09:30:00\n\
             URL     : https://example.com/{ticker}\n\
             -----\n\
             {body}\n"
        )
    }

    #[test]
    fn n_well_formed_blocks_yield_n_articles() {
        let dump: String = (0..5)
            .map(|i| {
                let ticker = format!("T{i}");
                block(&ticker, &format!("Headline {i}"), "Some body text.")
            })
            .collect();
        let parsed = parse_dump(&dump);
        assert_eq!(parsed.articles.len(), 5);
        assert_eq!(parsed.skipped_blocks, 0);
        for (i, a) in parsed.articles.iter().enumerate() {
            assert_eq!(a.ticker, format!("T{i}"));
            assert_eq!(a.title, format!("Headline {i}"));
            assert!(!a.ticker.is_empty() && !a.title.is_empty());
        }
    }

    #[test]
    fn fields_are_extracted() {
        let parsed = parse_dump(&block("acme", "ACME wins order", "Line one.\nLine two."));
        let a = &parsed.articles[0];
        assert_eq!(a.ticker, "ACME");
        assert_eq!(a.source, "economictimes.indiatimes.com");
        assert_eq!(a.published, "2024-05-01 09:30:00");
        assert_eq!(a.url, "https://example.com/acme");
        assert_eq!(a.body, "Line one.\nLine two.");
    }

    #[test]
    fn block_without_title_is_skipped() {
        let dump = "Full Article Fetch Test - ACME\nSource: x\n-----\nbody\n".to_string()
            + &block("BETA", "Beta title", "body");
        let parsed = parse_dump(&dump);
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].ticker, "BETA");
        assert_eq!(parsed.skipped_blocks, 1);
    }

    #[test]
    fn block_with_empty_body_is_skipped() {
        let parsed = parse_dump(&block("ACME", "Title here", "   "));
        assert!(parsed.articles.is_empty());
        assert_eq!(parsed.skipped_blocks, 1);
    }

    #[test]
    fn title_line_inside_body_starts_new_block() {
        let dump = "Full Article Fetch Test - ACME\n\
                    Title: First\n\
                    -----\n\
                    first body\n\
                    Title: Second\n\
                    Source: livemint.com\n\
                    -----\n\
                    second body\n";
        let parsed = parse_dump(dump);
        assert_eq!(parsed.articles.len(), 2);
        assert_eq!(parsed.articles[0].body, "first body");
        assert_eq!(parsed.articles[1].ticker, "ACME");
        assert_eq!(parsed.articles[1].title, "Second");
        assert_eq!(parsed.articles[1].body, "second body");
    }

    #[test]
    fn preamble_before_first_header_is_ignored() {
        let dump = "run started\nTitle: orphan\n-----\nno ticker\n".to_string()
            + &block("ACME", "Real", "body");
        let parsed = parse_dump(&dump);
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].title, "Real");
    }

    #[test]
    fn malformed_date_is_kept_opaque() {
        let dump = block("ACME", "T", "b").replace("2024-05-01 09:30:00", "sometime last week");
        let parsed = parse_dump(&dump);
        assert_eq!(parsed.articles[0].published, "sometime last week");
        assert!(parse_timestamp(&parsed.articles[0].published).is_none());
    }

    #[test]
    fn parse_is_deterministic() {
        let dump: String = (0..3).map(|i| block("ACME", &format!("H{i}"), "b")).collect();
        assert_eq!(parse_dump(&dump).articles, parse_dump(&dump).articles);
    }

    #[test]
    fn parse_file_propagates_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_file(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn parse_file_reads_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        std::fs::write(&path, block("ACME", "Headline", "body")).unwrap();
        let parsed = parse_file(&path).unwrap();
        assert_eq!(parsed.articles.len(), 1);
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 09:30"), Some(expected));
        assert_eq!(
            parse_timestamp("Wed, 01 May 2024 09:30:00 +0000"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2024-05-01 15:00 IST"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("n/a").is_none());
    }

    #[test]
    fn age_hours_from_parseable_stamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let age = age_hours("2024-05-01 12:00:00", now).unwrap();
        assert!((age - 24.0).abs() < 1e-9);
        assert!(age_hours("yesterday-ish", now).is_none());
    }

    #[test]
    fn future_stamp_counts_as_fresh() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        assert_eq!(age_hours("2024-05-03 12:00:00", now), Some(0.0));
    }
}
