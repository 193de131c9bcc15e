// =============================================================================
// Quote Client — optional live price/volume for the Timing factor
// =============================================================================
//
// GET {base_url}/{TICKER} → { "pct_change", "volume_ratio", "market_cap_cr" }
//
// Every field is optional and may arrive as a number or a numeric string.
// A failed or malformed ticker is logged and left out of the snapshot; the
// ranking pipeline then uses heuristic Timing for it.
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Per-request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Quotes fetched concurrently.
const MAX_IN_FLIGHT: usize = 8;

/// Live market figures for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveQuote {
    /// Today's price change in percent.
    pub pct_change: Option<f64>,
    /// Today's volume over the 20-day average.
    pub volume_ratio: Option<f64>,
    pub market_cap_cr: Option<f64>,
}

impl LiveQuote {
    pub fn is_empty(&self) -> bool {
        self.pct_change.is_none() && self.volume_ratio.is_none() && self.market_cap_cr.is_none()
    }
}

/// Ticker → quote. Missing tickers mean "no market data".
pub type MarketSnapshot = HashMap<String, LiveQuote>;

#[derive(Clone)]
pub struct QuoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl QuoteClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        debug!(base_url = %base_url, "QuoteClient initialised");
        Ok(Self { base_url, client })
    }

    /// GET one quote.
    #[instrument(skip(self), name = "quotes::get_quote")]
    pub async fn get_quote(&self, ticker: &str) -> Result<LiveQuote> {
        let url = format!("{}/{}", self.base_url, ticker);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET quote for {ticker} failed"))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse quote response for {ticker}"))?;

        if !status.is_success() {
            anyhow::bail!("quote endpoint returned {status} for {ticker}: {body}");
        }

        decode_quote(&body)
    }

    /// Fetch quotes for every ticker with bounded concurrency. Never fails as
    /// a whole: per-ticker errors are logged and the ticker is left out.
    pub async fn fetch(&self, tickers: &[String]) -> MarketSnapshot {
        let results: Vec<(String, Result<LiveQuote>)> = stream::iter(tickers.iter().cloned())
            .map(|ticker| async move {
                let quote = self.get_quote(&ticker).await;
                (ticker, quote)
            })
            .buffer_unordered(MAX_IN_FLIGHT)
            .collect()
            .await;

        let mut snapshot = MarketSnapshot::new();
        for (ticker, result) in results {
            match result {
                Ok(quote) if !quote.is_empty() => {
                    snapshot.insert(ticker, quote);
                }
                Ok(_) => debug!(ticker = %ticker, "quote carried no usable fields"),
                Err(e) => warn!(ticker = %ticker, error = %e, "market data unavailable"),
            }
        }

        info!(
            requested = tickers.len(),
            received = snapshot.len(),
            "market snapshot fetched"
        );
        snapshot
    }
}

impl std::fmt::Debug for QuoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Read a JSON value that may be a number or a numeric string.
fn parse_num(val: &Value) -> Option<f64> {
    let n = match val {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Decode a quote body. Must be a JSON object; unknown fields are ignored.
pub fn decode_quote(body: &Value) -> Result<LiveQuote> {
    let obj = body.as_object().context("quote response is not an object")?;
    Ok(LiveQuote {
        pct_change: obj.get("pct_change").and_then(parse_num),
        volume_ratio: obj.get("volume_ratio").and_then(parse_num),
        market_cap_cr: obj
            .get("market_cap_cr")
            .and_then(parse_num)
            .filter(|cap| *cap > 0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_numbers_and_strings() {
        let q = decode_quote(&json!({
            "pct_change": "1.75",
            "volume_ratio": 2.4,
            "market_cap_cr": "10000"
        }))
        .unwrap();
        assert_eq!(q.pct_change, Some(1.75));
        assert_eq!(q.volume_ratio, Some(2.4));
        assert_eq!(q.market_cap_cr, Some(10_000.0));
    }

    #[test]
    fn missing_and_junk_fields_are_absent() {
        let q = decode_quote(&json!({ "pct_change": "n/a", "extra": true })).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn percent_suffix_is_tolerated() {
        let q = decode_quote(&json!({ "pct_change": "-0.8%" })).unwrap();
        assert_eq!(q.pct_change, Some(-0.8));
    }

    #[test]
    fn non_positive_cap_is_dropped() {
        let q = decode_quote(&json!({ "market_cap_cr": 0 })).unwrap();
        assert_eq!(q.market_cap_cr, None);
    }

    #[test]
    fn non_object_body_is_an_error() {
        assert!(decode_quote(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let c = QuoteClient::new("http://localhost:9000/quotes/").unwrap();
        assert_eq!(c.base_url, "http://localhost:9000/quotes");
    }
}
