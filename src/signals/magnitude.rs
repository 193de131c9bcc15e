// =============================================================================
// Magnitude Normalizer — deal size in crore, absolute and relative to cap
// =============================================================================
//
// Conversion policy (one table for the whole deployment):
//
//   canonical unit          1 crore INR = 10,000,000 INR
//   crore / cr              1
//   lakh / lac              0.01
//   million / mn (INR)      0.1
//   billion / bn (INR)      100
//   bare rupee amount       amount / 1e7
//   USD ($, USD, US$)       converted to INR at USD_INR, then as above
//
// A number only counts as an amount when it carries a currency marker or a
// scale word. The largest amount in the text wins.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;

/// Rupees per US dollar.
pub const USD_INR: f64 = 83.0;

/// Absolute amounts saturate here (crore).
pub const ABS_SATURATION_CR: f64 = 5000.0;

/// Relative amounts saturate at this percentage of market cap.
pub const REL_SATURATION_PCT: f64 = 100.0;

const INR_PER_CRORE: f64 = 1e7;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?P<cur>₹|\brs\b\.?|\binr\b|\bus\$|\busd\b|\$)?",
        r"\s*(?P<num>\d[\d,]*(?:\.\d+)?)",
        r"\s*(?P<unit>crores?\b|cr\b|lakhs?\b|lacs?\b|million\b|mn\b|billion\b|bn\b)?",
    ))
    .expect("amount pattern is valid")
});

/// Crore per one unit of INR at the given scale word.
fn crore_per_unit(unit: Option<&str>) -> f64 {
    match unit.map(|u| u.to_ascii_lowercase()) {
        Some(u) if u.starts_with("crore") || u == "cr" => 1.0,
        Some(u) if u.starts_with("lakh") || u.starts_with("lac") => 0.01,
        Some(u) if u == "million" || u == "mn" => 0.1,
        Some(u) if u == "billion" || u == "bn" => 100.0,
        _ => 1.0 / INR_PER_CRORE,
    }
}

fn is_usd(marker: &str) -> bool {
    let m = marker.to_ascii_lowercase();
    m == "$" || m == "usd" || m == "us$"
}

/// Largest currency amount mentioned in `text`, in crore. 0 when none.
pub fn extract_amount_cr(text: &str) -> f64 {
    AMOUNT_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let currency = caps.name("cur").map(|m| m.as_str());
            let unit = caps.name("unit").map(|m| m.as_str());
            if currency.is_none() && unit.is_none() {
                return None;
            }
            let number: f64 = caps["num"].replace(',', "").parse().ok()?;
            let mut crore = number * crore_per_unit(unit);
            if currency.is_some_and(is_usd) {
                crore *= USD_INR;
            }
            Some(crore)
        })
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(0.0, f64::max)
}

/// Title amount when the title has one, otherwise the body's.
pub fn extract_article_amount_cr(title: &str, body: &str) -> f64 {
    let from_title = extract_amount_cr(title);
    if from_title > 0.0 {
        from_title
    } else {
        extract_amount_cr(body)
    }
}

fn log_normalize(value: f64, ceiling: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    ((1.0 + value).log10() / (1.0 + ceiling).log10()).clamp(0.0, 1.0)
}

/// Absolute deal size in [0, 1], saturating near ₹5000 cr.
pub fn normalize_abs(amount_cr: f64) -> f64 {
    log_normalize(amount_cr, ABS_SATURATION_CR)
}

/// Deal size as a share of market cap in [0, 1], saturating at 100% of cap.
/// Zero when the cap is unknown or non-positive.
pub fn normalize_relative(amount_cr: f64, market_cap_cr: f64) -> f64 {
    if !market_cap_cr.is_finite() || market_cap_cr <= 0.0 {
        return 0.0;
    }
    log_normalize(100.0 * amount_cr / market_cap_cr, REL_SATURATION_PCT)
}
