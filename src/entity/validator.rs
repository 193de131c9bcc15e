// =============================================================================
// Entity Validator — does this article really concern its ticker?
// =============================================================================
//
// Checks run in order; the first three are hard vetoes:
//   1. Unknown ticker                          → 0.0
//   2. Exclusion keyword anywhere in the text  → 0.0
//   3. Wrong-sector indicator for the sector   → 0.0
//   4. Positive evidence:
//        name/alias + keyword   → 1.0
//        name/alias only        → 0.8
//        keyword ratio >= 0.5   → 0.6
//        any keyword            → 0.3
//        nothing                → 0.0
//   5. Tickers of 3 characters or fewer: an unrelated-organisation word
//      within two words of the ticker in the headline voids step 4.
//
// Confidence 0 is final: downstream stages drop the article entirely.
// =============================================================================

use regex::Regex;
use tracing::debug;

use super::profile::EntityDb;

/// Tickers this short collide with ordinary words and other organisations.
const SHORT_TICKER_MAX_LEN: usize = 3;

/// Words either side of a short ticker that are inspected.
const COLLISION_WINDOW: usize = 2;

const UNRELATED_ORG_WORDS: &[&str] = &["alliance", "group", "foundation", "association"];

const CONF_NAME_AND_KEYWORDS: f64 = 1.0;
const CONF_NAME_ONLY: f64 = 0.8;
const CONF_KEYWORD_RATIO: f64 = 0.6;
const CONF_ANY_KEYWORD: f64 = 0.3;
const KEYWORD_RATIO_THRESHOLD: f64 = 0.5;

/// Why a confidence was assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationReason {
    UnknownTicker,
    ExclusionKeyword(String),
    WrongSector(String),
    TickerCollision(String),
    NameAndKeywords,
    NameOnly,
    KeywordRatio,
    AnyKeyword,
    NoEvidence,
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTicker => write!(f, "unknown ticker"),
            Self::ExclusionKeyword(k) => write!(f, "exclusion keyword '{k}'"),
            Self::WrongSector(k) => write!(f, "wrong-sector indicator '{k}'"),
            Self::TickerCollision(w) => {
                write!(f, "ticker next to unrelated organisation word '{w}'")
            }
            Self::NameAndKeywords => write!(f, "name and keywords"),
            Self::NameOnly => write!(f, "name only"),
            Self::KeywordRatio => write!(f, "keyword ratio"),
            Self::AnyKeyword => write!(f, "weak keyword match"),
            Self::NoEvidence => write!(f, "no entity evidence"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// In [0, 1]; zero excludes the article from every aggregate.
    pub confidence: f64,
    pub reason: ValidationReason,
}

impl Validation {
    fn reject(reason: ValidationReason) -> Self {
        Self {
            confidence: 0.0,
            reason,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.confidence <= 0.0
    }
}

/// `true` when `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters (or the string ends) on both sides. The needle is matched
/// literally.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let pattern = format!(
        r"(?:^|[^\p{{Alphabetic}}\p{{N}}]){}(?:$|[^\p{{Alphabetic}}\p{{N}}])",
        regex::escape(needle)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(haystack))
}

/// Validates articles against the entity DB.
pub struct EntityValidator<'a> {
    db: &'a EntityDb,
}

impl<'a> EntityValidator<'a> {
    pub fn new(db: &'a EntityDb) -> Self {
        Self { db }
    }

    pub fn validate(&self, ticker: &str, title: &str, body: &str) -> Validation {
        let Some(profile) = self.db.get(ticker) else {
            return Validation::reject(ValidationReason::UnknownTicker);
        };

        let text = format!("{} {}", title, body).to_lowercase();

        // ── 1. Hard exclusion ────────────────────────────────────────────
        if let Some(k) = profile
            .exclusion_keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
        {
            debug!(ticker, keyword = %k, "entity veto: exclusion keyword");
            return Validation::reject(ValidationReason::ExclusionKeyword(k.clone()));
        }

        // ── 2. Wrong sector ──────────────────────────────────────────────
        if let Some(k) = self
            .db
            .wrong_sector_indicators_for(profile)
            .iter()
            .find(|k| text.contains(k.as_str()))
        {
            debug!(ticker, indicator = %k, "entity veto: wrong sector");
            return Validation::reject(ValidationReason::WrongSector(k.clone()));
        }

        // ── 3. Positive evidence ─────────────────────────────────────────
        let full_name = profile.full_name.to_lowercase();
        let name_hit = contains_phrase(&text, full_name.trim())
            || profile.aliases.iter().any(|a| contains_phrase(&text, a));

        let keywords = self.db.keywords_for(profile);
        let keyword_hits = keywords
            .iter()
            .filter(|k| contains_phrase(&text, k))
            .count();
        let ratio = if keywords.is_empty() {
            0.0
        } else {
            keyword_hits as f64 / keywords.len() as f64
        };

        let (confidence, reason) = if name_hit && keyword_hits > 0 {
            (CONF_NAME_AND_KEYWORDS, ValidationReason::NameAndKeywords)
        } else if name_hit {
            (CONF_NAME_ONLY, ValidationReason::NameOnly)
        } else if ratio >= KEYWORD_RATIO_THRESHOLD {
            (CONF_KEYWORD_RATIO, ValidationReason::KeywordRatio)
        } else if keyword_hits > 0 {
            (CONF_ANY_KEYWORD, ValidationReason::AnyKeyword)
        } else {
            return Validation::reject(ValidationReason::NoEvidence);
        };

        // ── 4. Short-ticker collision window ─────────────────────────────
        if profile.ticker.chars().count() <= SHORT_TICKER_MAX_LEN {
            if let Some(word) = self.collision_word(&profile.ticker, title) {
                debug!(ticker, word = %word, "entity veto: short ticker collision");
                return Validation::reject(ValidationReason::TickerCollision(word));
            }
        }

        Validation { confidence, reason }
    }

    /// First unrelated-organisation word within the window around any
    /// standalone occurrence of `ticker` in `title`. Words are split on
    /// every non-alphanumeric character, so "TI-Alliance" is two words.
    fn collision_word(&self, ticker: &str, title: &str) -> Option<String> {
        let words: Vec<&str> = title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        for (i, word) in words.iter().enumerate() {
            if !word.eq_ignore_ascii_case(ticker) {
                continue;
            }
            let lo = i.saturating_sub(COLLISION_WINDOW);
            let hi = (i + COLLISION_WINDOW).min(words.len().saturating_sub(1));
            for neighbour in &words[lo..=hi] {
                let lower = neighbour.to_lowercase();
                if UNRELATED_ORG_WORDS.contains(&lower.as_str()) {
                    return Some(lower);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> EntityDb {
        EntityDb::from_json(
            r#"{
            "entities": {
                "TI": {
                    "full_name": "Tilaknagar Industries",
                    "sector": "beverages",
                    "keywords": ["alcohol", "liquor", "brandy", "beverage"],
                    "exclusion_keywords": ["tide", "fintech"],
                    "aliases": ["tilaknagar"]
                },
                "ACME": {
                    "full_name": "Acme Power Limited",
                    "sector": "power",
                    "keywords": ["solar", "wind", "renewable", "transmission"],
                    "exclusion_keywords": [],
                    "aliases": ["acme"]
                }
            },
            "sector_keywords": { "power": ["megawatt"] },
            "wrong_sector_indicators": { "power": ["cricket league"] }
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn unknown_ticker_rejected() {
        let db = db();
        let v = EntityValidator::new(&db).validate("ZZZ", "anything", "at all");
        assert_eq!(v.confidence, 0.0);
        assert_eq!(v.reason, ValidationReason::UnknownTicker);
    }

    #[test]
    fn tide_fintech_is_vetoed_for_ti() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "TI",
            "Tide fintech raises $120 million",
            "fintech startup digital payments",
        );
        assert_eq!(v.confidence, 0.0);
        assert!(matches!(v.reason, ValidationReason::ExclusionKeyword(_)));
    }

    #[test]
    fn tilaknagar_results_accepted() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "TI",
            "Tilaknagar Industries Q2 results",
            "alcohol beverage sales revenue",
        );
        assert!(v.confidence >= 0.8);
        assert_eq!(v.reason, ValidationReason::NameAndKeywords);
    }

    #[test]
    fn exclusion_beats_any_amount_of_positive_evidence() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "TI",
            "Tilaknagar Industries liquor brandy alcohol beverage",
            "Tilaknagar also partners with Tide",
        );
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn wrong_sector_indicator_vetoes() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "ACME",
            "Acme Power Limited sponsors cricket league",
            "solar",
        );
        assert_eq!(v.confidence, 0.0);
        assert!(matches!(v.reason, ValidationReason::WrongSector(_)));
    }

    #[test]
    fn evidence_ladder() {
        let db = db();
        let val = EntityValidator::new(&db);
        let name_only = val.validate("ACME", "Acme Power Limited news", "nothing else");
        assert!((name_only.confidence - 0.8).abs() < 1e-12);
        // Ratio 3/5 >= 0.5.
        let ratio = val.validate("ACME", "Grid update", "solar wind renewable");
        assert!((ratio.confidence - 0.6).abs() < 1e-12);
        // One keyword of five.
        let weak = val.validate("ACME", "Grid update", "solar only");
        assert!((weak.confidence - 0.3).abs() < 1e-12);
        let nothing = val.validate("ACME", "Grid update", "no match");
        assert_eq!(nothing.confidence, 0.0);
    }

    #[test]
    fn short_ticker_next_to_org_word_is_voided() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "TI",
            "TI Alliance announces liquor expansion",
            "Tilaknagar beverage",
        );
        assert_eq!(v.confidence, 0.0);
        assert_eq!(
            v.reason,
            ValidationReason::TickerCollision("alliance".into())
        );
    }

    #[test]
    fn hyphenated_org_word_is_still_a_collision() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "TI",
            "TI-Alliance announces liquor expansion",
            "Tilaknagar beverage",
        );
        assert_eq!(v.confidence, 0.0);
        assert_eq!(
            v.reason,
            ValidationReason::TickerCollision("alliance".into())
        );
    }

    #[test]
    fn short_ticker_window_is_two_words() {
        let db = db();
        let v = EntityValidator::new(&db).validate(
            "TI",
            "TI shares rise after liquor group deal",
            "Tilaknagar beverage",
        );
        assert!(v.confidence > 0.0);
    }

    #[test]
    fn phrase_matching_respects_word_boundaries() {
        assert!(contains_phrase("acme wins order", "acme"));
        assert!(!contains_phrase("acmeco wins", "acme"));
        assert!(contains_phrase("order (acme).", "acme"));
        assert!(!contains_phrase("team tea", "teas"));
        assert!(contains_phrase("team tea", "tea"));
    }

    #[test]
    fn phrase_is_matched_literally() {
        assert!(contains_phrase("l&t bags order", "l&t"));
        assert!(contains_phrase("acme ltd. wins", "acme ltd."));
        assert!(!contains_phrase("acme ltdx wins", "acme ltd."));
        assert!(!contains_phrase("acmexpower", "acme.power"));
        assert!(contains_phrase("acme.power", "acme.power"));
        assert!(!contains_phrase("anything", ""));
    }
}
