// =============================================================================
// Pattern Tables — compiled once, shared by every scoring strategy
// =============================================================================
//
// All patterns run against lower-cased text. Each positive/negative group
// counts at most once per article no matter how often it matches.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("pattern table entries are valid regexes")
}

/// Currency token as it may follow an investment verb.
const CURRENCY_TOKEN: &str =
    r"(?:₹|\brs\b\.?|\binr\b|\$|\busd\b|\bcrores?\b|\bcr\b|\bbillion\b|\bmillion\b|\blakhs?\b)";

const INVESTMENT_VERB: &str = r"\b(?:invests?|investment|investing|capex|to spend|outlay)\b";

pub static POSITIVE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "order",
            compile(concat!(
                r"\b(?:orders?|contracts?|loa|letter of (?:award|intent)|work order|tenders?",
                r"|bags?|bagged|wins?|won|secures?|secured)\b",
            )),
        ),
        (
            "m&a",
            compile(concat!(
                r"\b(?:acquires?|acquired|acquisition|mergers?|merges?|amalgamation|takeover",
                r"|joint venture|jv|stake (?:in|buy|purchase))\b",
            )),
        ),
        (
            "ipo",
            compile(r"\b(?:ipo|listing|lists|listed|debut|drhp|public issue|sme issue)\b"),
        ),
        (
            "approval",
            compile(concat!(
                r"\b(?:approvals?|approves?|approved|nod|clearance|licen[cs]e[ds]?",
                r"|usfda|anda|permit)\b",
            )),
        ),
        (
            "capacity",
            compile(concat!(
                r"\b(?:capacity|commission(?:s|ed|ing)?|expansion|new plant",
                r"|production start)\b",
            )),
        ),
        (
            "profit",
            compile(concat!(
                r"\b(?:net profit|profit (?:rises?|jumps?|surges?|up|grows?|doubles?)",
                r"|margins? (?:expand|improve)s?|beats? (?:estimates|expectations)",
                r"|(?:raises|upgrades) guidance|guidance (?:raised|upgrade)",
                r"|record (?:revenue|profit|sales)|revenue (?:rises?|jumps?|grows?|up)",
                r"|q[1-4] (?:results|earnings)|(?:quarterly|annual) (?:results|earnings)",
                r"|results|earnings)\b",
            )),
        ),
        (
            "investment",
            compile(&format!(r"{INVESTMENT_VERB}[^.]{{0,60}}?{CURRENCY_TOKEN}")),
        ),
    ]
});

pub static NEGATIVE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "downgrade",
            compile(concat!(
                r"\b(?:downgrades?|downgraded|cuts? (?:target|rating)|sell rating",
                r"|underweight)\b",
            )),
        ),
        (
            "loss",
            compile(concat!(
                r"\b(?:loss|losses|loss-making",
                r"|profit (?:falls?|drops?|declines?|slumps?|down))\b",
            )),
        ),
        (
            "penalty",
            compile(concat!(
                r"\b(?:penalty|penalised|penalized|fined|fraud|probe|investigation|raid",
                r"|scam|show cause)\b",
            )),
        ),
        (
            "incident",
            compile(r"\b(?:strike|accident|fire|explosion|blast|lockout)\b"),
        ),
        (
            "delay",
            compile(r"\b(?:delay|delays|delayed|postpone[ds]?|deferred|halts?|halted)\b"),
        ),
    ]
});

pub static CAPACITY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b\d+(?:[.,]\d+)?\s*(?:mw|gw|mwp|gwp|mwh|gwh)\b"));

pub static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| compile(CURRENCY_TOKEN));

pub static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\d+(?:\.\d+)?\s*(?:%|per ?cent\b)"));

pub static FUND_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\bfunds?\b"));

pub static FUND_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"\b(?:company|companies|firm|industry|sector|plant|business|manufactur\w*",
        r"|revenue|operations)\b",
    ))
});

pub static INSTITUTIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"\b(?:fiis?|fpis?|diis?|qibs?|anchor (?:investors?|book|allotment)",
        r"|block deals?|bulk deals?)\b",
    ))
});

pub static UPPER_CIRCUIT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\bupper circuit\b"));

pub static LOWER_CIRCUIT_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\blower circuit\b"));

pub static LISTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"\b(?:stocks? to (?:watch|buy)|shares to watch|live updates?|live blog",
        r"|stock market live|market live|stocks in (?:news|focus)|buzzing stocks",
        r"|top (?:gainers|losers)|trending stocks|hot stocks|market wrap",
        r"|closing bell|opening bell)\b",
    ))
});

/// Body length above which a small completeness bonus applies.
pub const LONG_BODY_WORDS: usize = 300;

/// `true` for low-information aggregator / ticker-tape headlines.
pub fn is_listicle(title: &str) -> bool {
    LISTICLE_RE.is_match(&title.to_lowercase())
}

/// Cues pulled out of one article, independent of any weighting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextFeatures {
    pub positive_hits: Vec<&'static str>,
    pub negative_hits: Vec<&'static str>,
    pub has_capacity: bool,
    pub has_currency: bool,
    pub has_percentage: bool,
    pub long_body: bool,
    /// "fund(s)" mentioned with no company/industry context.
    pub bare_fund_mention: bool,
    pub institutional: bool,
    pub upper_circuit: bool,
    pub lower_circuit: bool,
    pub listicle: bool,
}

impl TextFeatures {
    pub fn extract(title: &str, body: &str) -> Self {
        let text = format!("{} {}", title, body).to_lowercase();

        let positive_hits = POSITIVE_PATTERNS
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(label, _)| *label)
            .collect();
        let negative_hits = NEGATIVE_PATTERNS
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(label, _)| *label)
            .collect();

        Self {
            positive_hits,
            negative_hits,
            has_capacity: CAPACITY_RE.is_match(&text),
            has_currency: CURRENCY_RE.is_match(&text),
            has_percentage: PERCENT_RE.is_match(&text),
            long_body: body.split_whitespace().count() > LONG_BODY_WORDS,
            bare_fund_mention: FUND_RE.is_match(&text) && !FUND_CONTEXT_RE.is_match(&text),
            institutional: INSTITUTIONAL_RE.is_match(&text),
            upper_circuit: UPPER_CIRCUIT_RE.is_match(&text),
            lower_circuit: LOWER_CIRCUIT_RE.is_match(&text),
            listicle: is_listicle(title),
        }
    }

    /// Capacity figure or percentage present.
    pub fn quantitative(&self) -> bool {
        self.has_capacity || self.has_percentage
    }
}
