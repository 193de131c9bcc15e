// =============================================================================
// Event Classifier — ordered, first-match-wins headline classification
// =============================================================================
//
// The rule table order IS the contract: a headline matching two groups gets
// whichever group comes first. General is the fallback when nothing matches.
//
//   IPO/listing     0.65
//   M&A/JV          0.70
//   Order/contract  0.80
//   Regulatory      0.75
//   Block deal      0.45
//   Dividend/return 0.50
//   Results/metrics 0.55
//   Management      0.40
//   General         0.35
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// Event categories, in classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    IpoListing,
    MergerAcquisition,
    OrderContract,
    Regulatory,
    BlockDeal,
    Dividend,
    Results,
    Management,
    General,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::IpoListing => "IPO/listing",
            Self::MergerAcquisition => "M&A/JV",
            Self::OrderContract => "Order/contract",
            Self::Regulatory => "Regulatory",
            Self::BlockDeal => "Block deal",
            Self::Dividend => "Dividend/return",
            Self::Results => "Results/metrics",
            Self::Management => "Management",
            Self::General => "General",
        }
    }

    /// Baseline weight of the category.
    pub fn baseline(&self) -> f64 {
        match self {
            Self::IpoListing => 0.65,
            Self::MergerAcquisition => 0.70,
            Self::OrderContract => 0.80,
            Self::Regulatory => 0.75,
            Self::BlockDeal => 0.45,
            Self::Dividend => 0.50,
            Self::Results => 0.55,
            Self::Management => 0.40,
            Self::General => 0.35,
        }
    }

    /// Categories the Best-Buy-Today gate does not flag.
    pub fn is_priority(&self) -> bool {
        matches!(self, Self::OrderContract | Self::IpoListing | Self::Regulatory)
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One row of the ordered rule table.
pub struct EventRule {
    pub event: EventType,
    pub weight: f64,
    pub pattern: Regex,
}

fn rule(event: EventType, pattern: &str) -> EventRule {
    EventRule {
        event,
        weight: event.baseline(),
        pattern: Regex::new(pattern).expect("event rule patterns are valid regexes"),
    }
}

pub static EVENT_RULES: LazyLock<Vec<EventRule>> = LazyLock::new(|| {
    vec![
        rule(
            EventType::IpoListing,
            r"\b(?:ipo|listing|lists on|debuts?|drhp|public issue|sme issue)\b",
        ),
        rule(
            EventType::MergerAcquisition,
            concat!(
                r"\b(?:acquires?|acquired|acquisition|mergers?|merges?|amalgamation",
                r"|takeover|joint venture|jv|buys? stake|stake in)\b",
            ),
        ),
        rule(
            EventType::OrderContract,
            concat!(
                r"\b(?:orders?|contracts?|loa|letter of (?:award|intent)|tenders?",
                r"|bags?|bagged|wins?|won|secures?|secured)\b",
            ),
        ),
        rule(
            EventType::Regulatory,
            concat!(
                r"\b(?:approvals?|approves?|approved|nod|clearance|licen[cs]e[ds]?",
                r"|sebi|rbi|usfda|fda|cdsco|regulator|ministry|government)\b",
            ),
        ),
        rule(
            EventType::BlockDeal,
            r"\b(?:block deals?|bulk deals?|block trade|offer for sale|ofs)\b",
        ),
        rule(
            EventType::Dividend,
            r"\b(?:dividend|buyback|buy-back|bonus issue|stock split|record date)\b",
        ),
        rule(
            EventType::Results,
            concat!(
                r"\b(?:results?|profit|revenue|earnings|ebitda|margins?|q[1-4]",
                r"|quarter(?:ly)?|guidance)\b",
            ),
        ),
        rule(
            EventType::Management,
            concat!(
                r"\b(?:ceo|cfo|coo|md|chairman|chairperson|appoints?|appointed",
                r"|resigns?|resignation|board)\b",
            ),
        ),
    ]
});

/// Classify a headline. First matching rule wins; General otherwise.
pub fn classify(title: &str) -> EventType {
    classify_with_weight(title).0
}

/// Classification plus the rule weight that produced it.
pub fn classify_with_weight(title: &str) -> (EventType, f64) {
    let lower = title.to_lowercase();
    EVENT_RULES
        .iter()
        .find(|r| r.pattern.is_match(&lower))
        .map(|r| (r.event, r.weight))
        .unwrap_or((EventType::General, EventType::General.baseline()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_headline() {
        let title = "ACME wins ₹1,200 crore order from Ministry of Power";
        let (event, weight) = classify_with_weight(title);
        assert_eq!(event, EventType::OrderContract);
        assert!((weight - 0.8).abs() < f64::EPSILON);
        assert_eq!(event.label(), "Order/contract");
    }

    #[test]
    fn first_match_wins() {
        // Matches both IPO and Regulatory: IPO is checked first.
        assert_eq!(classify("SEBI approves ACME IPO"), EventType::IpoListing);
        // Matches both M&A and Order: M&A is checked first.
        assert_eq!(
            classify("ACME acquires rival, wins contract"),
            EventType::MergerAcquisition
        );
        // Matches Regulatory and Results: Regulatory first.
        assert_eq!(
            classify("USFDA nod lifts Q2 profit outlook"),
            EventType::Regulatory
        );
    }

    #[test]
    fn each_category_reachable() {
        assert_eq!(
            classify("Promoter sells 2% via block deal"),
            EventType::BlockDeal
        );
        assert_eq!(
            classify("ACME declares interim dividend"),
            EventType::Dividend
        );
        assert_eq!(
            classify("ACME Q3 results: revenue up 12%"),
            EventType::Results
        );
        assert_eq!(classify("ACME appoints new CEO"), EventType::Management);
        assert_eq!(classify("ACME shares trade flat"), EventType::General);
    }

    #[test]
    fn rule_table_order_is_fixed() {
        let order: Vec<EventType> = EVENT_RULES.iter().map(|r| r.event).collect();
        assert_eq!(
            order,
            vec![
                EventType::IpoListing,
                EventType::MergerAcquisition,
                EventType::OrderContract,
                EventType::Regulatory,
                EventType::BlockDeal,
                EventType::Dividend,
                EventType::Results,
                EventType::Management,
            ]
        );
    }

    #[test]
    fn priority_events() {
        assert!(EventType::OrderContract.is_priority());
        assert!(EventType::IpoListing.is_priority());
        assert!(EventType::Regulatory.is_priority());
        assert!(!EventType::Results.is_priority());
        assert!(!EventType::General.is_priority());
    }

    #[test]
    fn serialises_as_label() {
        let json = serde_json::to_string(&EventType::MergerAcquisition).unwrap();
        assert_eq!(json, "\"M&A/JV\"");
    }
}
