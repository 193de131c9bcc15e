// =============================================================================
// Entity Profiles — who each ticker actually is
// =============================================================================
//
// Loaded once from the entity DB JSON:
//
//   { "entities": { TICKER: { full_name, sector, business_type, keywords,
//                             exclusion_keywords, aliases, market_cap_cr } },
//     "sector_keywords": { sector: [..] },
//     "wrong_sector_indicators": { sector: [..] } }
//
// Tickers are upper-cased and every keyword list lower-cased on load so the
// validator can match against lower-cased text directly.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Read-only description of one listed company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Filled from the map key on load.
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub exclusion_keywords: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Market capitalisation in crore, when known offline.
    #[serde(default)]
    pub market_cap_cr: Option<f64>,
}

/// The whole entity database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDb {
    #[serde(default)]
    pub entities: HashMap<String, EntityProfile>,
    #[serde(default)]
    pub sector_keywords: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub wrong_sector_indicators: HashMap<String, Vec<String>>,
}

fn lower_all(items: &mut Vec<String>) {
    for item in items.iter_mut() {
        *item = item.trim().to_lowercase();
    }
    items.retain(|s| !s.is_empty());
}

impl EntityDb {
    /// Parse and normalise an entity DB from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Self = serde_json::from_str(json).context("failed to parse entity DB JSON")?;
        Ok(raw.normalized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read entity DB from {}", path.display()))?;
        let db = Self::from_json(&content)
            .with_context(|| format!("invalid entity DB at {}", path.display()))?;
        info!(path = %path.display(), entities = db.entities.len(), "entity DB loaded");
        Ok(db)
    }

    /// Load, falling back to an empty DB. With no profiles every ticker is
    /// unknown and nothing will be ranked, so this warns loudly.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "entity DB unavailable — every ticker will be rejected as unknown");
            Self::default()
        })
    }

    fn normalized(self) -> Self {
        let entities = self
            .entities
            .into_iter()
            .map(|(ticker, mut profile)| {
                let ticker = ticker.trim().to_uppercase();
                profile.ticker = ticker.clone();
                lower_all(&mut profile.keywords);
                lower_all(&mut profile.exclusion_keywords);
                lower_all(&mut profile.aliases);
                (ticker, profile)
            })
            .collect();

        let lower_map = |map: HashMap<String, Vec<String>>| {
            map.into_iter()
                .map(|(sector, mut words)| {
                    lower_all(&mut words);
                    (sector.trim().to_lowercase(), words)
                })
                .collect::<HashMap<_, _>>()
        };

        Self {
            entities,
            sector_keywords: lower_map(self.sector_keywords),
            wrong_sector_indicators: lower_map(self.wrong_sector_indicators),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&EntityProfile> {
        self.entities.get(&ticker.trim().to_uppercase())
    }

    /// Entity keywords plus the shared keywords of its sector, deduplicated.
    pub fn keywords_for(&self, profile: &EntityProfile) -> Vec<String> {
        let mut out = profile.keywords.clone();
        if let Some(shared) = self.sector_keywords.get(&profile.sector.to_lowercase()) {
            for kw in shared {
                if !out.contains(kw) {
                    out.push(kw.clone());
                }
            }
        }
        out
    }

    pub fn wrong_sector_indicators_for(&self, profile: &EntityProfile) -> &[String] {
        self.wrong_sector_indicators
            .get(&profile.sector.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn market_cap_cr(&self, ticker: &str) -> Option<f64> {
        self.get(ticker)
            .and_then(|p| p.market_cap_cr)
            .filter(|cap| *cap > 0.0)
    }
}
