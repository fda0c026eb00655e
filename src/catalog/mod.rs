//! Intent catalog
//!
//! Immutable registry of intent definitions plus the instrument, index and
//! market dictionaries used during parameter extraction. Built once at
//! startup and shared read-only by every stage.

use crate::error::RouterError;
use crate::models::{Endpoint, IntentDefinition};
use crate::Result;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub mod defaults;

/// Case-fold only
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Case-fold and drop all whitespace
pub fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Ordered name → code dictionary with case-normalized keys
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: Vec<(String, String)>,
}

impl LookupTable {
    pub fn new<N, C>(table: &'static str, entries: impl IntoIterator<Item = (N, C)>) -> Result<Self>
    where
        N: AsRef<str>,
        C: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut normalized = Vec::new();

        for (name, code) in entries {
            let key = normalize(name.as_ref().trim());
            let code = code.into();

            if key.is_empty() || code.trim().is_empty() {
                return Err(RouterError::InvalidCatalog(format!(
                    "empty name or code in {} dictionary",
                    table
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(RouterError::DuplicateLookupKey { table, key });
            }

            normalized.push((key, code));
        }

        Ok(Self { entries: normalized })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let key = normalize(name.trim());
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, code)| code.as_str())
    }

    /// Entries in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IntentCatalog {
    intents: Vec<IntentDefinition>,
    by_id: HashMap<String, usize>,
    tickers: LookupTable,
    indices: LookupTable,
    markets: LookupTable,
}

impl IntentCatalog {
    /// Validates and freezes a catalog. Fails on duplicate ids, empty ids
    /// or intents without keywords.
    pub fn new(
        intents: Vec<IntentDefinition>,
        tickers: LookupTable,
        indices: LookupTable,
        markets: LookupTable,
    ) -> Result<Self> {
        if intents.is_empty() {
            return Err(RouterError::InvalidCatalog(
                "catalog defines no intents".to_string(),
            ));
        }

        let mut by_id = HashMap::with_capacity(intents.len());

        for (position, intent) in intents.iter().enumerate() {
            if intent.id.trim().is_empty() {
                return Err(RouterError::InvalidCatalog(format!(
                    "intent #{} has an empty id",
                    position
                )));
            }
            if intent.id == crate::models::UNKNOWN_INTENT {
                return Err(RouterError::InvalidCatalog(
                    "'unknown' is reserved".to_string(),
                ));
            }
            if intent.keywords.iter().all(|kw| compact(kw).is_empty()) {
                return Err(RouterError::InvalidCatalog(format!(
                    "intent '{}' has no keywords",
                    intent.id
                )));
            }
            if by_id.insert(intent.id.clone(), position).is_some() {
                return Err(RouterError::DuplicateIntent(intent.id.clone()));
            }
        }

        Ok(Self {
            intents,
            by_id,
            tickers,
            indices,
            markets,
        })
    }

    /// Built-in KRX catalog
    pub fn krx() -> Result<Self> {
        defaults::krx_catalog()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        file.into_catalog()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn get(&self, id: &str) -> Option<&IntentDefinition> {
        self.by_id.get(id).map(|&i| &self.intents[i])
    }

    /// Like `get`, but a missing id is an error
    pub fn require(&self, id: &str) -> Result<&IntentDefinition> {
        self.get(id)
            .ok_or_else(|| RouterError::UnknownIntent(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Definitions in catalog order
    pub fn intents(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn tickers(&self) -> &LookupTable {
        &self.tickers
    }

    pub fn indices(&self) -> &LookupTable {
        &self.indices
    }

    pub fn markets(&self) -> &LookupTable {
        &self.markets
    }

    pub fn ticker_code(&self, name: &str) -> Option<&str> {
        self.tickers.get(name)
    }

    pub fn index_code(&self, name: &str) -> Option<&str> {
        self.indices.get(name)
    }

    pub fn market_code(&self, name: &str) -> Option<&str> {
        self.markets.get(name)
    }
}

//
// ================= Catalog file =================
//

#[derive(Debug, Deserialize)]
struct CatalogFile {
    intents: Vec<IntentEntry>,
    #[serde(default)]
    tickers: Vec<(String, String)>,
    #[serde(default)]
    indices: Vec<(String, String)>,
    #[serde(default)]
    markets: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct IntentEntry {
    id: String,
    keywords: Vec<String>,
    endpoint: String,
    #[serde(default)]
    requires_login: bool,
    #[serde(default)]
    parameters: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    examples: Vec<String>,
}

impl CatalogFile {
    fn into_catalog(self) -> Result<IntentCatalog> {
        let intents = self
            .intents
            .into_iter()
            .map(|entry| IntentDefinition {
                id: entry.id,
                keywords: entry.keywords,
                endpoint: Endpoint::parse(&entry.endpoint),
                requires_login: entry.requires_login,
                parameters: entry.parameters,
                description: entry.description,
                examples: entry.examples,
            })
            .collect();

        IntentCatalog::new(
            intents,
            LookupTable::new("ticker", self.tickers)?,
            LookupTable::new("index", self.indices)?,
            LookupTable::new("market", self.markets)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(id: &str, keywords: &[&str]) -> IntentDefinition {
        IntentDefinition {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            endpoint: Endpoint::Path(format!("/api/{}", id)),
            requires_login: false,
            parameters: vec![],
            description: String::new(),
            examples: vec![],
        }
    }

    #[test]
    fn test_duplicate_intent_rejected() {
        let result = IntentCatalog::new(
            vec![intent("a", &["x"]), intent("a", &["y"])],
            LookupTable::default(),
            LookupTable::default(),
            LookupTable::default(),
        );
        assert!(matches!(result, Err(RouterError::DuplicateIntent(id)) if id == "a"));
    }

    #[test]
    fn test_intent_without_keywords_rejected() {
        let result = IntentCatalog::new(
            vec![intent("a", &[" "])],
            LookupTable::default(),
            LookupTable::default(),
            LookupTable::default(),
        );
        assert!(matches!(result, Err(RouterError::InvalidCatalog(_))));
    }

    #[test]
    fn test_lookup_keys_case_normalized() {
        let table = LookupTable::new("ticker", [("SK하이닉스", "000660")]).unwrap();
        assert_eq!(table.get("sk하이닉스"), Some("000660"));
        assert_eq!(table.get("SK하이닉스"), Some("000660"));

        let dup = LookupTable::new("ticker", [("LG", "1"), ("lg", "2")]);
        assert!(matches!(dup, Err(RouterError::DuplicateLookupKey { .. })));
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{
            "intents": [
                {"id": "price", "keywords": ["price"], "endpoint": "/api/price",
                 "parameters": ["ticker"], "description": "quote"},
                {"id": "report", "keywords": ["report"], "endpoint": "MULTI",
                 "requires_login": true}
            ],
            "tickers": [["Acme", "0001"]],
            "markets": [["nasdaq", "NASDAQ"]]
        }"#;

        let catalog = IntentCatalog::from_json(raw).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("report").unwrap().endpoint, Endpoint::Multi);
        assert!(catalog.get("report").unwrap().requires_login);
        assert_eq!(catalog.ticker_code("acme"), Some("0001"));
        assert!(catalog.indices().is_empty());
        assert!(!catalog.contains("unknown"));
        assert!(matches!(
            catalog.require("weather"),
            Err(RouterError::UnknownIntent(id)) if id == "weather"
        ));
    }

    #[test]
    fn test_compact_strips_whitespace() {
        assert_eq!(compact("외국인 보유율"), "외국인보유율");
        assert_eq!(compact(" ETF 가격 "), "etf가격");
    }
}
