//! Keyword matcher (stage 1)
//!
//! Deterministic substring scoring over every catalog intent:
//! `score = (hits / keywords) * (1 + hits * bonus)`, highest score wins,
//! ties go to more hits, then to catalog order.

use crate::catalog::{compact, IntentCatalog};
use crate::config::KeywordScoring;
use crate::extractor::ParameterExtractor;
use crate::models::{ClassificationMethod, ClassificationResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Intent position in the catalog with its compacted keywords
struct IntentKeywords {
    intent_id: String,
    keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordScore {
    pub score: f64,
    pub hits: usize,
}

pub struct KeywordMatcher {
    catalog: Arc<IntentCatalog>,
    extractor: ParameterExtractor,
    scoring: KeywordScoring,
    table: Vec<IntentKeywords>,
}

impl KeywordMatcher {
    pub fn new(catalog: Arc<IntentCatalog>, scoring: KeywordScoring) -> Self {
        let table = catalog
            .intents()
            .map(|intent| IntentKeywords {
                intent_id: intent.id.clone(),
                keywords: intent
                    .keywords
                    .iter()
                    .map(|kw| compact(kw))
                    .filter(|kw| !kw.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            extractor: ParameterExtractor::new(catalog.clone()),
            catalog,
            scoring,
            table,
        }
    }

    /// Score one intent's keyword list against a compacted query
    pub fn score(&self, compacted_query: &str, keywords: &[String]) -> Option<KeywordScore> {
        let hits = keywords
            .iter()
            .filter(|kw| compacted_query.contains(kw.as_str()))
            .count();

        if hits == 0 || keywords.is_empty() {
            return None;
        }

        let coverage = hits as f64 / keywords.len() as f64;
        Some(KeywordScore {
            score: coverage * (1.0 + hits as f64 * self.scoring.match_bonus),
            hits,
        })
    }

    /// Best-scoring intent, or `None` when no keyword occurs in the query
    pub fn match_query(&self, query: &str) -> Option<ClassificationResult> {
        let start = Instant::now();
        let compacted = compact(query);

        let mut best: Option<(&IntentKeywords, KeywordScore)> = None;

        for entry in &self.table {
            let Some(candidate) = self.score(&compacted, &entry.keywords) else {
                continue;
            };

            let better = match &best {
                None => true,
                Some((_, current)) => {
                    candidate.score > current.score
                        || (candidate.score == current.score && candidate.hits > current.hits)
                }
            };

            if better {
                best = Some((entry, candidate));
            }
        }

        let (entry, best_score) = best?;
        let intent = self.catalog.get(&entry.intent_id)?;

        let confidence = best_score
            .score
            .clamp(self.scoring.min_confidence, self.scoring.max_confidence);
        let parameters = self.extractor.extract(query, &intent.id);

        debug!(
            intent = %intent.id,
            score = best_score.score,
            hits = best_score.hits,
            "Keyword match"
        );

        Some(ClassificationResult::resolved(
            intent,
            confidence,
            ClassificationMethod::Keyword,
            parameters,
            start.elapsed().as_secs_f64() * 1000.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LookupTable;
    use crate::models::{Endpoint, IntentDefinition};

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

    fn matcher_for(intents: Vec<IntentDefinition>) -> KeywordMatcher {
        let catalog = IntentCatalog::new(
            intents,
            LookupTable::default(),
            LookupTable::default(),
            LookupTable::default(),
        )
        .unwrap();
        KeywordMatcher::new(Arc::new(catalog), KeywordScoring::default())
    }

    fn krx_matcher() -> KeywordMatcher {
        KeywordMatcher::new(Arc::new(IntentCatalog::krx().unwrap()), KeywordScoring::default())
    }

    #[test]
    fn test_unique_keyword_resolves_intent() {
        let cases = vec![
            ("공매도잔고 보여줘", "short_balance"),
            ("ETN 목록", "etn_list"),
            ("채권 시장", "bond_price"),
            ("ELW 알려줘", "elw_list"),
        ];

        let matcher = krx_matcher();
        for (query, expected) in cases {
            let result = matcher.match_query(query).unwrap();
            assert_eq!(result.intent, expected, "query: {}", query);
            assert_eq!(result.method, ClassificationMethod::Keyword);
            assert!(result.confidence >= 0.5);
        }
    }

    #[test]
    fn test_no_hits_returns_none() {
        assert!(krx_matcher().match_query("요즘 어때").is_none());
        assert!(krx_matcher().match_query("").is_none());
    }

    #[test]
    fn test_specific_list_beats_more_hits_with_default_tuning() {
        // A: 2 of 10 -> 0.2 * 1.2 = 0.24; B: 1 of 3 -> 0.333 * 1.1 = 0.367
        let matcher = matcher_for(vec![
            intent("a", &["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "a0"]),
            intent("b", &["b1", "b2", "b3"]),
        ]);

        let a = matcher.score("a1a2b1", &matcher.table[0].keywords).unwrap();
        let b = matcher.score("a1a2b1", &matcher.table[1].keywords).unwrap();
        assert!((a.score - 0.24).abs() < 1e-9);
        assert!((b.score - 0.3666666).abs() < 1e-6);

        let result = matcher.match_query("a1 a2 b1").unwrap();
        assert_eq!(result.intent, "b");
    }

    #[test]
    fn test_tie_breaks_on_hits_then_catalog_order() {
        let matcher = matcher_for(vec![
            intent("first", &["x", "y"]),
            intent("second", &["x", "z"]),
        ]);
        assert_eq!(matcher.match_query("x").unwrap().intent, "first");

        // Without the bonus both score exactly 0.5; the intent with more hits wins
        let catalog = IntentCatalog::new(
            vec![intent("fewer", &["p", "r"]), intent("more", &["p", "q", "s", "t"])],
            LookupTable::default(),
            LookupTable::default(),
            LookupTable::default(),
        )
        .unwrap();
        let scoring = KeywordScoring {
            match_bonus: 0.0,
            ..KeywordScoring::default()
        };
        let matcher = KeywordMatcher::new(Arc::new(catalog), scoring);
        assert_eq!(matcher.match_query("pq").unwrap().intent, "more");
    }

    #[test]
    fn test_confidence_clamped_with_default_tuning() {
        let matcher = matcher_for(vec![
            intent("wide", &["k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8", "k9", "k0"]),
            intent("narrow", &["only"]),
        ]);

        let low = matcher.match_query("k1").unwrap();
        assert_eq!(low.confidence, 0.5);

        // 1/1 * 1.1 = 1.1 -> capped
        let high = matcher.match_query("only").unwrap();
        assert_eq!(high.confidence, 0.99);
    }

    #[test]
    fn test_confidence_monotonic_in_hits() {
        let matcher = matcher_for(vec![intent(
            "solo",
            &["k1", "k2", "k3", "k4", "k5", "k6"],
        )]);

        let queries = ["k1", "k1k2", "k1k2k3", "k1k2k3k4", "k1k2k3k4k5", "k1k2k3k4k5k6"];
        let mut previous = 0.0;
        for query in queries {
            let confidence = matcher.match_query(query).unwrap().confidence;
            assert!(confidence >= previous);
            assert!((0.5..=0.99).contains(&confidence));
            previous = confidence;
        }
    }

    #[test]
    fn test_keywords_are_whitespace_insensitive() {
        let matcher = krx_matcher();
        let result = matcher.match_query("삼성전자 외국인보유율").unwrap();
        assert_eq!(result.intent, "foreign_holding");
    }

    #[test]
    fn test_price_query_extracts_parameters() {
        let result = krx_matcher().match_query("삼성전자 오늘 주가 알려줘").unwrap();

        assert_eq!(result.intent, "stock_price");
        assert_eq!(result.endpoint, "/api/stocks/ohlcv");
        assert_eq!(result.parameters["ticker"], "005930");
        assert!(result.parameters.contains_key("date"));
        assert!(result.latency_ms >= 0.0);
    }
}
