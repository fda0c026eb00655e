//! Parameter extraction
//!
//! Pulls `ticker`, `market` and `date` out of a free-form query for a given
//! intent. Shared by every classification stage. Each category is resolved
//! independently; a category with no hit leaves its key absent.

use crate::catalog::{compact, normalize, IntentCatalog};
use crate::models::Parameters;
use chrono::{Days, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Query words that make index resolution worth attempting
const INDEX_HINTS: &[&str] = &["지수", "코스피", "코스닥"];

/// Relative-date words and how many days back they point, in priority order
const RELATIVE_DATES: &[(&str, u64)] = &[("오늘", 0), ("today", 0), ("어제", 1), ("yesterday", 1)];

const DATE_FORMAT: &str = "%Y%m%d";

lazy_static! {
    static ref DATE_PATTERN: Regex =
        Regex::new(r"([0-9]{4})[-/]?([0-9]{2})[-/]?([0-9]{2})").expect("valid date pattern");
}

#[derive(Debug, Clone)]
pub struct ParameterExtractor {
    catalog: Arc<IntentCatalog>,
}

impl ParameterExtractor {
    pub fn new(catalog: Arc<IntentCatalog>) -> Self {
        Self { catalog }
    }

    /// Extract parameters, resolving relative dates against the local clock
    pub fn extract(&self, query: &str, intent_id: &str) -> Parameters {
        self.extract_on(query, intent_id, Local::now().date_naive())
    }

    /// Extract parameters with an explicit "today"
    pub fn extract_on(&self, query: &str, intent_id: &str, today: NaiveDate) -> Parameters {
        let mut params = Parameters::new();
        let compacted = compact(query);

        // Instrument
        if let Some((name, code)) = self
            .catalog
            .tickers()
            .iter()
            .find(|(name, _)| compacted.contains(&compact(name)))
        {
            params.insert("ticker".into(), Value::from(code));
            params.insert("ticker_name".into(), Value::from(name));
        }

        // Index overrides instrument when plausible
        let index_plausible = intent_id.contains("index")
            || INDEX_HINTS.iter().any(|hint| compacted.contains(hint));

        if index_plausible {
            if let Some((name, code)) = self
                .catalog
                .indices()
                .iter()
                .find(|(name, _)| compacted.contains(&compact(name)))
            {
                params.insert("ticker".into(), Value::from(code));
                params.insert("index_name".into(), Value::from(name));
            }
        }

        // Market keys may contain spaces, so match without compacting
        let lowered = normalize(query);
        if let Some((_, code)) = self
            .catalog
            .markets()
            .iter()
            .find(|(name, _)| lowered.contains(name))
        {
            params.insert("market".into(), Value::from(code));
        }

        if let Some(date) = extract_date(query, today) {
            params.insert("date".into(), Value::from(date));
        }

        params
    }
}

/// First matching date rule wins: relative words, then `YYYY[-/]MM[-/]DD`
fn extract_date(query: &str, today: NaiveDate) -> Option<String> {
    let lowered = normalize(query);

    for (word, days_back) in RELATIVE_DATES {
        if lowered.contains(word) {
            return today
                .checked_sub_days(Days::new(*days_back))
                .map(|date| date.format(DATE_FORMAT).to_string());
        }
    }

    DATE_PATTERN
        .captures(query)
        .map(|caps| format!("{}{}{}", &caps[1], &caps[2], &caps[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ParameterExtractor {
        ParameterExtractor::new(Arc::new(IntentCatalog::krx().unwrap()))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ticker_and_today() {
        let params = extractor().extract_on("삼성전자 오늘 주가 알려줘", "stock_price", day(2026, 1, 20));

        assert_eq!(params["ticker"], "005930");
        assert_eq!(params["ticker_name"], "삼성전자");
        assert_eq!(params["date"], "20260120");
        assert!(!params.contains_key("market"));
    }

    #[test]
    fn test_ticker_ignores_spacing_and_case() {
        let params = extractor().extract_on("SK 하이닉스 시세", "stock_price", day(2026, 1, 20));
        assert_eq!(params["ticker"], "000660");
    }

    #[test]
    fn test_yesterday_crosses_month() {
        let params = extractor().extract_on("어제 카카오 종가", "stock_price", day(2026, 3, 1));
        assert_eq!(params["date"], "20260228");
    }

    #[test]
    fn test_numeric_date_formats() {
        let ex = extractor();
        let today = day(2026, 1, 20);

        for query in ["2024-05-03 시세", "2024/05/03 시세", "20240503 시세"] {
            let params = ex.extract_on(query, "stock_price", today);
            assert_eq!(params["date"], "20240503", "query: {}", query);
        }
    }

    #[test]
    fn test_relative_date_beats_numeric() {
        let params = extractor().extract_on("오늘 20240503 시세", "stock_price", day(2026, 1, 20));
        assert_eq!(params["date"], "20260120");
    }

    #[test]
    fn test_index_overrides_ticker() {
        let params = extractor().extract_on("코스피 지수 알려줘", "index_price", day(2026, 1, 20));

        assert_eq!(params["ticker"], "1001");
        assert_eq!(params["index_name"], "코스피");
        assert_eq!(params["market"], "KOSPI");
    }

    #[test]
    fn test_longer_names_win_over_prefixes() {
        let ex = extractor();
        let today = day(2026, 1, 20);

        let cases = [
            ("코스피200 지수", "index_price", "1028"),
            ("코스닥150 지수", "index_price", "2203"),
            ("에코프로비엠 주가", "stock_price", "247540"),
            ("에코프로 주가", "stock_price", "086520"),
            ("SK스퀘어 주가", "stock_price", "402340"),
            ("SK 주가", "stock_price", "034730"),
        ];
        for (query, intent, code) in cases {
            let params = ex.extract_on(query, intent, today);
            assert_eq!(params["ticker"], code, "query: {}", query);
        }
    }

    #[test]
    fn test_index_needs_hint_or_intent() {
        // "krx100" is an index name but neither the intent nor the query points at an index
        let params = extractor().extract_on("krx100 구성", "etf_pdf", day(2026, 1, 20));
        assert!(!params.contains_key("ticker"));

        let params = extractor().extract_on("krx100 구성", "index_price", day(2026, 1, 20));
        assert_eq!(params["ticker"], "5042");
    }

    #[test]
    fn test_no_hits_leave_map_empty() {
        let params = extractor().extract_on("hello there", "stock_price", day(2026, 1, 20));
        assert!(params.is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let ex = extractor();
        let today = day(2026, 1, 20);
        let first = ex.extract_on("현대차 코스피 2025-12-31 거래량", "stock_price", today);

        ex.extract_on("LG전자 어제 시세", "stock_price", today);
        let second = ex.extract_on("현대차 코스피 2025-12-31 거래량", "stock_price", today);

        assert_eq!(first, second);
    }
}
