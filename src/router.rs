//! Intent router - the classification cascade
//!
//! KEYWORD → EMBEDDING → LLM → KEYWORD FALLBACK → UNKNOWN
//!
//! Stages 1 and 2 are plain synchronous calls; the LLM call is the single
//! await point. `classify` never fails: the worst answer is `unknown`.

use crate::catalog::IntentCatalog;
use crate::config::RouterConfig;
use crate::embedding::{EmbeddingClassifier, HashingEmbedder, SharedEmbedder};
use crate::keyword::KeywordMatcher;
use crate::llm::{GeminiClient, GenerativeClassifier, SharedBackend};
use crate::models::ClassificationResult;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Optional stage: either constructed and usable, or absent with a reason
pub enum Capability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Capability<T> {
    fn unavailable(reason: impl Into<String>) -> Self {
        Capability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Capability::Available(inner) => Some(inner),
            Capability::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Available(_) => None,
            Capability::Unavailable { reason } => Some(reason),
        }
    }
}

pub struct IntentRouter {
    catalog: Arc<IntentCatalog>,
    keyword_threshold: f64,
    embedding_threshold: f64,
    keyword: KeywordMatcher,
    embedding: Capability<EmbeddingClassifier>,
    generative: Capability<GenerativeClassifier>,
}

pub struct IntentRouterBuilder {
    catalog: Arc<IntentCatalog>,
    config: RouterConfig,
    embedder: Option<SharedEmbedder>,
    backend: Option<SharedBackend>,
}

impl IntentRouterBuilder {
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn embedder(mut self, embedder: SharedEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn generative_backend(mut self, backend: SharedBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<IntentRouter> {
        self.config.validate()?;

        let catalog = self.catalog;
        let config = self.config;

        let embedding = match (config.enable_embedding, self.embedder) {
            (false, _) => Capability::unavailable("disabled by configuration"),
            (true, None) => Capability::unavailable("no embedding backend configured"),
            (true, Some(embedder)) => match EmbeddingClassifier::new(embedder, catalog.clone()) {
                Ok(classifier) => Capability::Available(classifier),
                Err(e) => {
                    warn!("Embedding stage disabled: {}", e);
                    Capability::unavailable(e.to_string())
                }
            },
        };

        let generative = match (config.enable_llm, self.backend) {
            (false, _) => Capability::unavailable("disabled by configuration"),
            (true, None) => Capability::unavailable("no generative backend configured"),
            (true, Some(backend)) => {
                info!(model = backend.model_name(), "LLM stage enabled");
                Capability::Available(GenerativeClassifier::new(
                    backend,
                    catalog.clone(),
                    config.llm_default_confidence,
                ))
            }
        };

        Ok(IntentRouter {
            keyword: KeywordMatcher::new(catalog.clone(), config.scoring),
            catalog,
            keyword_threshold: config.keyword_threshold,
            embedding_threshold: config.embedding_threshold,
            embedding,
            generative,
        })
    }
}

impl IntentRouter {
    pub fn builder(catalog: Arc<IntentCatalog>) -> IntentRouterBuilder {
        IntentRouterBuilder {
            catalog,
            config: RouterConfig::default(),
            embedder: None,
            backend: None,
        }
    }

    /// Catalog from file or built-in, local embedder, Gemini when a key is set
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                info!("Loading intent catalog from {}", path.display());
                IntentCatalog::from_path(path)?
            }
            None => IntentCatalog::krx()?,
        };

        let mut builder = Self::builder(Arc::new(catalog)).config(config.clone());

        if config.enable_embedding {
            builder = builder.embedder(Arc::new(HashingEmbedder::new(config.embedding_dimension)?));
        }

        if config.enable_llm {
            match config.gemini_api_key.as_deref() {
                Some(key) => match GeminiClient::new(
                    key.to_string(),
                    &config.gemini_model,
                    config.llm_timeout,
                ) {
                    Ok(client) => builder = builder.generative_backend(Arc::new(client)),
                    Err(e) => warn!("Gemini client unavailable: {}", e),
                },
                None => warn!("GEMINI_API_KEY not set - LLM stage disabled"),
            }
        }

        builder.build()
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub fn embedding_available(&self) -> bool {
        self.embedding.is_available()
    }

    pub fn llm_available(&self) -> bool {
        self.generative.is_available()
    }

    pub fn embedding_stage(&self) -> &Capability<EmbeddingClassifier> {
        &self.embedding
    }

    pub fn llm_stage(&self) -> &Capability<GenerativeClassifier> {
        &self.generative
    }

    /// Run the cascade; always yields a result
    pub async fn classify(&self, query: &str) -> ClassificationResult {
        let start = Instant::now();

        // 1. Keyword
        let keyword_result = match self.keyword.match_query(query) {
            Some(result) if result.confidence >= self.keyword_threshold => {
                info!(
                    intent = %result.intent,
                    confidence = result.confidence,
                    latency_ms = result.latency_ms,
                    "Classified by keyword"
                );
                return result;
            }
            other => other,
        };

        // 2. Embedding
        if let Some(classifier) = self.embedding.get() {
            if let Some(result) = classifier.classify(query, self.embedding_threshold) {
                info!(
                    intent = %result.intent,
                    confidence = result.confidence,
                    latency_ms = result.latency_ms,
                    "Classified by embedding"
                );
                return result;
            }
        }

        // 3. LLM
        if let Some(classifier) = self.generative.get() {
            if let Some(result) = classifier.classify(query).await {
                info!(
                    intent = %result.intent,
                    confidence = result.confidence,
                    latency_ms = result.latency_ms,
                    "Classified by LLM"
                );
                return result;
            }
        }

        // 4. Low-confidence keyword answer
        if let Some(result) = keyword_result {
            warn!(
                intent = %result.intent,
                confidence = result.confidence,
                "Falling back to low-confidence keyword match"
            );
            return result;
        }

        // 5. Nothing matched
        let result = ClassificationResult::unknown(start.elapsed().as_secs_f64() * 1000.0);
        info!(latency_ms = result.latency_ms, "No intent matched");
        result
    }

    /// Blocking wrapper for callers outside async code. Panics if called
    /// from inside a Tokio runtime.
    pub fn classify_blocking(&self, query: &str) -> Result<ClassificationResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.classify(query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{Embedder, Embedding};
    use crate::error::RouterError;
    use crate::llm::StaticBackend;
    use crate::models::ClassificationMethod;
    use chrono::Local;

    /// Every text maps to the same direction
    struct ConstantEmbedder;

    impl Embedder for ConstantEmbedder {
        fn embed(&self, _text: &str) -> Result<Embedding> {
            Ok(vec![1.0, 0.0])
        }

        fn model_name(&self) -> &str {
            "constant"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn embed(&self, _text: &str) -> Result<Embedding> {
            Err(RouterError::EmbeddingError("model missing".to_string()))
        }

        fn model_name(&self) -> &str {
            "broken"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn catalog() -> Arc<IntentCatalog> {
        Arc::new(IntentCatalog::krx().unwrap())
    }

    fn keyword_only() -> IntentRouter {
        IntentRouter::builder(catalog())
            .config(RouterConfig::keyword_only())
            .build()
            .unwrap()
    }

    fn llm_only(reply: &str) -> IntentRouter {
        IntentRouter::builder(catalog())
            .config(RouterConfig {
                enable_embedding: false,
                ..RouterConfig::default()
            })
            .generative_backend(Arc::new(StaticBackend::new(reply)))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_hits_returns_unknown() {
        let result = keyword_only().classify("요즘 어때").await;

        assert_eq!(result.intent, "unknown");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.method, ClassificationMethod::None);
        assert!(result.parameters.is_empty());
        assert_eq!(result.endpoint, "");
        assert!(!result.requires_login);
        assert!(result.latency_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_empty_query_is_well_formed() {
        let result = keyword_only().classify("").await;
        assert!(result.is_unknown());
    }

    #[tokio::test]
    async fn test_price_lookup_scenario() {
        let result = keyword_only().classify("삼성전자 오늘 주가 알려줘").await;
        let today = Local::now().date_naive().format("%Y%m%d").to_string();

        assert_eq!(result.intent, "stock_price");
        assert_eq!(result.method, ClassificationMethod::Keyword);
        assert_eq!(result.parameters["ticker"], "005930");
        assert_eq!(result.parameters["date"], today.as_str());
    }

    #[tokio::test]
    async fn test_confident_keyword_skips_later_stages() {
        // etn_list: 2 of 3 keywords -> 0.8 >= 0.7
        let router = llm_only(r#"{"intent": "market_cap", "confidence": 0.99}"#);
        let result = router.classify("ETN 목록").await;

        assert_eq!(result.intent, "etn_list");
        assert_eq!(result.method, ClassificationMethod::Keyword);
        assert!(result.confidence >= 0.7);
    }

    #[tokio::test]
    async fn test_embedding_overrides_weak_keyword() {
        let router = IntentRouter::builder(catalog())
            .config(RouterConfig {
                enable_llm: false,
                ..RouterConfig::default()
            })
            .embedder(Arc::new(ConstantEmbedder))
            .build()
            .unwrap();

        // Keyword alone would say short_selling at 0.5
        let result = router.classify("공매도 현황 좀").await;

        assert_eq!(result.method, ClassificationMethod::Embedding);
        assert_eq!(result.intent, "stock_price");
        assert!(result.confidence >= 0.6);
    }

    #[tokio::test]
    async fn test_llm_overrides_weak_keyword() {
        let router = llm_only(r#"{"intent": "comprehensive_analysis", "confidence": 0.8, "reasoning": "x"}"#);
        let result = router.classify("삼성전자 오늘 주가 알려줘").await;

        assert_eq!(result.method, ClassificationMethod::Llm);
        assert_eq!(result.intent, "comprehensive_analysis");
        assert_eq!(result.parameters["ticker"], "005930");
    }

    #[tokio::test]
    async fn test_unparseable_llm_reply_falls_back_to_keyword() {
        let router = llm_only("I am not sure what you mean.");
        let result = router.classify("삼성전자 오늘 주가 알려줘").await;

        assert_eq!(result.method, ClassificationMethod::Keyword);
        assert_eq!(result.intent, "stock_price");
        assert_eq!(result.confidence, 0.5);
    }

    #[tokio::test]
    async fn test_unparseable_llm_reply_without_keywords_is_unknown() {
        let result = llm_only("no json here").classify("요즘 어때").await;
        assert!(result.is_unknown());
        assert_eq!(result.method, ClassificationMethod::None);
    }

    #[test]
    fn test_disabled_stage_ignores_backend() {
        let router = IntentRouter::builder(catalog())
            .config(RouterConfig::keyword_only())
            .embedder(Arc::new(ConstantEmbedder))
            .generative_backend(Arc::new(StaticBackend::new("{}")))
            .build()
            .unwrap();

        assert!(!router.embedding_available());
        assert!(!router.llm_available());
        assert_eq!(
            router.llm_stage().reason(),
            Some("disabled by configuration")
        );
    }

    #[test]
    fn test_broken_embedder_makes_stage_inert() {
        let router = IntentRouter::builder(catalog())
            .config(RouterConfig {
                enable_llm: false,
                ..RouterConfig::default()
            })
            .embedder(Arc::new(BrokenEmbedder))
            .build()
            .unwrap();

        assert!(!router.embedding_available());
        let result = tokio_test::block_on(router.classify("공매도 현황"));
        assert_eq!(result.intent, "short_selling");
        assert_eq!(result.method, ClassificationMethod::Keyword);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = IntentRouter::builder(catalog())
            .config(RouterConfig {
                embedding_threshold: -0.1,
                ..RouterConfig::keyword_only()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_without_key_disables_llm() {
        let config = RouterConfig {
            gemini_api_key: None,
            ..RouterConfig::default()
        };
        let router = IntentRouter::from_config(&config).unwrap();

        assert!(router.embedding_available());
        assert!(!router.llm_available());
        assert_eq!(router.catalog().len(), 21);
    }

    #[test]
    fn test_classify_blocking() {
        let result = keyword_only().classify_blocking("ETF 목록").unwrap();
        assert_eq!(result.intent, "etf_list");
    }
}
