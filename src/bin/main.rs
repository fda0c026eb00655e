use krx_intent_router::{IntentRouter, RouterConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_QUERIES: &[&str] = &[
    "삼성전자 오늘 주가 알려줘",
    "코스피 지수 보여줘",
    "ETF 목록",
    "외국인 순매수 종목",
    "SK하이닉스 공매도 현황",
    "시가총액 상위 종목",
    "카카오 투자해도 될까?",
    "오늘 날씨 어때",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RouterConfig::from_env()?;
    let router = IntentRouter::from_config(&config)?;

    info!(
        intents = router.catalog().len(),
        embedding = router.embedding_available(),
        llm = router.llm_available(),
        "Intent router ready"
    );

    println!("\n=== INTENT CLASSIFICATION ===");
    for query in SAMPLE_QUERIES {
        let result = router.classify(query).await;
        println!(
            "{:<28} → {:<24} {:.2} [{}] {:.1}ms",
            query, result.intent, result.confidence, result.method, result.latency_ms
        );
        if !result.parameters.is_empty() {
            println!("    params: {}", serde_json::to_string(&result.parameters)?);
        }
    }

    Ok(())
}
