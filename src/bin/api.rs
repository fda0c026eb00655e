use krx_intent_router::{api::start_server, IntentRouter, RouterConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RouterConfig::from_env()?;

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8000".to_string())
        .parse()?;

    info!("🚀 KRX Intent Router - API Server");
    info!("📍 Port: {}", api_port);

    let router = Arc::new(IntentRouter::from_config(&config)?);

    info!(
        intents = router.catalog().len(),
        embedding = router.embedding_available(),
        llm = router.llm_available(),
        "✅ Router initialized"
    );

    start_server(router, api_port).await?;

    Ok(())
}
