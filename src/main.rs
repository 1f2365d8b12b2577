mod advisor;
mod analysis;
mod api;
mod betting;
mod config;
mod draw_refresh;
mod error;
mod fetcher;
mod recommend;
mod selector;
mod state;
mod types;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::advisor::{ChatCompletionClient, CompletionClient};
use crate::api::health::HealthState;
use crate::api::latency::UpstreamLatency;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::draw_refresh::{DrawFeed, DrawRefresher};
use crate::error::Result;
use crate::fetcher::today_utc;
use crate::state::DrawCache;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()?;

    let health = Arc::new(HealthState::new());
    let latency = Arc::new(UpstreamLatency::new());
    let feed = Arc::new(DrawFeed::new(
        cfg.clone(),
        http,
        DrawCache::new(),
        Arc::clone(&health),
        Arc::clone(&latency),
    ));

    // --- Completion client ---
    let llm: Option<Arc<dyn CompletionClient>> = match &cfg.llm_api_key {
        Some(key) => {
            info!(model = %cfg.llm_model, "[ADVISOR] completion client ready ({})", cfg.llm_api_url);
            Some(Arc::new(ChatCompletionClient::new(&cfg, key.clone())?))
        }
        None => {
            warn!("GROQ_API_KEY not set; /api/ai-analysis will answer 500 until it is configured");
            None
        }
    };

    // --- Bootstrap: warm today's draws; an empty result is not fatal ---
    let date = today_utc();
    let (draws, source) = feed.refresh(&date).await;
    if draws.is_empty() {
        warn!(date = %date, "Bootstrap fetched no draws; serving empty results until the lottery API responds");
    } else {
        info!(date = %date, draws = draws.len(), source = %source, "Bootstrap complete: {} draws", draws.len());
    }

    // Draw refresher (background, every DRAW_REFRESH_INTERVAL_SECS)
    let refresher = DrawRefresher::new(Arc::clone(&feed), cfg.draw_refresh_interval_secs);
    tokio::spawn(async move { refresher.run().await });

    // HTTP API server
    let api_state = ApiState { feed, llm, health, latency };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
