//! skin-advisor HTTP Server
//!
//! Axum-based server exposing the chat bot over REST and WebSocket, plus
//! JSON endpoints for trends and budget plans. Price collection and trend
//! analysis run as background loops next to the router.
//!
//! ```text
//!                 ┌──────────────────── skin-server ────────────────────┐
//!  MarketClient ─►│ collection loop (10m) ──► MemoryMarketStore         │
//!                 │ analysis loop   (30m) ──► TrendAnalyzer             │
//!                 │                                                     │
//!  HTTP / WS ────►│ Router ──► BotService ──► Reply / Notification      │
//!                 └─────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::watch;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skin_advisor::market::{MarketApiClient, MarketClient, MockMarketClient};
use skin_advisor::scheduler::{spawn_analysis_loop, spawn_collection_loop};
use skin_advisor::{Collector, MemoryMarketStore};

use crate::config::AppConfig;
use crate::handlers::{
    analyze_handler, budget_handler, chat_handler, chat_stream_handler, health_check,
    trends_handler,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Price source
    let market: Arc<dyn MarketClient> = if config.use_mock_market {
        tracing::warn!("⚠ Using mock market data");
        tracing::warn!("  Set MARKET_API_KEY in .env to collect real prices");
        Arc::new(MockMarketClient::new())
    } else {
        let client = MarketApiClient::new(config.market.clone())?;
        tracing::info!("✓ Market API configured ({})", client.prices_url());
        Arc::new(client)
    };

    let store = Arc::new(MemoryMarketStore::new());
    let state = AppState::new(&store, &config, market.name());
    let collector = Arc::new(Collector::new(market, store.clone(), store.clone()));

    // Background loops
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let schedule = &config.schedule;
    let collection = spawn_collection_loop(collector, schedule.collect_interval, shutdown_rx.clone());
    let analysis = spawn_analysis_loop(
        state.analyzer.clone(),
        schedule.analysis_initial_delay,
        schedule.analysis_interval,
        shutdown_rx,
    );

    tracing::info!(
        collect_every = ?schedule.collect_interval,
        analyze_every = ?schedule.analysis_interval,
        first_analysis_in = ?schedule.analysis_initial_delay,
        "background loops started"
    );

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 skin-advisor server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /api/chat        - Send chat message");
    tracing::info!("  GET  /api/chat/stream - WebSocket chat + notifications");
    tracing::info!("  GET  /api/trends      - Ranked trends");
    tracing::info!("  POST /api/budget      - Budget allocation plan");
    tracing::info!("  POST /api/analyze     - Start analysis now");
    tracing::info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop loops and wait for the in-flight iteration
    let _ = shutdown_tx.send(true);
    let (collection, analysis) = tokio::join!(collection, analysis);
    for (name, joined) in [("collection", collection), ("analysis", analysis)] {
        if let Err(e) = joined {
            tracing::error!(error = %e, "{name} loop panicked");
        }
    }

    tracing::info!("server stopped");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))
        // Chat
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        // Market data
        .route("/api/trends", get(trends_handler))
        .route("/api/budget", post(budget_handler))
        .route("/api/analyze", post(analyze_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
