// Web-based AI fake news detector using Google Gemini

mod analysis;
mod config;
mod error;
mod gemini;
mod page;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    if config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; analysis requests will return a configuration error");
    }
    tracing::info!(
        text_model = %config.text_model,
        vision_model = %config.vision_model,
        "Gemini models configured"
    );

    let bind_addr = config.bind_addr;
    let app = routes::router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("🚀 Server running on http://{}", bind_addr);
    tracing::info!("📰 Open in your browser to start checking headlines!");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
