mod config;
mod handlers;
mod models;
mod services;
mod web; // Advisor page and JSON API

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AdvisorHandler;
use services::{AIService, GeminiService};
use web::server::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger so RUST_LOG from .env applies
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting Food Advisor...");

    let config = Config::from_env()?;

    let gemini = Arc::new(GeminiService::new(config.google_api_key.clone(), config.gemini_model.clone()));
    log::info!("✅ Gemini service initialized with model: {}", gemini.model_name());

    let advisor = Arc::new(AdvisorHandler::new(gemini));
    let app = create_router(advisor);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Web server listening on http://{}", config.bind_addr);
    println!("\n🍔 Food Advisor is running!");
    println!("🌐 Open http://{} in your browser", config.bind_addr);
    println!("\n🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .context("Web server error")?;

    Ok(())
}

/// Resolves once the signal fires. A failed signal listener is logged and also ends the wait.
async fn shutdown_signal(signal: impl std::future::Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => log::info!("🛑 Shutting down..."),
        Err(e) => log::error!("❌ Failed to listen for Ctrl+C, shutting down: {}", e),
    }
}
