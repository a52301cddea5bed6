//! Ask Proxy
//!
//! A small HTTP service that accepts `{"query": ...}` on `POST /ask`, forwards
//! it as a single user message to an OpenAI-compatible chat completion API and
//! relays the first completion back as `{"response": ...}`.

mod api;
mod core;
mod models;

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::Config;
use crate::core::logging::init_logging;
use crate::core::provider::Provider;
use crate::core::providers::OpenAIProvider;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Check for --help flag
    if std::env::args().any(|arg| arg == "--help") {
        print_help();
        return;
    }

    // A missing .env file is fine
    dotenv::dotenv().ok();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);

    print_startup_banner(&config);

    let provider: Arc<dyn Provider> = match OpenAIProvider::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.request_timeout,
    ) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("Failed to initialize provider: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Using provider: {}", provider.provider_name());

    let app_state = AppState {
        config: config.clone(),
        provider,
    };

    let app = create_router(app_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Print startup banner with configuration
fn print_startup_banner(config: &Config) {
    println!("🚀 Ask Proxy v{}", env!("CARGO_PKG_VERSION"));
    println!("✅ Configuration loaded successfully");
    println!("   Base URL: {}", config.base_url);
    println!("   Model: {}", config.model);
    println!("   Request Timeout: {}s", config.request_timeout);
    println!("   Server: {}:{}", config.host, config.port);
    println!();
}

/// Print help message
fn print_help() {
    println!("Ask Proxy v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: ask-proxy [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --help    Display this help message");
    println!();
    println!("Environment variables:");
    println!("  OPENAI_API_KEY - Your API key (required unless set in the config file)");
    println!("  CONFIG_PATH - Path to a TOML config file (default: config.toml, optional)");
    println!("  RUST_LOG - Overrides the configured log level");
    println!();
    println!("Config file (all keys optional):");
    println!("  [openai]  api_key, base_url (default: https://api.openai.com/v1), model (default: gpt-4)");
    println!("  [server]  host (default: 0.0.0.0), port (default: 8000), log_level (default: info), max_body_bytes (default: unlimited)");
    println!("  [request] request_timeout in seconds (default: 60)");
    println!();
    println!("Endpoints:");
    println!("  POST /ask     {{\"query\": \"...\"}} -> {{\"response\": \"...\"}}");
    println!("  GET  /health  Health check");
}
