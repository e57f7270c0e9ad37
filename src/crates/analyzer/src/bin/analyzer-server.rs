//! Analyzer server binary.
//!
//! Standalone server exposing the repository analysis pipeline over a
//! REST API.

use analyzer::api::create_router;
use analyzer::config::ServerConfig;
use analyzer::pipeline::Pipeline;
use github::GithubClient;
use llm::GeminiClient;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    tracing::info!("Loading server configuration");
    let config = ServerConfig::load()?;

    tracing::info!("GitHub API base: {}", config.github.api_base);
    tracing::info!("Completion model: {}", config.llm.model);

    let addr: SocketAddr = config.bind_addr().parse()?;

    let github_client = GithubClient::new(config.github_config())?;
    let gemini_client = GeminiClient::new(config.llm_config()?)?;

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(github_client),
        Arc::new(gemini_client),
    ));

    tracing::info!("Building API router");
    let app = create_router(pipeline);

    tracing::info!("Starting analyzer server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Analyzer server shut down gracefully");
    Ok(())
}

/// Signal for graceful shutdown (Ctrl-C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
