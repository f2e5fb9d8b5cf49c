use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod logging;
mod router;

use shared_config::AppConfig;
use shared_database::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing: console plus a plain-text log file
    let log_dir = PathBuf::from(
        std::env::var("LOG_DIR").unwrap_or_else(|_| logging::DEFAULT_LOG_DIR.to_string()),
    );
    let (file_layer, file_error) = match logging::open_log_file(&log_dir) {
        Ok(file) => (
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Arc::new(file))),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(logging::filter_directives(
            std::env::var("RUST_LOG").ok(),
            std::env::var("LOGLEVEL").ok(),
        )))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    match file_error {
        Some(err) => warn!("File logging disabled, could not open {}: {}", log_dir.display(), err),
        None => info!("Writing logs to {}", logging::log_file_path(&log_dir).display()),
    }

    info!("Starting clinic scheduling API server");

    // Load configuration
    let config = AppConfig::from_env();
    let bind_address = config.bind_address.clone();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create shared state
    let state = AppState::from_config(config).context("invalid scheduling configuration")?;

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
