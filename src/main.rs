use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use docstore_core::{open_store, StoreConfig};

/// Main entry point for the docstore server
///
/// Resolves configuration once, ensures the upload directory exists and serves the REST API.
///
/// # Environment Variables
/// - `DOCSTORE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DOCSTORE_UPLOAD_DIR`: Directory uploads are stored in (default: "Upload")
/// - `DOCSTORE_MAX_UPLOAD_BYTES`: Request body limit in bytes (default: 26214400)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration values are invalid or the upload directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docstore=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = StoreConfig::from_env()?;
    let files = open_store(&cfg)?;

    tracing::info!("++ Storing uploads in {}", files.base_directory().display());
    tracing::info!("++ Starting docstore REST on {}", cfg.rest_addr());

    let app = api_rest::router(AppState::new(files), cfg.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
