use std::path::PathBuf;

use qr_store::Database;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::services::log_buffer::LogCaptureLayer;

/// Install the global subscriber: stdout formatting plus the in-memory
/// buffer served by `/api/logs`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(LogCaptureLayer::new())
        .init();
}

/// Determine the data directory for the application.
/// Priority: QR_STUDIO_DATA_DIR env var > ~/.qr-studio
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QR_STUDIO_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".qr-studio")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Read .env, open the database and load the runtime config (fatal on error).
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let dir = data_dir();
    std::fs::create_dir_all(dir.join("output"))?;

    let db_path = dir.join("qr-studio.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let config = AppConfig::from_env();
    tracing::info!(
        port = config.server_port,
        remote = %config.remote_api_url,
        "Settings loaded"
    );
    Ok((db, config, dir))
}
