//! Headless server binary.
//!
//! Starts the axum web server and waits for Ctrl+C.

use qr_studio_lib::app::SharedState;
use qr_studio_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    qr_studio_lib::init_tracing();
    tracing::info!("Starting QR Studio (headless mode)");

    let (db, config, dir) = qr_studio_lib::init_foundation()?;
    let state = SharedState::new(db, config, dir);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        "Headless server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::error!("Server task failed: {e}");
    }
    Ok(())
}
