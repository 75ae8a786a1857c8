use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use super::{api, websocket};
use crate::app::SharedState;

/// Uploaded logos and history imports can exceed axum's 2 MB default.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Generation ---
        .route("/api/payload", post(api::qr::encode_payload))
        .route("/api/qr", post(api::qr::generate))
        .route("/api/qr/svg", post(api::qr::generate_svg))
        .route("/api/qr/remote-url", get(api::qr::remote_url))
        // --- Batch ---
        .route("/api/batch", post(api::batch::run))
        .route("/api/batch/parse", post(api::batch::parse))
        .route("/api/batch/sample", get(api::batch::sample))
        .route("/api/batch/download/{file}", get(api::batch::download))
        // --- History ---
        .route("/api/history", get(api::history::list).delete(api::history::clear))
        .route("/api/history/{id}", delete(api::history::remove))
        .route("/api/history/export", get(api::history::export))
        .route("/api/history/import", post(api::history::import))
        // --- Templates ---
        .route("/api/templates", get(api::templates::list).post(api::templates::create))
        .route("/api/templates/{id}", delete(api::templates::remove))
        // --- Settings ---
        .route("/api/settings", get(api::settings::get_settings).put(api::settings::update_settings))
        // --- Logs ---
        .route("/api/logs", get(api::logs::get_logs))
        .route("/api/logs/clear", post(api::logs::clear_logs))
        // --- Middleware ---
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
