use std::path::PathBuf;
use std::sync::Arc;

use qr_store::Database;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::services::generator::GeneratorService;
use crate::services::remote::RemoteQrClient;

/// Application shared state accessible from axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for WebSocket messages
    ws_tx: broadcast::Sender<String>,
    config: RwLock<AppConfig>,
    db: Database,
    data_dir: PathBuf,
    generator: GeneratorService,
    /// Held for the duration of a batch run
    batch_lock: Arc<Mutex<()>>,
    shutdown_token: CancellationToken,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded config.
    pub fn new(db: Database, config: AppConfig, data_dir: PathBuf) -> Self {
        let (ws_tx, _) = broadcast::channel(2048);
        let remote = RemoteQrClient::new(config.remote_api_url.clone());
        let generator = GeneratorService::new(remote, db.clone());

        Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config: RwLock::new(config),
                db,
                data_dir,
                generator,
                batch_lock: Arc::new(Mutex::new(())),
                shutdown_token: CancellationToken::new(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(crate::config::app_config::DEFAULT_PORT)
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    /// Send a `{ "type": .., "data": .. }` message to every WebSocket client.
    pub fn broadcast(&self, msg_type: &str, data: serde_json::Value) {
        let msg = serde_json::json!({ "type": msg_type, "data": data });
        // No receivers is fine.
        let _ = self.inner.ws_tx.send(msg.to_string());
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.inner.data_dir
    }

    /// Directory where finished batch archives are written.
    pub fn output_dir(&self) -> PathBuf {
        self.inner.data_dir.join("output")
    }

    pub fn generator(&self) -> &GeneratorService {
        &self.inner.generator
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Claim the batch slot. `None` while another run holds it.
    pub fn try_begin_batch(&self) -> Option<OwnedMutexGuard<()>> {
        self.inner.batch_lock.clone().try_lock_owned().ok()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> (SharedState, PathBuf) {
    let name = format!("qr-studio-test-{}", uuid::Uuid::new_v4());
    let dir = std::env::temp_dir().join(name);
    std::fs::create_dir_all(dir.join("output")).expect("create test data dir");
    let db = Database::open_in_memory().expect("Failed to create test DB");
    (SharedState::new(db, AppConfig::default(), dir.clone()), dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_slot_is_exclusive() {
        let (state, _dir) = test_state();
        let guard = state.try_begin_batch();
        assert!(guard.is_some());
        assert!(state.try_begin_batch().is_none());
        drop(guard);
        assert!(state.try_begin_batch().is_some());
    }

    #[test]
    fn broadcast_wraps_type_and_data() {
        let (state, _dir) = test_state();
        let mut rx = state.subscribe_ws();
        state.broadcast("batch_progress", serde_json::json!({ "current": 1 }));

        let msg: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(msg["type"], "batch_progress");
        assert_eq!(msg["data"]["current"], 1);
    }
}
