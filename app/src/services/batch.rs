//! Batch runs on the blocking pool, with progress forwarded to WebSocket
//! clients and the finished archive written to the output directory.

use std::io::ErrorKind;
use std::path::Path;

use qr_batch::{
    BatchArchive, BatchItem, BatchOutcome, BatchPipeline, BatchReport, BatchSettings, FailureKind,
    Progress,
};
use qr_image::QrSymbolEncoder;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use crate::app::SharedState;
use crate::config::validation::{MAX_SIZE, MIN_SIZE};

pub const PROGRESS_EVENT: &str = "batch_progress";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub items: Vec<BatchItem>,
    #[serde(default)]
    pub settings: BatchSettings,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub item: BatchItem,
    pub reason: String,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub success: Vec<BatchItem>,
    pub failed: Vec<FailedItem>,
    pub archive: Option<String>,
    pub download_url: Option<String>,
    pub packaging_error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchRunError {
    #[error("No items to process")]
    Empty,

    #[error("Too many items: {count} exceeds the limit of {max}")]
    TooMany { count: usize, max: usize },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Batch task failed: {0}")]
    Task(String),

    #[error("Failed to save archive: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchRunError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Empty | Self::TooMany { .. } | Self::InvalidSettings(_) => 400,
            Self::Task(_) | Self::Io(_) => 500,
        }
    }
}

fn summarize(report: BatchReport) -> (BatchSummary, Option<BatchArchive>) {
    let total = report.outcomes.len();
    let mut success = Vec::new();
    let mut failed = Vec::new();
    for outcome in report.outcomes {
        match outcome {
            BatchOutcome::Success { item } => success.push(item),
            BatchOutcome::Failure { item, reason, kind } => {
                failed.push(FailedItem { item, reason, kind })
            }
        }
    }

    let summary = BatchSummary {
        total,
        success,
        failed,
        archive: None,
        download_url: None,
        packaging_error: report.packaging_error,
    };
    (summary, report.archive)
}

/// Write the archive as `<pipeline name>-<random id>.zip`. Existing files
/// are never replaced.
async fn save_archive(dir: &Path, archive: &BatchArchive) -> std::io::Result<String> {
    tokio::fs::create_dir_all(dir).await?;
    let stem = archive
        .file_name
        .strip_suffix(".zip")
        .unwrap_or(archive.file_name.as_str());

    loop {
        let name = format!("{stem}-{}.zip", qr_batch::new_item_id());
        let path = dir.join(&name);
        let open = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        match open {
            Ok(mut file) => {
                file.write_all(&archive.bytes).await?;
                file.flush().await?;
                let bytes = archive.bytes.len();
                info!(path = %path.display(), bytes, "Saved batch archive");
                return Ok(name);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Run a batch to completion.
///
/// `slot` is the guard from [`SharedState::try_begin_batch`]. It moves into
/// a detached task together with the run, so it stays held until the
/// archive is on disk even if the caller stops waiting.
pub async fn run_batch(
    state: &SharedState,
    req: BatchRequest,
    slot: OwnedMutexGuard<()>,
) -> Result<BatchSummary, BatchRunError> {
    let max = state.config().await.batch_max_items;
    if req.items.is_empty() {
        return Err(BatchRunError::Empty);
    }
    if req.items.len() > max {
        return Err(BatchRunError::TooMany {
            count: req.items.len(),
            max,
        });
    }
    if !(MIN_SIZE..=MAX_SIZE).contains(&req.settings.size_px) {
        return Err(BatchRunError::InvalidSettings(format!(
            "sizePx must be between {MIN_SIZE} and {MAX_SIZE}"
        )));
    }

    let state = state.clone();
    tokio::spawn(async move {
        let _slot = slot;
        execute(&state, req).await
    })
    .await
    .map_err(|e| BatchRunError::Task(e.to_string()))?
}

async fn execute(state: &SharedState, req: BatchRequest) -> Result<BatchSummary, BatchRunError> {
    let progress_state = state.clone();
    let report = tokio::task::spawn_blocking(move || {
        let pipeline = BatchPipeline::new(QrSymbolEncoder::new(), req.settings);
        let sink = |p: &Progress| {
            let data = serde_json::to_value(p).unwrap_or_default();
            progress_state.broadcast(PROGRESS_EVENT, data);
        };
        pipeline.run(&req.items, &sink)
    })
    .await
    .map_err(|e| BatchRunError::Task(e.to_string()))?;

    let (mut summary, archive) = summarize(report);
    if let Some(archive) = archive {
        let name = save_archive(&state.output_dir(), &archive).await?;
        summary.download_url = Some(format!("/api/batch/download/{name}"));
        summary.archive = Some(name);
    }

    info!(
        total = summary.total,
        success = summary.success.len(),
        failed = summary.failed.len(),
        "Batch run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_state;

    fn slot(state: &SharedState) -> OwnedMutexGuard<()> {
        state.try_begin_batch().unwrap()
    }

    fn contains(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    fn items() -> Vec<BatchItem> {
        vec![
            BatchItem::new("First Item", "https://example.com", "url"),
            BatchItem::new("Blank", "   ", "text"),
            BatchItem::new("Third", "hello", "text"),
        ]
    }

    #[tokio::test]
    async fn run_writes_archive_and_reports_failures() {
        let (state, dir) = test_state();
        let mut rx = state.subscribe_ws();

        let summary = run_batch(
            &state,
            BatchRequest {
                items: items(),
                settings: BatchSettings::default(),
            },
            slot(&state),
        )
        .await
        .unwrap();

        assert_eq!(summary.total, 3);
        let names: Vec<_> = summary.success.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["First Item", "Third"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].item.name, "Blank");
        assert_eq!(summary.failed[0].kind, FailureKind::Validation);

        let name = summary.archive.as_deref().unwrap();
        assert!(name.starts_with("qr-codes-batch-"));
        assert!(name.ends_with(".zip"));
        assert_eq!(
            summary.download_url.as_deref(),
            Some(format!("/api/batch/download/{name}").as_str())
        );
        assert!(dir.join("output").join(name).exists());

        // 3 processing events + 1 completed.
        let mut events = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            events.push(serde_json::from_str::<serde_json::Value>(&msg).unwrap());
        }
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e["type"] == PROGRESS_EVENT));
        assert_eq!(events[0]["data"]["currentItemName"], "First Item");
        assert_eq!(events[3]["data"]["status"], "completed");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn all_failures_produce_no_archive() {
        let (state, dir) = test_state();
        let summary = run_batch(
            &state,
            BatchRequest {
                items: vec![BatchItem::new("Empty", "", "text")],
                settings: BatchSettings::default(),
            },
            slot(&state),
        )
        .await
        .unwrap();

        assert!(summary.success.is_empty());
        assert!(summary.archive.is_none());
        assert!(summary.download_url.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_runs() {
        let (state, dir) = test_state();
        let err = run_batch(
            &state,
            BatchRequest {
                items: Vec::new(),
                settings: BatchSettings::default(),
            },
            slot(&state),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BatchRunError::Empty));

        let too_many = vec![BatchItem::new("x", "x", "text"); 501];
        let err = run_batch(
            &state,
            BatchRequest {
                items: too_many,
                settings: BatchSettings::default(),
            },
            slot(&state),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Too many items: 501 exceeds the limit of 500"
        );
        assert_eq!(err.status_code(), 400);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn back_to_back_runs_keep_separate_archives() {
        let (state, dir) = test_state();
        let mut names = Vec::new();
        for item in ["RunA", "RunB"] {
            let summary = run_batch(
                &state,
                BatchRequest {
                    items: vec![BatchItem::new(item, item, "text")],
                    settings: BatchSettings::default(),
                },
                slot(&state),
            )
            .await
            .unwrap();
            names.push(summary.archive.unwrap());
        }
        assert_ne!(names[0], names[1]);

        let first = std::fs::read(dir.join("output").join(&names[0])).unwrap();
        let second = std::fs::read(dir.join("output").join(&names[1])).unwrap();
        assert!(contains(&first, b"RunA.png"));
        assert!(!contains(&first, b"RunB.png"));
        assert!(contains(&second, b"RunB.png"));
        assert!(!contains(&second, b"RunA.png"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn slot_is_released_after_run() {
        let (state, dir) = test_state();
        run_batch(
            &state,
            BatchRequest {
                items: vec![BatchItem::new("One", "one", "text")],
                settings: BatchSettings::default(),
            },
            slot(&state),
        )
        .await
        .unwrap();
        assert!(state.try_begin_batch().is_some());
        let _ = std::fs::remove_dir_all(dir);
    }
}
