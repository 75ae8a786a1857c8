//! Progress reporting between pipeline stages.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Processing,
    Completed,
}

/// Snapshot emitted before each item and once after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_item_name: Option<String>,
}

impl Progress {
    pub fn processing(current: usize, total: usize, name: &str) -> Self {
        Self {
            current,
            total,
            status: ProgressStatus::Processing,
            current_item_name: Some(name.to_string()),
        }
    }

    pub fn completed(total: usize) -> Self {
        Self {
            current: total,
            total,
            status: ProgressStatus::Completed,
            current_item_name: None,
        }
    }
}

/// Receives progress synchronously from the running pipeline.
pub trait ProgressSink {
    fn report(&self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(&Progress),
{
    fn report(&self, progress: &Progress) {
        self(progress)
    }
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: &Progress) {}
}
