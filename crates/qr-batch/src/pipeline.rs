//! Sequential batch rendering and packaging.
//!
//! A run is a fold over the input items. Each item is rendered, drawn onto
//! a square canvas, encoded to the target format and added to the archive.
//! A failing item is recorded and the fold moves on; it never aborts the
//! run. Progress is pushed to a [`ProgressSink`] before each item and once
//! at the end.

use chrono::{DateTime, Utc};
use image::DynamicImage;
use qr_image::encode::encode_image;
use qr_image::resize::scale_symbol;
use qr_image::{ColorError, OutputFormat, RenderError, RenderSettings, SymbolEncoder};
use qr_payload::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::BatchItem;
use crate::archive::{Archive, PackagingError};
use crate::progress::{Progress, ProgressSink};

/// Settings shared by every item of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchSettings {
    #[serde(flatten)]
    pub render: RenderSettings,
    pub size_px: u32,
    pub format: OutputFormat,
    pub quality: f32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            render: RenderSettings::default(),
            size_px: 256,
            format: OutputFormat::Png,
            quality: 0.9,
        }
    }
}

/// Per-item failure.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Color(#[from] ColorError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Failed to generate image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Classification of a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Validation,
    Render,
    Encode,
}

impl BatchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) | Self::Color(_) => FailureKind::Validation,
            Self::Render(RenderError::Color(_) | RenderError::EmptyPayload) => {
                FailureKind::Validation
            }
            Self::Render(_) => FailureKind::Render,
            Self::Encode(_) => FailureKind::Encode,
        }
    }
}

/// Result of one item, produced exactly once per input in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum BatchOutcome {
    Success {
        item: BatchItem,
    },
    Failure {
        item: BatchItem,
        reason: String,
        kind: FailureKind,
    },
}

impl BatchOutcome {
    pub fn item(&self) -> &BatchItem {
        match self {
            Self::Success { item } | Self::Failure { item, .. } => item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Finalized zip produced by a run with at least one success.
#[derive(Clone, PartialEq, Eq)]
pub struct BatchArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for BatchArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchArchive")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub archive: Option<BatchArchive>,
    /// Set when the archive could not be finalized; outcomes are still valid.
    pub packaging_error: Option<String>,
}

impl BatchReport {
    pub fn success(&self) -> Vec<&BatchItem> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                BatchOutcome::Success { item } => Some(item),
                BatchOutcome::Failure { .. } => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<(&BatchItem, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                BatchOutcome::Failure { item, reason, .. } => Some((item, reason.as_str())),
                BatchOutcome::Success { .. } => None,
            })
            .collect()
    }
}

/// Fold state: outcomes so far plus the archive being built.
#[derive(Default)]
struct RunState {
    outcomes: Vec<BatchOutcome>,
    archive: Archive,
}

type Packager = fn(Archive) -> Result<Vec<u8>, PackagingError>;

/// Renders a list of items under one settings snapshot.
pub struct BatchPipeline<E> {
    encoder: E,
    settings: BatchSettings,
    package: Packager,
}

impl<E: SymbolEncoder> BatchPipeline<E> {
    pub fn new(encoder: E, settings: BatchSettings) -> Self {
        Self {
            encoder,
            settings,
            package: Archive::finalize,
        }
    }

    #[cfg(test)]
    fn with_packager(mut self, package: Packager) -> Self {
        self.package = package;
        self
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Run the batch, naming the archive after the current time.
    pub fn run(&self, items: &[BatchItem], sink: &dyn ProgressSink) -> BatchReport {
        self.run_at(items, sink, Utc::now())
    }

    /// Run the batch with an explicit start timestamp for the archive name.
    pub fn run_at(
        &self,
        items: &[BatchItem],
        sink: &dyn ProgressSink,
        started_at: DateTime<Utc>,
    ) -> BatchReport {
        let total = items.len();
        let format = self.settings.format;
        info!(
            total,
            format = format.extension(),
            size = self.settings.size_px,
            "Starting batch run"
        );

        let state = items
            .iter()
            .enumerate()
            .fold(RunState::default(), |mut state, (index, item)| {
                sink.report(&Progress::processing(index + 1, total, &item.name));

                let outcome = match self.render_item(item) {
                    Ok(bytes) => {
                        state.archive.add(entry_name(&item.name, format), bytes);
                        BatchOutcome::Success { item: item.clone() }
                    }
                    Err(e) => {
                        warn!(item = %item.name, error = %e, "Batch item failed");
                        BatchOutcome::Failure {
                            item: item.clone(),
                            reason: e.to_string(),
                            kind: e.kind(),
                        }
                    }
                };
                state.outcomes.push(outcome);
                state
            });

        sink.report(&Progress::completed(total));

        let RunState { outcomes, archive } = state;
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        let (archive, packaging_error) = if succeeded == 0 {
            (None, None)
        } else {
            match (self.package)(archive) {
                Ok(bytes) => (
                    Some(BatchArchive {
                        file_name: archive_file_name(started_at),
                        bytes,
                    }),
                    None,
                ),
                Err(e) => {
                    warn!(error = %e, "Failed to finalize batch archive");
                    (None, Some(e.to_string()))
                }
            }
        };

        info!(
            total,
            succeeded,
            failed = total - succeeded,
            "Batch run finished"
        );

        BatchReport {
            outcomes,
            archive,
            packaging_error,
        }
    }

    fn render_item(&self, item: &BatchItem) -> Result<Vec<u8>, BatchError> {
        let settings = &self.settings;
        settings.render.colors()?;

        if item.payload.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Payload" }.into());
        }

        let base = self.encoder.render(&item.payload, &settings.render)?;
        let canvas = scale_symbol(&base, settings.size_px);
        let bytes = encode_image(
            &DynamicImage::ImageRgba8(canvas),
            settings.format,
            settings.quality,
        )?;
        Ok(bytes)
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Archive entry name for an item.
pub fn entry_name(item_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", sanitize_file_stem(item_name), format.extension())
}

/// `qr-codes-batch-YYYY-MM-DDTHH-MM-SS.zip`
pub fn archive_file_name(started_at: DateTime<Utc>) -> String {
    format!(
        "qr-codes-batch-{}.zip",
        started_at.format("%Y-%m-%dT%H-%M-%S")
    )
}
