//! Batch QR generation.
//!
//! Ingests named items (CSV or manual entry), renders each one under shared
//! settings, and packages the results into a single zip archive while
//! recording a per-item outcome.

pub mod archive;
pub mod csv;
pub mod pipeline;
pub mod progress;

pub use archive::{Archive, PackagingError};
pub use csv::{parse_csv, sample_csv};
pub use pipeline::{
    BatchArchive, BatchError, BatchOutcome, BatchPipeline, BatchReport, BatchSettings, FailureKind,
};
pub use progress::{NoProgress, Progress, ProgressSink, ProgressStatus};

use qr_payload::{Intent, ValidationError};
use serde::{Deserialize, Serialize};

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// One named unit of work in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    #[serde(default = "new_item_id")]
    pub id: String,
    pub name: String,
    pub payload: String,
    #[serde(rename = "type", default = "default_intent_type")]
    pub intent_type: String,
}

impl BatchItem {
    pub fn new(
        name: impl Into<String>,
        payload: impl Into<String>,
        intent_type: impl Into<String>,
    ) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            payload: payload.into(),
            intent_type: intent_type.into(),
        }
    }

    /// Manual entry: encode an intent into a batch item.
    pub fn from_intent(name: impl Into<String>, intent: &Intent) -> Result<Self, ValidationError> {
        let payload = intent.encode()?;
        Ok(Self::new(name, payload.into_inner(), intent.kind().as_str()))
    }
}

/// Random 9-character lowercase alphanumeric token.
pub fn new_item_id() -> String {
    nanoid::nanoid!(9, &ID_ALPHABET)
}

fn default_intent_type() -> String {
    "text".to_string()
}
