//! Structured QR intents and their canonical payload strings.
//!
//! Each [`Intent`] variant maps to exactly one encodable string
//! (`WIFI:...`, vCard, `mailto:`, `SMSTO:` ...). Encoding is pure and
//! rejects intents whose primary field is blank.

pub mod encode;
pub mod intent;

pub use intent::{
    ContactCard, EmailDraft, Intent, IntentKind, SmsDraft, WifiCredentials, WifiEncryption,
};

use std::fmt;

/// Canonical string form of an [`Intent`], ready for a symbol encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct EncodablePayload(String);

impl EncodablePayload {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodablePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodablePayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validation failure raised before any rendering is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
}

impl ValidationError {
    /// Name of the offending field, as shown to the user.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
        }
    }
}
