//! In-memory zip packaging for one batch run.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named entries collected during a run, written out on [`Archive::finalize`].
///
/// Adding a name twice overwrites the earlier entry's content while keeping
/// its position.
#[derive(Debug, Default)]
pub struct Archive {
    entries: Vec<(String, Vec<u8>)>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `true` when an existing entry was overwritten.
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> bool {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            debug!(name = %name, "Overwriting archive entry with the same name");
            entry.1 = bytes;
            return true;
        }
        self.entries.push((name, bytes));
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Write all entries into a deflate-compressed zip.
    pub fn finalize(self) -> Result<Vec<u8>, PackagingError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.entries {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(bytes)?;
        }

        let bytes = writer.finish()?.into_inner();
        debug!(
            entries = self.entries.len(),
            bytes = bytes.len(),
            "Archive finalized"
        );
        Ok(bytes)
    }
}
