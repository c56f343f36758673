//! Downloaded translations ZIP.

use std::io::{Cursor, Read};

use bytes::Bytes;
use zip::ZipArchive;

use crate::error::ClientError;

/// One file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Entry path, `{vendorLocale}/{fileUri}` for translation downloads.
    pub path: String,
    pub content: Vec<u8>,
}

/// An in-memory ZIP of translated files.
///
/// The buffer is owned by this value and released when it is dropped.
pub struct TranslationsArchive {
    archive: ZipArchive<Cursor<Bytes>>,
}

impl std::fmt::Debug for TranslationsArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationsArchive")
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl TranslationsArchive {
    /// Open an archive from a downloaded body.
    pub fn from_bytes(bytes: Bytes) -> Result<Self, ClientError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self { archive })
    }

    /// Number of entries, directories included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Read every file entry in archive order, skipping directories.
    pub fn files(&mut self) -> Result<Vec<ArchiveFile>, ClientError> {
        let mut files = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let mut entry = self.archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }

            let path = entry.name().to_string();
            let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut content)
                .map_err(|e| ClientError::Archive(format!("Failed to read {path}: {e}")))?;
            files.push(ArchiveFile { path, content });
        }
        Ok(files)
    }
}
