//! Filesystem content catalog.
//!
//! Sources live at `{root}/{content_type}/{object_id}.pot`. Imported
//! translations are written to `{root}/{content_type}/{object_id}/{locale}.po`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use locsync_common::{AppError, AppResult};
use locsync_core::po::{self, PoEntry};
use locsync_core::{ContentCatalog, SourceDescription};
use locsync_db::entities::{job, job_translation};
use tracing::{debug, info};

/// Catalog backed by PO files under a root directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn source_path(&self, content_type: &str, object_id: &str) -> AppResult<PathBuf> {
        Ok(self
            .root
            .join(component(content_type)?)
            .join(format!("{}.pot", component(object_id)?)))
    }

    fn translation_path(
        &self,
        content_type: &str,
        object_id: &str,
        locale: &str,
    ) -> AppResult<PathBuf> {
        Ok(self
            .root
            .join(component(content_type)?)
            .join(component(object_id)?)
            .join(format!("{}.po", component(locale)?)))
    }

    async fn read_source(&self, content_type: &str, object_id: &str) -> AppResult<Vec<PoEntry>> {
        let path = self.source_path(content_type, object_id)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!(
                    "No source file for {content_type} {object_id}"
                )));
            }
            Err(e) => return Err(io_error(&path, &e)),
        };
        po::parse(&text)
    }
}

/// A single path component taken from a job or translation.
fn component(value: &str) -> AppResult<&str> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(AppError::Validation(format!(
            "Not usable as a file name: {value:?}"
        )));
    }
    Ok(value)
}

fn io_error(path: &Path, e: &std::io::Error) -> AppError {
    AppError::Internal(format!("{}: {e}", path.display()))
}

#[async_trait]
impl ContentCatalog for FileCatalog {
    async fn export_po(&self, content_type: &str, object_id: &str) -> AppResult<Vec<PoEntry>> {
        let entries = self.read_source(content_type, object_id).await?;
        debug!(content_type, object_id, entries = entries.len(), "Exported source");
        Ok(entries
            .into_iter()
            .map(|e| PoEntry::source(e.msgctxt.as_deref(), &e.msgid))
            .collect())
    }

    async fn describe_source(
        &self,
        content_type: &str,
        object_id: &str,
    ) -> AppResult<SourceDescription> {
        let entries = self.read_source(content_type, object_id).await?;
        let title = entries
            .into_iter()
            .find(|e| e.msgctxt.as_deref() == Some("title"))
            .map_or_else(|| object_id.to_string(), |e| e.msgid);

        Ok(SourceDescription {
            content_type: content_type.to_string(),
            object_id: object_id.to_string(),
            kind: content_type.replace(['_', '-'], " "),
            title,
        })
    }

    async fn import_translation(
        &self,
        job: &job::Model,
        translation: &job_translation::Model,
        entries: Vec<PoEntry>,
    ) -> AppResult<()> {
        let path = self.translation_path(
            &job.source_content_type,
            &job.source_object_id,
            &translation.locale,
        )?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, &e))?;
        }
        tokio::fs::write(&path, po::render(&entries))
            .await
            .map_err(|e| io_error(&path, &e))?;

        info!(
            job_id = %job.id,
            translation_id = %translation.translation_id,
            path = %path.display(),
            "Wrote translation"
        );
        Ok(())
    }
}
