//! Trait implemented by transcript importers.
//!
//! Importers turn an external export (a registrar CSV, for example) into a
//! [`Transcript`]. Implementations live in the `gradepoint-import` crate.

use std::path::Path;

use anyhow::Context;

use crate::model::Transcript;

/// Converts an external transcript export into a [`Transcript`].
pub trait TranscriptImporter: Send + Sync {
    /// Short importer name (e.g. "csv").
    fn name(&self) -> &str;

    /// Import from the full text of an export.
    fn import_str(&self, content: &str) -> anyhow::Result<Transcript>;

    /// Import from a file. The transcript is named after the file when the
    /// export carries no name of its own.
    fn import_path(&self, path: &Path) -> anyhow::Result<Transcript> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut transcript = self
            .import_str(&content)
            .with_context(|| format!("failed to import {}", path.display()))?;
        if transcript.name.trim().is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                transcript.name = stem.to_string();
            }
        }
        Ok(transcript)
    }
}
