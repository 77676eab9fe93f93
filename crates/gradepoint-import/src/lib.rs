//! gradepoint-import: Transcript importers.
//!
//! Implements the `TranscriptImporter` trait for registrar CSV exports.

pub mod csv_export;
pub mod error;

use std::path::Path;

use gradepoint_core::traits::TranscriptImporter;

pub use crate::csv_export::CsvImporter;
pub use crate::error::ImportError;

/// Create an importer by format name.
pub fn create_importer(format: &str) -> Result<Box<dyn TranscriptImporter>, ImportError> {
    match format.trim().to_ascii_lowercase().as_str() {
        "csv" => Ok(Box::new(CsvImporter::new())),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

/// Create an importer for a file, chosen by its extension.
pub fn importer_for_path(path: &Path) -> Result<Box<dyn TranscriptImporter>, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    create_importer(ext)
}
