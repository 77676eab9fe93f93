//! Importer error types.

use thiserror::Error;

/// Errors that can occur while importing a transcript export.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The export could not be read as CSV.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// No term header was recognised anywhere in the export.
    #[error("no terms found in export")]
    NoTerms,

    /// No importer handles this format.
    #[error("unsupported import format: {0}")]
    UnsupportedFormat(String),
}
