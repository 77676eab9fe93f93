//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;

use gradepoint_core::model::Transcript;
use gradepoint_core::parser;

use crate::config::GradepointConfig;

pub mod calc;
pub mod details;
pub mod equiv;
pub mod groups;
pub mod import;
pub mod init;
pub mod validate;

/// Load a transcript and merge in the configured equivalences.
fn load_transcript(path: &Path, config: &GradepointConfig) -> Result<Transcript> {
    let mut transcript = parser::load_transcript(path)?;
    let added = config.apply_equivalences(&mut transcript);
    if added > 0 {
        tracing::debug!(added, "merged configured equivalences");
    }
    Ok(transcript)
}
