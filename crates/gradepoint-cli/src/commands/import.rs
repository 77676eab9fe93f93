//! The `gradepoint import` command.

use std::path::PathBuf;

use anyhow::Result;

use gradepoint_core::parser::save_transcript;
use gradepoint_core::traits::TranscriptImporter;
use gradepoint_import::importer_for_path;

pub fn execute(csv_path: PathBuf, out: PathBuf, name: Option<String>) -> Result<()> {
    let importer = importer_for_path(&csv_path)?;
    let mut transcript = importer.import_path(&csv_path)?;
    if let Some(name) = name {
        transcript.name = name;
    }

    save_transcript(&transcript, &out)?;

    println!(
        "Imported {} term(s), {} course(s) with the {} importer into {}",
        transcript.terms.len(),
        transcript.rows().count(),
        importer.name(),
        out.display()
    );

    Ok(())
}
