//! The `gradepoint validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradepoint_core::parser;

pub fn execute(transcript_path: PathBuf) -> Result<()> {
    let transcripts = if transcript_path.is_dir() {
        parser::load_transcript_directory(&transcript_path)?
    } else {
        vec![parser::load_transcript(&transcript_path)?]
    };

    let mut total_warnings = 0;

    for transcript in &transcripts {
        println!(
            "Transcript: {} ({} terms, {} courses)",
            transcript.name,
            transcript.terms.len(),
            transcript.rows().count()
        );

        let warnings = parser::validate_transcript(transcript);
        for w in &warnings {
            let prefix = w
                .row_id
                .as_ref()
                .map(|id| format!("  [row {id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All transcripts valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
