//! The `gradepoint equiv` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use gradepoint_core::parser::{load_transcript, save_transcript};

pub fn add(transcript_path: PathBuf, course_a: String, course_b: String) -> Result<()> {
    let mut transcript = load_transcript(&transcript_path)?;
    if transcript.add_equivalence(&course_a, &course_b)? {
        save_transcript(&transcript, &transcript_path)?;
        println!("Added equivalence: {course_a} = {course_b}");
    } else {
        println!("Equivalence already exists: {course_a} = {course_b}");
    }
    Ok(())
}

pub fn remove(transcript_path: PathBuf, id: u64) -> Result<()> {
    let mut transcript = load_transcript(&transcript_path)?;
    let removed = transcript.remove_equivalence(id)?;
    save_transcript(&transcript, &transcript_path)?;
    println!(
        "Removed equivalence {}: {} = {}",
        removed.id, removed.course_a, removed.course_b
    );
    Ok(())
}

pub fn list(transcript_path: PathBuf) -> Result<()> {
    let transcript = load_transcript(&transcript_path)?;
    if transcript.equivalences.is_empty() {
        println!("No equivalences.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Course", "Equivalent To"]);
    for eq in &transcript.equivalences {
        table.add_row(vec![eq.id.to_string(), eq.course_a.clone(), eq.course_b.clone()]);
    }
    println!("{table}");
    Ok(())
}
