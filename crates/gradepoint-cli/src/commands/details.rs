//! The `gradepoint details` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradepoint_core::engine::analyze;
use gradepoint_core::error::TranscriptError;
use gradepoint_core::model::{display_name, Transcript};
use gradepoint_core::numeric::{fmt_credits, fmt_gpa};
use gradepoint_core::resolver::GroupIndex;
use gradepoint_core::statistics::{cumulative_details, RowStatus, TermStats};

use crate::config::load_config_from;

pub fn execute(
    transcript_path: PathBuf,
    term_index: u32,
    cumulative: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let transcript = super::load_transcript(&transcript_path, &config)?;
    let term = transcript
        .term(term_index)
        .ok_or(TranscriptError::UnknownTerm(term_index))?;

    let analysis = analyze(&transcript);
    println!("{} (term {})", term.display_name(), term.index);

    if cumulative {
        print_cumulative(&transcript, term_index, &analysis.groups);
    } else if let Some(report) = analysis.term(term_index) {
        print_term(&report.term);
    }

    Ok(())
}

fn print_term(stats: &TermStats) {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Course", "Units", "Grade", "Points", "Quality Points", "Note"]);

    for row in &stats.rows {
        let note = match row.exclusion_start {
            Some(start) => format!("excluded from cumulative GPA from term {start}"),
            None if !row.value.is_numeric() => "not in GPA".to_string(),
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(&row.row_id),
            Cell::new(display_name(&row.name)),
            Cell::new(fmt_credits(row.units)),
            Cell::new(row.grade.trim()),
            Cell::new(row.value),
            Cell::new(fmt_credits(row.quality_points)),
            Cell::new(note),
        ]);
    }

    println!("{table}");
    println!(
        "Attempted {} | Earned {} | Quality points {} | GPA units {} | GPA {}",
        fmt_credits(stats.attempted),
        fmt_credits(stats.earned),
        fmt_credits(stats.quality_points),
        fmt_credits(stats.gpa_units),
        fmt_gpa(stats.gpa),
    );
}

fn print_cumulative(transcript: &Transcript, as_of: u32, groups: &GroupIndex) {
    let details = cumulative_details(&transcript.terms, as_of, groups);

    let mut table = Table::new();
    table.set_header(vec!["Term", "Row", "Course", "Units", "Grade", "Quality Points", "Status"]);

    for row in &details.rows {
        let status = match &row.status {
            RowStatus::Counted => "counted".to_string(),
            RowStatus::NonPunitive => "not in GPA".to_string(),
            RowStatus::Superseded { by } => format!("replaced by row {by}"),
        };
        table.add_row(vec![
            Cell::new(row.term_index),
            Cell::new(&row.row_id),
            Cell::new(display_name(&row.name)),
            Cell::new(fmt_credits(row.units)),
            Cell::new(row.grade.trim()),
            Cell::new(fmt_credits(row.quality_points)),
            Cell::new(status),
        ]);
    }

    let s = &details.stats;
    println!("{table}");
    println!(
        "Cumulative as of term {}: attempted {} | earned {} | quality points {} | GPA units {} | GPA {}",
        s.as_of,
        fmt_credits(s.attempted),
        fmt_credits(s.earned),
        fmt_credits(s.quality_points),
        fmt_credits(s.gpa_units),
        fmt_gpa(s.gpa),
    );
}
