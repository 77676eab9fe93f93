//! The `gradepoint groups` command.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradepoint_core::engine::analyze;
use gradepoint_core::model::display_name;
use gradepoint_core::selector::select_best;

use crate::config::load_config_from;

pub fn execute(transcript_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let transcript = super::load_transcript(&transcript_path, &config)?;
    let analysis = analyze(&transcript);

    let rows: HashMap<&str, (&str, &str)> = transcript
        .rows()
        .map(|(_, r)| (r.id.as_str(), (r.display_name(), r.grade.trim())))
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["Group", "Term", "Row", "Course", "Grade", "Status"]);

    let mut count = 0;
    for group in analysis.groups.retaken_groups() {
        count += 1;
        let kept = select_best(group, analysis.as_of).map(|m| m.row_id.as_str());
        for member in &group.members {
            let (name, grade) = rows
                .get(member.row_id.as_str())
                .copied()
                .unwrap_or((display_name(""), ""));
            let status = if kept == Some(member.row_id.as_str()) {
                "kept".to_string()
            } else if let Some(start) = analysis.exclusions.exclusion_start(&member.row_id) {
                format!("excluded from term {start}")
            } else {
                "not in GPA".to_string()
            };
            table.add_row(vec![
                Cell::new(count),
                Cell::new(member.term_index),
                Cell::new(&member.row_id),
                Cell::new(name),
                Cell::new(grade),
                Cell::new(status),
            ]);
        }
    }

    if count == 0 {
        println!("No retaken courses.");
    } else {
        println!("{table}");
        println!("{count} retaken course(s)");
    }

    Ok(())
}
