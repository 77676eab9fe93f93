//! The `gradepoint calc` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradepoint_core::error::TranscriptError;
use gradepoint_core::numeric::{fmt_credits, fmt_gpa};
use gradepoint_core::report::TranscriptReport;
use gradepoint_report::html::write_html_report;

use crate::config::load_config_from;

pub fn execute(
    transcript_path: PathBuf,
    as_of: Option<u32>,
    format: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let transcript = super::load_transcript(&transcript_path, &config)?;

    let as_of = match as_of {
        Some(index) => {
            transcript
                .term(index)
                .ok_or(TranscriptError::UnknownTerm(index))?;
            index
        }
        None => transcript.last_term_index(),
    };

    let format = format.unwrap_or_else(|| config.default_format.clone());
    let formats: Vec<&str> = if format == "all" {
        vec!["text", "json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "text" | "markdown" | "md" | "json" | "html"),
            "unknown format: {fmt} (expected text, markdown, json, html or all)"
        );
    }

    let report = TranscriptReport::generate(&transcript, as_of);
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    for fmt in &formats {
        match *fmt {
            "text" => print_summary(&report),
            "markdown" | "md" => println!("{}", report.to_markdown()),
            "json" => {
                let path = output.join(format!("{}.json", report.file_stem()));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{}.html", report.file_stem()));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {}
        }
    }

    Ok(())
}

fn print_summary(report: &TranscriptReport) {
    let analysis = &report.analysis;
    if analysis.terms.is_empty() {
        println!("{}: no terms", report.transcript_name);
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Term",
        "Attempted",
        "Earned",
        "Quality Points",
        "GPA",
        "Cum. Attempted",
        "Cum. Earned",
        "Cum. GPA",
    ]);

    for t in &analysis.terms {
        table.add_row(vec![
            Cell::new(format!("{}. {}", t.index, t.name)),
            Cell::new(fmt_credits(t.term.attempted)),
            Cell::new(fmt_credits(t.term.earned)),
            Cell::new(fmt_credits(t.term.quality_points)),
            Cell::new(fmt_gpa(t.term.gpa)),
            Cell::new(fmt_credits(t.cumulative.attempted)),
            Cell::new(fmt_credits(t.cumulative.earned)),
            Cell::new(fmt_gpa(t.cumulative.gpa)),
        ]);
    }

    println!("{table}");

    let s = &analysis.summary;
    println!(
        "\nCumulative as of term {}: {} attempted, {} earned, {} quality points, GPA {}",
        s.institution.as_of,
        fmt_credits(s.institution.attempted),
        fmt_credits(s.institution.earned),
        fmt_credits(s.institution.quality_points),
        fmt_gpa(s.institution.gpa),
    );
    if s.transfer_earned > 0.0 {
        println!(
            "Transfer credit: {} earned, overall earned {}",
            fmt_credits(s.transfer_earned),
            fmt_credits(s.overall_earned),
        );
    }
    let excluded = analysis
        .exclusions
        .iter()
        .filter(|(_, start)| *start <= report.as_of)
        .count();
    if excluded > 0 {
        println!("{excluded} retaken attempt(s) excluded from the cumulative GPA");
    }
}
