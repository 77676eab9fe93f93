//! Registrar CSV transcript exports.
//!
//! Exports are loosely structured: term headers and course lines are mixed
//! with page banners and totals, and columns shift between layouts. Lines are
//! recognised by content, not by position:
//!
//! - a field like `2021 Fall Semester 08/23/2021 - 12/10/2021` starts a term
//!   named by the text before the first date;
//! - a field containing `Transfer Term` drops course lines until the next
//!   regular term header;
//! - a course line has four consecutive fields `attempted, earned, quality
//!   points, grade`, with the course code two fields before `attempted`.

use std::sync::LazyLock;

use regex::Regex;

use gradepoint_core::grade::GradeScale;
use gradepoint_core::model::{CourseRow, Term, Transcript};
use gradepoint_core::numeric::parse_units;
use gradepoint_core::traits::TranscriptImporter;

use crate::error::ImportError;

static TERM_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}\s+(?:Fall|Winter|Spring|Summer|Term\s+\d+|Semester\s+[A-Za-z]+).*?)(\d{1,2}/\d{1,2}/\d{4})",
    )
    .ok()
});

static TRANSFER_TERM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Transfer Term").ok());

fn matches(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|r| r.is_match(text))
}

/// The term name in a header field, without the trailing date.
fn term_name(field: &str) -> Option<String> {
    let captures = TERM_HEADER.as_ref()?.captures(field)?;
    Some(captures.get(1)?.as_str().trim().to_string())
}

fn is_number(field: &str) -> bool {
    field.parse::<f64>().is_ok_and(f64::is_finite)
}

/// One course found on a line.
#[derive(Debug, Clone, PartialEq)]
struct CourseLine {
    code: String,
    units: f64,
    grade: String,
}

/// Scan a line for `attempted, earned, quality points, grade`.
fn find_course(fields: &[&str], scale: &GradeScale) -> Option<CourseLine> {
    (2..fields.len().saturating_sub(3)).find_map(|j| {
        let grade = fields[j + 3].split(' ').next().unwrap_or_default();
        if !scale.letters().any(|letter| letter == grade) {
            return None;
        }
        if !is_number(fields[j]) || !is_number(fields[j + 1]) {
            return None;
        }
        let code = fields[j - 2];
        if code.is_empty() {
            return None;
        }
        Some(CourseLine {
            code: code.to_string(),
            units: parse_units(fields[j]),
            grade: grade.to_string(),
        })
    })
}

/// Imports registrar CSV exports.
#[derive(Debug, Clone, Copy)]
pub struct CsvImporter {
    scale: &'static GradeScale,
}

impl CsvImporter {
    pub fn new() -> Self {
        Self {
            scale: GradeScale::standard(),
        }
    }

    /// Parse an export into a transcript. Row ids are `1`, `2`, ... in file
    /// order.
    pub fn parse(&self, content: &str) -> Result<Transcript, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut terms: Vec<Term> = Vec::new();
        // Whether course lines currently belong to the last term.
        let mut capturing = false;
        let mut next_row_id: u64 = 1;
        let mut dropped = 0usize;

        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(line = line + 1, "skipping unreadable CSV record: {e}");
                    continue;
                }
            };
            let fields: Vec<&str> = record.iter().collect();

            if let Some(header) = fields
                .iter()
                .find(|f| matches(&TERM_HEADER, f) || matches(&TRANSFER_TERM, f))
            {
                if matches(&TRANSFER_TERM, header) {
                    capturing = false;
                    continue;
                }
                let Some(name) = term_name(header) else {
                    continue;
                };
                if capturing && terms.last().is_some_and(|t| t.name == name) {
                    continue;
                }
                let index = terms.len() as u32 + 1;
                terms.push(Term::new(index, name));
                capturing = true;
                continue;
            }

            let Some(course) = find_course(&fields, self.scale) else {
                continue;
            };
            match terms.last_mut() {
                Some(term) if capturing => {
                    term.rows.push(CourseRow::new(
                        next_row_id.to_string(),
                        course.code,
                        course.units,
                        course.grade,
                    ));
                    next_row_id += 1;
                }
                _ => dropped += 1,
            }
        }

        if terms.is_empty() {
            return Err(ImportError::NoTerms);
        }
        if dropped > 0 {
            tracing::warn!(dropped, "ignored course lines outside a regular term");
        }
        tracing::debug!(
            terms = terms.len(),
            rows = next_row_id - 1,
            "imported CSV transcript"
        );

        Ok(Transcript {
            terms,
            next_row_id,
            ..Transcript::default()
        })
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptImporter for CsvImporter {
    fn name(&self) -> &str {
        "csv"
    }

    fn import_str(&self, content: &str) -> anyhow::Result<Transcript> {
        Ok(self.parse(content)?)
    }
}
