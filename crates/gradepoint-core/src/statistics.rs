//! Term-level and cumulative GPA statistics.
//!
//! Term figures count every attempt made in the term, retaken or not.
//! Cumulative figures walk every term up to an observation term and keep
//! only the best attempt per retake group as of that term; superseded and
//! non-punitive attempts still count as attempted but leave the GPA
//! denominator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grade::GradeValue;
use crate::model::{CourseRow, Term, Transcript};
use crate::numeric::{clean, round_to};
use crate::resolver::{ExclusionMap, GroupId, GroupIndex};
use crate::selector::select_best;

/// Quality points for one row, rounded to cents at the multiplication step.
pub fn quality_points(units: f64, value: GradeValue) -> f64 {
    match value {
        GradeValue::Numeric(points) => round_to(clean(units * points), 2),
        GradeValue::NonPunitive => 0.0,
    }
}

/// Running sums, cleaned after every step.
#[derive(Debug, Default)]
struct Accumulator {
    attempted: f64,
    earned: f64,
    quality_points: f64,
    excluded_units: f64,
}

impl Accumulator {
    fn attempt(&mut self, units: f64) {
        self.attempted = clean(self.attempted + units);
    }

    /// Units that stay attempted but leave the GPA denominator.
    fn exclude(&mut self, units: f64) {
        self.excluded_units = clean(self.excluded_units + units);
    }

    fn count(&mut self, units: f64, value: GradeValue, quality_points: f64) {
        if value.earns_credit() {
            self.earned = clean(self.earned + units);
        }
        self.quality_points = clean(self.quality_points + quality_points);
    }

    fn gpa_units(&self) -> f64 {
        clean(self.attempted - self.excluded_units)
    }

    fn gpa(&self) -> f64 {
        let denominator = self.gpa_units();
        if denominator > 0.0 {
            clean(self.quality_points / denominator)
        } else {
            0.0
        }
    }
}

/// One row's contribution to its term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowStats {
    pub row_id: String,
    pub name: String,
    pub units: f64,
    pub grade: String,
    pub value: GradeValue,
    pub quality_points: f64,
    /// Term from which the row stops counting cumulatively, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_start: Option<u32>,
}

/// Figures for a single term with no retake exclusion applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    pub term_index: u32,
    pub attempted: f64,
    pub earned: f64,
    pub quality_points: f64,
    /// The GPA denominator: attempted minus non-punitive units.
    pub gpa_units: f64,
    pub gpa: f64,
    pub rows: Vec<RowStats>,
}

/// Compute term-level figures.
///
/// `exclusions` only annotates rows for display; it never changes the
/// term's figures.
pub fn compute_term(term: &Term, exclusions: &ExclusionMap) -> TermStats {
    let mut acc = Accumulator::default();
    let rows = term
        .rows
        .iter()
        .map(|row| {
            let value = row.grade_value();
            let qp = quality_points(row.units, value);
            acc.attempt(row.units);
            match value {
                GradeValue::Numeric(_) => acc.count(row.units, value, qp),
                GradeValue::NonPunitive => acc.exclude(row.units),
            }
            RowStats {
                row_id: row.id.clone(),
                name: row.name.clone(),
                units: row.units,
                grade: row.grade.clone(),
                value,
                quality_points: qp,
                exclusion_start: exclusions.exclusion_start(&row.id),
            }
        })
        .collect();

    TermStats {
        term_index: term.index,
        attempted: acc.attempted,
        earned: acc.earned,
        quality_points: acc.quality_points,
        gpa_units: acc.gpa_units(),
        gpa: acc.gpa(),
        rows,
    }
}

/// Point-in-time cumulative figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeStats {
    pub as_of: u32,
    pub attempted: f64,
    pub earned: f64,
    pub quality_points: f64,
    pub gpa_units: f64,
    pub gpa: f64,
}

/// How a row took part in a cumulative calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    /// Kept: counts toward earned, quality points and the GPA denominator.
    Counted,
    /// Withdrawal, pass, ungraded or unknown grade.
    NonPunitive,
    /// A better attempt in the same group is kept instead.
    Superseded { by: String },
}

/// One row's part in a cumulative calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRow {
    pub term_index: u32,
    pub row_id: String,
    pub name: String,
    pub units: f64,
    pub grade: String,
    /// Quality points contributed (zero unless counted).
    pub quality_points: f64,
    #[serde(flatten)]
    pub status: RowStatus,
}

/// Cumulative figures with the per-row breakdown behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeDetails {
    pub stats: CumulativeStats,
    pub rows: Vec<CumulativeRow>,
}

/// Compute cumulative figures as of `as_of`.
pub fn compute_cumulative(terms: &[Term], as_of: u32, index: &GroupIndex) -> CumulativeStats {
    cumulative_details(terms, as_of, index).stats
}

/// Compute cumulative figures as of `as_of`, recording how every row
/// counted.
///
/// `index` must come from the same terms. A row the index does not know is
/// treated as ungrouped and always kept.
pub fn cumulative_details(terms: &[Term], as_of: u32, index: &GroupIndex) -> CumulativeDetails {
    let mut acc = Accumulator::default();
    let mut best_by_group: HashMap<GroupId, Option<String>> = HashMap::new();
    let mut rows = Vec::new();

    for term in terms.iter().filter(|t| t.index <= as_of) {
        for row in &term.rows {
            let value = row.grade_value();
            acc.attempt(row.units);

            let status = match value {
                GradeValue::NonPunitive => RowStatus::NonPunitive,
                GradeValue::Numeric(_) => match kept_instead(row, as_of, index, &mut best_by_group) {
                    Some(by) => RowStatus::Superseded { by },
                    None => RowStatus::Counted,
                },
            };

            let qp = match status {
                RowStatus::Counted => {
                    let qp = quality_points(row.units, value);
                    acc.count(row.units, value, qp);
                    qp
                }
                RowStatus::NonPunitive | RowStatus::Superseded { .. } => {
                    acc.exclude(row.units);
                    0.0
                }
            };

            rows.push(CumulativeRow {
                term_index: term.index,
                row_id: row.id.clone(),
                name: row.name.clone(),
                units: row.units,
                grade: row.grade.clone(),
                quality_points: qp,
                status,
            });
        }
    }

    CumulativeDetails {
        stats: CumulativeStats {
            as_of,
            attempted: acc.attempted,
            earned: acc.earned,
            quality_points: acc.quality_points,
            gpa_units: acc.gpa_units(),
            gpa: acc.gpa(),
        },
        rows,
    }
}

/// The row kept in place of `row` as of `as_of`, if `row` is not the best
/// of its group. Best picks are memoized per group for one pass.
fn kept_instead(
    row: &CourseRow,
    as_of: u32,
    index: &GroupIndex,
    best_by_group: &mut HashMap<GroupId, Option<String>>,
) -> Option<String> {
    let group = index.group_of(&row.id)?;
    if !group.is_retaken() {
        return None;
    }
    let best = best_by_group
        .entry(group.id)
        .or_insert_with(|| select_best(group, as_of).map(|m| m.row_id.clone()));
    match best {
        Some(best_id) if *best_id != row.id => Some(best_id.clone()),
        _ => None,
    }
}

/// End-of-transcript totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSummary {
    /// Cumulative figures as of the last term.
    pub institution: CumulativeStats,
    /// Credits earned elsewhere.
    pub transfer_earned: f64,
    /// Institution earned plus transfer earned.
    pub overall_earned: f64,
}

/// Summarize a transcript as of its last term, adding transfer credit to
/// earned credits only.
pub fn summarize(transcript: &Transcript, index: &GroupIndex) -> TranscriptSummary {
    summarize_as_of(transcript, transcript.last_term_index(), index)
}

/// Summarize a transcript as of `as_of`.
pub fn summarize_as_of(transcript: &Transcript, as_of: u32, index: &GroupIndex) -> TranscriptSummary {
    let institution = compute_cumulative(&transcript.terms, as_of, index);
    let transfer_earned = transcript.transfer_earned();
    TranscriptSummary {
        institution,
        transfer_earned,
        overall_earned: clean(institution.earned + transfer_earned),
    }
}
