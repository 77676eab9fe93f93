//! Core data model types for gradepoint.
//!
//! A transcript is an ordered list of terms, each owning the course rows
//! attempted in it, plus user-declared name equivalences and transfer credit.
//! The editing operations here keep the model's invariants (contiguous term
//! indices, never-reused row ids, normalized equivalences); the calculation
//! engine only ever reads these types.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::TranscriptError;
use crate::grade::{GradeScale, GradeValue};
use crate::numeric::{clean, coerce_units};

/// Normalize a course name for matching: strip all whitespace, upper-case.
pub fn normalize_course_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// One attempt at one course within one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    /// Unique across the whole transcript. Never reused.
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    /// Display name; matched case- and whitespace-insensitively.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Credit units. Non-numeric or negative input reads as zero.
    #[serde(default, deserialize_with = "lenient::units")]
    pub units: f64,
    /// Grade letter, or empty for ungraded.
    #[serde(default, deserialize_with = "lenient::text")]
    pub grade: String,
    /// Explicit link to the row this attempt retakes.
    #[serde(
        default,
        alias = "retakeOf",
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub retake_of: Option<String>,
}

impl CourseRow {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        units: f64,
        grade: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            units: coerce_units(units),
            grade: grade.into(),
            retake_of: None,
        }
    }

    /// Builder-style explicit retake link.
    pub fn with_retake_of(mut self, target: impl Into<String>) -> Self {
        self.retake_of = Some(target.into());
        self
    }

    pub fn normalized_name(&self) -> String {
        normalize_course_name(&self.name)
    }

    /// The row's value on the standard scale.
    pub fn grade_value(&self) -> GradeValue {
        GradeScale::standard().value_of(&self.grade)
    }

    /// The trimmed name, or `(Unnamed)`.
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }
}

/// A chronological container of course rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// 1-based position in chronological order.
    #[serde(default, alias = "termIndex")]
    pub index: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default)]
    pub rows: Vec<CourseRow>,
}

impl Term {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// The term name, or `Term N` when blank.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            default_term_name(self.index)
        } else {
            self.name.trim().to_string()
        }
    }
}

fn default_term_name(index: u32) -> String {
    format!("Term {index}")
}

/// The trimmed name, or `(Unnamed)` when blank.
pub fn display_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        "(Unnamed)"
    } else {
        trimmed
    }
}

/// An id past every id in use, or the smallest free one once `u64::MAX`
/// is taken. Zero is never handed out.
fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    let used: BTreeSet<u64> = ids.filter(|&id| id != 0).collect();
    match used.last() {
        None => 1,
        Some(&max) if max < u64::MAX => max + 1,
        Some(_) => (1..u64::MAX).find(|id| !used.contains(id)).unwrap_or(u64::MAX),
    }
}

/// A declared pair of course names that satisfy the same requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEquivalence {
    #[serde(default)]
    pub id: u64,
    #[serde(alias = "courseA", deserialize_with = "lenient::text")]
    pub course_a: String,
    #[serde(alias = "courseB", deserialize_with = "lenient::text")]
    pub course_b: String,
}

impl NameEquivalence {
    /// Whether this pair names `a` and `b`, in either order.
    pub fn pairs(&self, a: &str, b: &str) -> bool {
        let (x, y) = (
            normalize_course_name(&self.course_a),
            normalize_course_name(&self.course_b),
        );
        (x == a && y == b) || (x == b && y == a)
    }
}

/// Credit earned elsewhere. Only ever adds to overall earned credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCredit {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient::units")]
    pub credits: f64,
}

/// A retake candidate offered when linking a row to an earlier attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetakeCandidate {
    pub row_id: String,
    pub label: String,
    pub units: f64,
    pub grade: String,
}

/// Retake candidates from one earlier term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlierTerm {
    pub term_index: u32,
    pub term_name: String,
    pub courses: Vec<RetakeCandidate>,
}

/// A complete academic transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub equivalences: Vec<NameEquivalence>,
    #[serde(default)]
    pub transfers: Vec<TransferCredit>,
    /// Next row id to hand out.
    #[serde(default = "default_next_row_id", alias = "nextRowId")]
    pub next_row_id: u64,
}

fn default_next_row_id() -> u64 {
    1
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            name: String::new(),
            terms: Vec::new(),
            equivalences: Vec::new(),
            transfers: Vec::new(),
            next_row_id: default_next_row_id(),
        }
    }
}

impl Transcript {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn term(&self, index: u32) -> Option<&Term> {
        self.terms.iter().find(|t| t.index == index)
    }

    fn term_mut(&mut self, index: u32) -> Result<&mut Term, TranscriptError> {
        self.terms
            .iter_mut()
            .find(|t| t.index == index)
            .ok_or(TranscriptError::UnknownTerm(index))
    }

    /// Index of the chronologically last term, or 0 when there are none.
    pub fn last_term_index(&self) -> u32 {
        self.terms.iter().map(|t| t.index).max().unwrap_or(0)
    }

    /// Every row in transcript order, paired with its term index.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &CourseRow)> {
        self.terms
            .iter()
            .flat_map(|t| t.rows.iter().map(move |r| (t.index, r)))
    }

    /// The first row with this id and the index of its term.
    pub fn find_course(&self, row_id: &str) -> Option<(u32, &CourseRow)> {
        self.rows().find(|(_, r)| r.id == row_id)
    }

    pub fn course_mut(&mut self, row_id: &str) -> Option<&mut CourseRow> {
        self.terms
            .iter_mut()
            .flat_map(|t| t.rows.iter_mut())
            .find(|r| r.id == row_id)
    }

    /// Renumber terms 1..n in their current order, naming blank terms.
    pub fn renumber_terms(&mut self) {
        for (i, term) in self.terms.iter_mut().enumerate() {
            term.index = i as u32 + 1;
            if term.name.trim().is_empty() {
                term.name = default_term_name(term.index);
            }
        }
    }

    /// Restore invariants on data loaded from outside: contiguous term
    /// indices, a row id counter past every numeric id, and non-zero
    /// equivalence and transfer ids.
    pub fn normalize(&mut self) {
        self.renumber_terms();

        let max_numeric_id = self
            .rows()
            .filter_map(|(_, r)| r.id.trim().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next_row_id = self
            .next_row_id
            .max(max_numeric_id.saturating_add(1))
            .max(1);

        for i in 0..self.equivalences.len() {
            if self.equivalences[i].id == 0 {
                self.equivalences[i].id = next_id(self.equivalences.iter().map(|e| e.id));
            }
        }
        for i in 0..self.transfers.len() {
            if self.transfers[i].id == 0 {
                self.transfers[i].id = next_id(self.transfers.iter().map(|t| t.id));
            }
        }
    }

    fn allocate_row_id(&mut self) -> String {
        let existing: HashSet<&str> = self.rows().map(|(_, r)| r.id.as_str()).collect();
        let mut candidate = self.next_row_id.max(1);
        // Wraps back to 1 past u64::MAX; the rows can never use every id.
        while existing.contains(candidate.to_string().as_str()) {
            candidate = candidate.checked_add(1).unwrap_or(1);
        }
        self.next_row_id = candidate.saturating_add(1);
        candidate.to_string()
    }

    /// Append a term and return its index.
    pub fn add_term(&mut self, name: &str) -> u32 {
        let index = self.terms.len() as u32 + 1;
        self.terms.push(Term::new(index, name.trim()));
        self.renumber_terms();
        index
    }

    /// Insert a term at 1-based `position`, shifting later terms down.
    pub fn insert_term(&mut self, position: u32, name: &str) -> Result<u32, TranscriptError> {
        let len = self.terms.len();
        if position == 0 || position as usize > len + 1 {
            return Err(TranscriptError::TermPositionOutOfRange { position, len });
        }
        self.terms
            .insert(position as usize - 1, Term::new(position, name.trim()));
        self.renumber_terms();
        Ok(position)
    }

    /// Remove a term and renumber the rest. Retake links into the removed
    /// rows are cleared.
    pub fn remove_term(&mut self, index: u32) -> Result<Term, TranscriptError> {
        let pos = self
            .terms
            .iter()
            .position(|t| t.index == index)
            .ok_or(TranscriptError::UnknownTerm(index))?;
        let removed = self.terms.remove(pos);
        for row in &removed.rows {
            self.clear_links_to(&row.id);
        }
        self.renumber_terms();
        Ok(removed)
    }

    /// Rename a term. A blank name displays as `Term N`.
    pub fn rename_term(&mut self, index: u32, name: &str) -> Result<(), TranscriptError> {
        let term = self.term_mut(index)?;
        term.name = name.trim().to_string();
        Ok(())
    }

    /// Add a course to a term and return the new row id.
    pub fn add_course(
        &mut self,
        term_index: u32,
        name: &str,
        units: f64,
        grade: &str,
    ) -> Result<String, TranscriptError> {
        self.term_mut(term_index)?;
        let id = self.allocate_row_id();
        let row = CourseRow::new(id.clone(), name.trim(), units, grade.trim());
        self.term_mut(term_index)?.rows.push(row);
        Ok(id)
    }

    /// Remove a course row and clear every retake link pointing at it.
    pub fn remove_course(&mut self, row_id: &str) -> Result<CourseRow, TranscriptError> {
        let removed = self
            .terms
            .iter_mut()
            .find_map(|t| {
                let pos = t.rows.iter().position(|r| r.id == row_id)?;
                Some(t.rows.remove(pos))
            })
            .ok_or_else(|| TranscriptError::UnknownCourse(row_id.to_string()))?;
        self.clear_links_to(row_id);
        Ok(removed)
    }

    fn clear_links_to(&mut self, row_id: &str) {
        for row in self.terms.iter_mut().flat_map(|t| t.rows.iter_mut()) {
            if row.retake_of.as_deref() == Some(row_id) {
                row.retake_of = None;
            }
        }
    }

    /// Link `row_id` as a retake of `target_id`, which must sit in an
    /// earlier term.
    pub fn set_retake(&mut self, row_id: &str, target_id: &str) -> Result<(), TranscriptError> {
        if row_id == target_id {
            return Err(TranscriptError::SelfRetake(row_id.to_string()));
        }
        let (term, _) = self
            .find_course(row_id)
            .ok_or_else(|| TranscriptError::UnknownCourse(row_id.to_string()))?;
        let (target_term, _) = self
            .find_course(target_id)
            .ok_or_else(|| TranscriptError::UnknownCourse(target_id.to_string()))?;
        if target_term >= term {
            return Err(TranscriptError::RetakeNotEarlier {
                target: target_id.to_string(),
                term,
                target_term,
            });
        }
        if let Some(row) = self.course_mut(row_id) {
            row.retake_of = Some(target_id.to_string());
        }
        Ok(())
    }

    pub fn clear_retake(&mut self, row_id: &str) -> Result<(), TranscriptError> {
        let row = self
            .course_mut(row_id)
            .ok_or_else(|| TranscriptError::UnknownCourse(row_id.to_string()))?;
        row.retake_of = None;
        Ok(())
    }

    /// Declare two course names equivalent.
    ///
    /// Returns `Ok(false)` when the pair already exists in either order.
    pub fn add_equivalence(&mut self, a: &str, b: &str) -> Result<bool, TranscriptError> {
        let (a, b) = (normalize_course_name(a), normalize_course_name(b));
        if a.is_empty() || b.is_empty() {
            return Err(TranscriptError::EmptyCourseName);
        }
        if a == b {
            return Err(TranscriptError::SelfEquivalence(a));
        }
        if self.equivalences.iter().any(|eq| eq.pairs(&a, &b)) {
            return Ok(false);
        }
        let id = next_id(self.equivalences.iter().map(|e| e.id));
        self.equivalences.push(NameEquivalence {
            id,
            course_a: a,
            course_b: b,
        });
        Ok(true)
    }

    pub fn remove_equivalence(&mut self, id: u64) -> Result<NameEquivalence, TranscriptError> {
        let pos = self
            .equivalences
            .iter()
            .position(|e| e.id == id)
            .ok_or(TranscriptError::UnknownEquivalence(id))?;
        Ok(self.equivalences.remove(pos))
    }

    /// Record transfer credit and return its id. School names are upper-cased.
    pub fn add_transfer(&mut self, school: &str, credits: f64) -> u64 {
        let id = next_id(self.transfers.iter().map(|t| t.id));
        self.transfers.push(TransferCredit {
            id,
            school: school.trim().to_uppercase(),
            credits: coerce_units(credits),
        });
        id
    }

    pub fn remove_transfer(&mut self, id: u64) -> Result<TransferCredit, TranscriptError> {
        let pos = self
            .transfers
            .iter()
            .position(|t| t.id == id)
            .ok_or(TranscriptError::UnknownTransfer(id))?;
        Ok(self.transfers.remove(pos))
    }

    /// Total transfer credits.
    pub fn transfer_earned(&self) -> f64 {
        self.transfers
            .iter()
            .fold(0.0, |sum, t| clean(sum + coerce_units(t.credits)))
    }

    /// Rows from terms before `term_index`, grouped by term, that a row in
    /// `term_index` may be linked to as a retake.
    pub fn earlier_courses(&self, term_index: u32, exclude_row: Option<&str>) -> Vec<EarlierTerm> {
        self.terms
            .iter()
            .filter(|t| t.index < term_index)
            .filter_map(|t| {
                let courses: Vec<RetakeCandidate> = t
                    .rows
                    .iter()
                    .filter(|r| !r.id.is_empty() && Some(r.id.as_str()) != exclude_row)
                    .map(|r| RetakeCandidate {
                        row_id: r.id.clone(),
                        label: r.display_name().to_string(),
                        units: r.units,
                        grade: r.grade.clone(),
                    })
                    .collect();
                (!courses.is_empty()).then(|| EarlierTerm {
                    term_index: t.index,
                    term_name: t.display_name(),
                    courses,
                })
            })
            .collect()
    }
}

/// Deserializers that coerce loosely-typed input instead of rejecting it.
mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    use crate::numeric::{coerce_units, parse_units};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Integer(u64),
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    pub fn units<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Integer(n)) => coerce_units(n as f64),
            Some(Scalar::Number(n)) => coerce_units(n),
            Some(Scalar::Text(text)) => parse_units(&text),
            Some(Scalar::Other(_)) | None => 0.0,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Integer(n)) => n.to_string(),
            Some(Scalar::Number(n)) => n.to_string(),
            Some(Scalar::Text(text)) => text,
            Some(Scalar::Other(_)) | None => String::new(),
        })
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = text(deserializer)?;
        let trimmed = value.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}
