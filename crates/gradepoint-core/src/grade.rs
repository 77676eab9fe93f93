//! The fixed grade scale.
//!
//! Every letter maps either to a numeric point value on the 4.0 scale or to
//! the non-punitive marker carried by withdrawals, passes and ungraded rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a grade is worth in GPA calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum GradeValue {
    /// Counts toward GPA at this many points per unit (0.0..=4.0).
    Numeric(f64),
    /// Counts toward attempted credits only. Never in the GPA denominator.
    NonPunitive,
}

impl GradeValue {
    /// The point value, or `None` for non-punitive grades.
    pub fn points(self) -> Option<f64> {
        match self {
            GradeValue::Numeric(points) => Some(points),
            GradeValue::NonPunitive => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, GradeValue::Numeric(_))
    }

    /// A grade earns its units only when its point value is above zero.
    pub fn earns_credit(self) -> bool {
        matches!(self, GradeValue::Numeric(points) if points > 0.0)
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeValue::Numeric(points) => write!(f, "{points:.1}"),
            GradeValue::NonPunitive => write!(f, "-"),
        }
    }
}

/// An ordered set of grade letters and their values.
#[derive(Debug, Clone, Copy)]
pub struct GradeScale {
    entries: &'static [(&'static str, GradeValue)],
}

const STANDARD_ENTRIES: &[(&str, GradeValue)] = &[
    ("A", GradeValue::Numeric(4.0)),
    ("A-", GradeValue::Numeric(3.7)),
    ("B+", GradeValue::Numeric(3.4)),
    ("B", GradeValue::Numeric(3.0)),
    ("B-", GradeValue::Numeric(2.7)),
    ("C+", GradeValue::Numeric(2.4)),
    ("C", GradeValue::Numeric(2.0)),
    ("C-", GradeValue::Numeric(1.7)),
    ("D+", GradeValue::Numeric(1.4)),
    ("D", GradeValue::Numeric(1.0)),
    ("D-", GradeValue::Numeric(0.7)),
    ("F", GradeValue::Numeric(0.0)),
    ("E", GradeValue::Numeric(0.0)),
    ("UW", GradeValue::Numeric(0.0)),
    ("W", GradeValue::NonPunitive),
    ("P", GradeValue::NonPunitive),
];

static STANDARD: GradeScale = GradeScale {
    entries: STANDARD_ENTRIES,
};

impl GradeScale {
    /// The 4.0 plus/minus scale. `E` is a synonym for `F`; `UW` counts as zero.
    pub fn standard() -> &'static GradeScale {
        &STANDARD
    }

    /// Grade letters in scale order, best first.
    pub fn letters(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(letter, _)| *letter)
    }

    /// Look up a grade. Input is trimmed and upper-cased first.
    ///
    /// Empty and unrecognised grades are non-punitive, so malformed data
    /// degrades to "no numeric value" instead of failing.
    pub fn value_of(&self, grade: &str) -> GradeValue {
        let normalized = normalize_grade(grade);
        self.entries
            .iter()
            .find(|(letter, _)| *letter == normalized)
            .map(|(_, value)| *value)
            .unwrap_or(GradeValue::NonPunitive)
    }

    /// Whether the grade is a scale letter or empty ("ungraded").
    pub fn is_known(&self, grade: &str) -> bool {
        let normalized = normalize_grade(grade);
        normalized.is_empty() || self.entries.iter().any(|(letter, _)| *letter == normalized)
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        STANDARD
    }
}

/// Trim and upper-case a grade letter.
pub fn normalize_grade(grade: &str) -> String {
    grade.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_values() {
        let scale = GradeScale::standard();
        assert_eq!(scale.value_of("A"), GradeValue::Numeric(4.0));
        assert_eq!(scale.value_of("B+"), GradeValue::Numeric(3.4));
        assert_eq!(scale.value_of("D-"), GradeValue::Numeric(0.7));
        assert_eq!(scale.value_of("UW"), GradeValue::Numeric(0.0));
        assert_eq!(scale.value_of("W"), GradeValue::NonPunitive);
        assert_eq!(scale.value_of("P"), GradeValue::NonPunitive);
    }

    #[test]
    fn e_is_synonym_for_f() {
        let scale = GradeScale::standard();
        assert_eq!(scale.value_of("E"), scale.value_of("F"));
    }

    #[test]
    fn lookup_normalizes_input() {
        let scale = GradeScale::standard();
        assert_eq!(scale.value_of(" a- "), GradeValue::Numeric(3.7));
        assert_eq!(scale.value_of("uw"), GradeValue::Numeric(0.0));
    }

    #[test]
    fn empty_and_unknown_are_non_punitive() {
        let scale = GradeScale::standard();
        assert_eq!(scale.value_of(""), GradeValue::NonPunitive);
        assert_eq!(scale.value_of("Z+"), GradeValue::NonPunitive);
        assert!(scale.is_known(""));
        assert!(!scale.is_known("Z+"));
    }

    #[test]
    fn letters_are_unique_and_ordered() {
        let letters: Vec<&str> = GradeScale::standard().letters().collect();
        let unique: HashSet<&str> = letters.iter().copied().collect();
        assert_eq!(letters.len(), unique.len());
        assert_eq!(letters.first(), Some(&"A"));
        assert_eq!(letters.len(), 16);
    }

    #[test]
    fn earns_credit_only_above_zero() {
        assert!(GradeValue::Numeric(0.7).earns_credit());
        assert!(!GradeValue::Numeric(0.0).earns_credit());
        assert!(!GradeValue::NonPunitive.earns_credit());
    }
}
