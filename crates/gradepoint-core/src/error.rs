//! Transcript editing errors.
//!
//! The calculation engine never fails; these errors only come from the
//! editing operations on [`Transcript`](crate::model::Transcript), where a
//! request can name something that does not exist or break an invariant.

use thiserror::Error;

/// Errors returned by transcript editing operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptError {
    /// No term has this index.
    #[error("term {0} does not exist")]
    UnknownTerm(u32),

    /// A term position outside `1..=len + 1`.
    #[error("term position {position} is out of range (transcript has {len} terms)")]
    TermPositionOutOfRange { position: u32, len: usize },

    /// No course row has this identifier.
    #[error("course row {0} does not exist")]
    UnknownCourse(String),

    /// A course name that is empty after normalization.
    #[error("course name is empty")]
    EmptyCourseName,

    /// An equivalence pairing a course name with itself.
    #[error("a course cannot be equivalent to itself: {0}")]
    SelfEquivalence(String),

    /// No equivalence has this identifier.
    #[error("equivalence {0} does not exist")]
    UnknownEquivalence(u64),

    /// A row linked as a retake of itself.
    #[error("course row {0} cannot be a retake of itself")]
    SelfRetake(String),

    /// A retake link whose target is not in an earlier term.
    #[error("retake target {target} (term {target_term}) must be in a term before {term}")]
    RetakeNotEarlier {
        target: String,
        term: u32,
        target_term: u32,
    },

    /// No transfer entry has this identifier.
    #[error("transfer {0} does not exist")]
    UnknownTransfer(u64),
}

impl TranscriptError {
    /// Returns `true` if the error means a referenced item does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TranscriptError::UnknownTerm(_)
                | TranscriptError::UnknownCourse(_)
                | TranscriptError::UnknownEquivalence(_)
                | TranscriptError::UnknownTransfer(_)
        )
    }
}
