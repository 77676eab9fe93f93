//! Best-grade selection within a retake group.
//!
//! "Best" is time-relative: only attempts made by the observation term are
//! considered. Attempts without a numeric value (withdrawals, passes,
//! ungraded) never win and are never excluded here.

use std::cmp::Ordering;

use crate::resolver::{GroupMember, RetakeGroup};

/// Orders numeric attempts: higher points, then later term, then later
/// position in the transcript.
fn rank(a: &GroupMember, b: &GroupMember) -> Ordering {
    let (pa, pb) = (
        a.grade.points().unwrap_or(f64::NEG_INFINITY),
        b.grade.points().unwrap_or(f64::NEG_INFINITY),
    );
    pa.total_cmp(&pb)
        .then(a.term_index.cmp(&b.term_index))
        .then(a.position.cmp(&b.position))
}

/// The attempt kept as of `as_of`, or `None` if no attempt made by then has
/// a numeric grade.
pub fn select_best(group: &RetakeGroup, as_of: u32) -> Option<&GroupMember> {
    group
        .members
        .iter()
        .filter(|m| m.term_index <= as_of && m.grade.is_numeric())
        .max_by(|a, b| rank(a, b))
}

/// The first observation term at which `member` is no longer the kept
/// attempt, or `None` if it is never superseded.
///
/// This is the term of the first better attempt, not simply the term after
/// the member: D in term 1 retaken as A in term 3 starts at term 3.
///
/// Dominance between attempts does not depend on the observation term, so
/// once a member is excluded it stays excluded for every later term.
pub fn exclusion_start(group: &RetakeGroup, member: &GroupMember) -> Option<u32> {
    if !member.grade.is_numeric() {
        return None;
    }
    let mut observations: Vec<u32> = group
        .members
        .iter()
        .map(|m| m.term_index)
        .filter(|&t| t >= member.term_index)
        .collect();
    observations.sort_unstable();
    observations.dedup();
    observations.into_iter().find(|&as_of| {
        select_best(group, as_of).is_some_and(|best| best.position != member.position)
    })
}
