//! Transcript analysis.
//!
//! One pass resolves groups and exclusions once, then computes term-level and
//! cumulative figures for every term. Nothing is cached between calls; every
//! edit to a transcript is followed by a fresh [`analyze`].

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::model::Transcript;
use crate::resolver::{build_exclusion_map, resolve_groups, ExclusionMap, GroupIndex};
use crate::statistics::{
    compute_cumulative, compute_term, summarize_as_of, CumulativeStats, TermStats,
    TranscriptSummary,
};

/// Figures for one term: its own and cumulative as of that term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermReport {
    pub index: u32,
    pub name: String,
    pub term: TermStats,
    pub cumulative: CumulativeStats,
}

/// Everything derived from a transcript snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    /// Last term included in the analysis.
    pub as_of: u32,
    pub groups: GroupIndex,
    pub exclusions: ExclusionMap,
    pub terms: Vec<TermReport>,
    pub summary: TranscriptSummary,
}

impl TranscriptAnalysis {
    pub fn term(&self, index: u32) -> Option<&TermReport> {
        self.terms.iter().find(|t| t.index == index)
    }

    /// Cumulative figures as of the last analyzed term.
    pub fn cumulative(&self) -> CumulativeStats {
        self.summary.institution
    }
}

/// Analyze every term of a transcript.
pub fn analyze(transcript: &Transcript) -> TranscriptAnalysis {
    analyze_through(transcript, transcript.last_term_index())
}

/// Analyze terms up to and including `as_of`.
///
/// Groups and exclusion starts still cover the whole transcript, so later
/// attempts show up in the exclusion map even when their terms are cut off.
pub fn analyze_through(transcript: &Transcript, as_of: u32) -> TranscriptAnalysis {
    let start = Instant::now();
    let groups = resolve_groups(&transcript.terms, &transcript.equivalences);
    let exclusions = build_exclusion_map(&groups);

    let terms: Vec<TermReport> = transcript
        .terms
        .iter()
        .filter(|t| t.index <= as_of)
        .map(|t| TermReport {
            index: t.index,
            name: t.display_name(),
            term: compute_term(t, &exclusions),
            cumulative: compute_cumulative(&transcript.terms, t.index, &groups),
        })
        .collect();

    let summary = summarize_as_of(transcript, as_of, &groups);

    tracing::debug!(
        terms = terms.len(),
        groups = groups.len(),
        excluded = exclusions.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "analyzed transcript"
    );

    TranscriptAnalysis {
        as_of,
        groups,
        exclusions,
        terms,
        summary,
    }
}
