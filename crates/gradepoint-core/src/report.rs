//! Transcript reports with JSON persistence and a Markdown rendering.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{analyze_through, TranscriptAnalysis};
use crate::model::Transcript;
use crate::numeric::{fmt_credits, fmt_gpa};

/// A saved analysis of one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub transcript_name: String,
    /// Last term included.
    pub as_of: u32,
    pub analysis: TranscriptAnalysis,
}

impl TranscriptReport {
    /// Analyze `transcript` through `as_of` and wrap the result.
    pub fn generate(transcript: &Transcript, as_of: u32) -> Self {
        Self::from_analysis(&transcript.name, analyze_through(transcript, as_of))
    }

    pub fn from_analysis(transcript_name: &str, analysis: TranscriptAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            transcript_name: transcript_name.to_string(),
            as_of: analysis.as_of,
            analysis,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: TranscriptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// File stem used for saved reports: `<name>-<short id>`.
    pub fn file_stem(&self) -> String {
        let name: String = self
            .transcript_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let name = name.trim_matches('-');
        let short_id = &self.id.simple().to_string()[..8];
        if name.is_empty() {
            format!("transcript-{short_id}")
        } else {
            format!("{name}-{short_id}")
        }
    }

    /// Render the per-term table and summary as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let title = if self.transcript_name.is_empty() {
            "Transcript"
        } else {
            &self.transcript_name
        };
        let _ = writeln!(out, "# {title}\n");
        let _ = writeln!(
            out,
            "| Term | Attempted | Earned | Quality Points | GPA | Cumulative GPA |"
        );
        let _ = writeln!(
            out,
            "|------|-----------|--------|----------------|-----|----------------|"
        );
        for t in &self.analysis.terms {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                t.name,
                fmt_credits(t.term.attempted),
                fmt_credits(t.term.earned),
                fmt_credits(t.term.quality_points),
                fmt_gpa(t.term.gpa),
                fmt_gpa(t.cumulative.gpa),
            );
        }

        let s = &self.analysis.summary;
        let _ = writeln!(out, "\n## Summary (as of term {})\n", s.institution.as_of);
        let _ = writeln!(out, "- Attempted: {}", fmt_credits(s.institution.attempted));
        let _ = writeln!(out, "- Earned: {}", fmt_credits(s.institution.earned));
        let _ = writeln!(
            out,
            "- Quality points: {}",
            fmt_credits(s.institution.quality_points)
        );
        let _ = writeln!(out, "- GPA: {}", fmt_gpa(s.institution.gpa));
        if s.transfer_earned > 0.0 {
            let _ = writeln!(out, "- Transfer earned: {}", fmt_credits(s.transfer_earned));
            let _ = writeln!(out, "- Overall earned: {}", fmt_credits(s.overall_earned));
        }
        out
    }
}
