//! Transcript file loading, saving and validation.
//!
//! Transcripts are stored as JSON or TOML, chosen by file extension.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

use crate::grade::GradeScale;
use crate::model::{normalize_course_name, Transcript};

/// On-disk transcript format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Json,
    Toml,
}

impl TranscriptFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(TranscriptFormat::Json),
            Some("toml") => Ok(TranscriptFormat::Toml),
            _ => anyhow::bail!(
                "unsupported transcript file (expected .json or .toml): {}",
                path.display()
            ),
        }
    }
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptFormat::Json => write!(f, "json"),
            TranscriptFormat::Toml => write!(f, "toml"),
        }
    }
}

/// Load a transcript file and restore its invariants.
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let format = TranscriptFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript file: {}", path.display()))?;
    let mut transcript = parse_transcript_str(&content, format)
        .with_context(|| format!("failed to parse transcript: {}", path.display()))?;
    if transcript.name.trim().is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            transcript.name = stem.to_string();
        }
    }
    Ok(transcript)
}

/// Parse a transcript from a string. Terms are renumbered positionally and
/// the row id counter is moved past every numeric id.
pub fn parse_transcript_str(content: &str, format: TranscriptFormat) -> Result<Transcript> {
    let mut transcript: Transcript = match format {
        TranscriptFormat::Json => {
            serde_json::from_str(content).context("failed to parse transcript JSON")?
        }
        TranscriptFormat::Toml => toml::from_str(content).context("failed to parse transcript TOML")?,
    };
    transcript.normalize();
    Ok(transcript)
}

/// Serialize a transcript in the given format.
pub fn transcript_to_string(transcript: &Transcript, format: TranscriptFormat) -> Result<String> {
    match format {
        TranscriptFormat::Json => {
            serde_json::to_string_pretty(transcript).context("failed to serialize transcript")
        }
        TranscriptFormat::Toml => {
            toml::to_string_pretty(transcript).context("failed to serialize transcript")
        }
    }
}

/// Write a transcript, creating parent directories as needed.
pub fn save_transcript(transcript: &Transcript, path: &Path) -> Result<()> {
    let format = TranscriptFormat::from_path(path)?;
    let content = transcript_to_string(transcript, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write transcript to {}", path.display()))?;
    Ok(())
}

/// Recursively load every `.json` and `.toml` transcript in a directory.
/// Files that fail to parse are skipped with a warning.
pub fn load_transcript_directory(dir: &Path) -> Result<Vec<Transcript>> {
    let mut transcripts = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            transcripts.extend(load_transcript_directory(&path)?);
        } else if TranscriptFormat::from_path(&path).is_ok() {
            match load_transcript(&path) {
                Ok(t) => transcripts.push(t),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(transcripts)
}

/// A data-quality issue found in a transcript. None of these stop the
/// calculation; they explain results that may look surprising.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The row concerned, if any.
    pub row_id: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn row(row_id: &str, message: String) -> Self {
        Self {
            row_id: Some(row_id.to_string()),
            message,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.row_id {
            Some(id) => write!(f, "row {id}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Check a transcript for common data problems.
pub fn validate_transcript(transcript: &Transcript) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let scale = GradeScale::standard();

    let mut seen = HashSet::new();
    let mut term_of: HashMap<&str, u32> = HashMap::new();
    for (term, row) in transcript.rows() {
        if !seen.insert(row.id.as_str()) {
            warnings.push(ValidationWarning::row(
                &row.id,
                format!("duplicate row id: {}", row.id),
            ));
        } else {
            term_of.insert(row.id.as_str(), term);
        }
    }

    for (term, row) in transcript.rows() {
        if !scale.is_known(&row.grade) {
            warnings.push(ValidationWarning::row(
                &row.id,
                format!(
                    "unknown grade '{}' is treated as non-punitive",
                    row.grade.trim()
                ),
            ));
        }

        let Some(target) = row.retake_of.as_deref() else {
            continue;
        };
        if target == row.id {
            warnings.push(ValidationWarning::row(
                &row.id,
                "row is marked as a retake of itself".into(),
            ));
            continue;
        }
        match term_of.get(target) {
            None => warnings.push(ValidationWarning::row(
                &row.id,
                format!("retake link points to missing row {target} and is ignored"),
            )),
            Some(&target_term) if target_term >= term => {
                warnings.push(ValidationWarning::row(
                    &row.id,
                    format!(
                        "retake target {target} is in term {target_term}, not before term {term}"
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    let names: HashSet<String> = transcript
        .rows()
        .map(|(_, r)| r.normalized_name())
        .filter(|n| !n.is_empty())
        .collect();
    for eq in &transcript.equivalences {
        for name in [&eq.course_a, &eq.course_b] {
            if !names.contains(&normalize_course_name(name)) {
                warnings.push(ValidationWarning {
                    row_id: None,
                    message: format!(
                        "equivalence {} names {name}, which is not in the transcript",
                        eq.id
                    ),
                });
            }
        }
    }

    warnings
}
