//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gradepoint_core::model::Transcript;

/// A course-name pair applied to every loaded transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalencePair {
    pub course_a: String,
    pub course_b: String,
}

/// Top-level gradepoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradepointConfig {
    /// Output directory for saved reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Format used by `calc` when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Equivalences merged into every transcript.
    #[serde(default)]
    pub equivalences: Vec<EquivalencePair>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./gradepoint-results")
}
fn default_format() -> String {
    "text".to_string()
}

impl Default for GradepointConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: default_format(),
            equivalences: Vec::new(),
        }
    }
}

impl GradepointConfig {
    /// Add the configured equivalences to a transcript. Pairs the transcript
    /// already has, or that name a course with itself, are skipped.
    pub fn apply_equivalences(&self, transcript: &mut Transcript) -> usize {
        let mut added = 0;
        for pair in &self.equivalences {
            match transcript.add_equivalence(&pair.course_a, &pair.course_b) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        "ignoring configured equivalence {} = {}: {e}",
                        pair.course_a,
                        pair.course_b
                    );
                }
            }
        }
        added
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `gradepoint.toml` in the current directory
/// 2. `~/.config/gradepoint/config.toml`
///
/// `GRADEPOINT_OUTPUT_DIR` overrides `output_dir`.
pub fn load_config_from(path: Option<&Path>) -> Result<GradepointConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradepoint.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradepointConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradepointConfig::default(),
    };

    if let Ok(dir) = std::env::var("GRADEPOINT_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradepoint"))
}
