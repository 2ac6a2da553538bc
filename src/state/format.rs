//! Default build format resolution.
//!
//! Sources, first hit wins: a `FORMAT` key left in builder.conf, the system-wide swupd
//! format file, and finally a built-in value.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// System-wide format file installed by swupd.
pub const DEFAULT_FORMAT_PATH: &str = "/usr/share/defaults/swupd/format";

/// Format used when no other source provides one.
pub const BUILTIN_FORMAT: &str = "1";

static CONFIG_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*FORMAT[\s"=]*([0-9]+)[\s"]*$"#).expect("regex"));

/// Where the default format value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSource {
    Config(PathBuf),
    System(PathBuf),
    Builtin,
    /// Read back from an existing state file.
    State(PathBuf),
}

impl std::fmt::Display for FormatSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatSource::Config(path) | FormatSource::System(path) | FormatSource::State(path) => {
                write!(f, "{}", path.display())
            }
            FormatSource::Builtin => write!(f, "Mixer internal value"),
        }
    }
}

/// Resolves the default format from the config file, the system file, then a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResolver {
    pub config_path: PathBuf,
    pub system_path: PathBuf,
}

impl Default for FormatResolver {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(crate::config::CONFIG_FILENAME),
            system_path: PathBuf::from(DEFAULT_FORMAT_PATH),
        }
    }
}

impl FormatResolver {
    pub fn new(config_path: impl Into<PathBuf>, system_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            system_path: system_path.into(),
        }
    }

    /// Resolve the format and report its source. Unreadable sources are skipped.
    pub fn resolve(&self) -> (String, FormatSource) {
        if let Some(format) = format_from_config(&self.config_path) {
            return (format, FormatSource::Config(self.config_path.clone()));
        }

        match std::fs::read_to_string(&self.system_path) {
            Ok(contents) => {
                return (
                    contents.trim().to_string(),
                    FormatSource::System(self.system_path.clone()),
                );
            }
            Err(e) => debug!(
                path = %self.system_path.display(),
                error = %e,
                "System format file unavailable"
            ),
        }

        (BUILTIN_FORMAT.to_string(), FormatSource::Builtin)
    }
}

/// Pull a numeric `FORMAT` value out of the raw config text, migrated or not.
fn format_from_config(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    find_format(&text)
}

fn find_format(text: &str) -> Option<String> {
    CONFIG_FORMAT
        .captures(text)
        .map(|caps| caps[1].to_string())
}
