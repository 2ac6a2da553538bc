//! Mix State
//!
//! mixer.state tracks the build format and offline mode of a mix, separately from
//! builder.conf. State is cheap to default: a missing file is created on first load, and a
//! file with an older header is re-stamped with the current version. Values that cannot be
//! read from an older file fall back to the defaults.

use crate::document::{
    parse_version, render_document, write_document, VersionStatus, VersionedDocument,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod format;

pub use format::{FormatResolver, FormatSource, BUILTIN_FORMAT, DEFAULT_FORMAT_PATH};

/// Current revision of the mixer.state structure.
pub const CURRENT_STATE_VERSION: &str = "1.1";

/// Default state file name, relative to the working directory.
pub const STATE_FILENAME: &str = "mixer.state";

/// `[Mix]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixSection {
    #[serde(rename = "FORMAT")]
    pub format: String,
    #[serde(rename = "OFFLINE")]
    pub offline: String,
}

#[derive(Serialize)]
struct StateBody<'a> {
    #[serde(rename = "Mix")]
    mix: &'a MixSection,
}

/// Decoded body; absent keys leave the defaults in place.
#[derive(Debug, Default, Deserialize)]
struct PartialStateBody {
    #[serde(rename = "Mix", default)]
    mix: PartialMixSection,
}

#[derive(Debug, Default, Deserialize)]
struct PartialMixSection {
    #[serde(rename = "FORMAT")]
    format: Option<String>,
    #[serde(rename = "OFFLINE")]
    offline: Option<String>,
}

/// In-memory mixer.state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixState {
    pub mix: MixSection,

    filename: PathBuf,
    version: String,

    /// Diagnostic only, never persisted.
    format_source: FormatSource,
}

impl MixState {
    /// Defaults with the format resolved from the standard locations.
    pub fn load_defaults() -> Self {
        Self::load_defaults_with(&FormatResolver::default())
    }

    pub fn load_defaults_with(resolver: &FormatResolver) -> Self {
        let (format, format_source) = resolver.resolve();
        Self {
            mix: MixSection {
                format,
                offline: "false".to_string(),
            },
            filename: PathBuf::from(STATE_FILENAME),
            version: CURRENT_STATE_VERSION.to_string(),
            format_source,
        }
    }

    /// Load `filename` (default `mixer.state`), creating it if it does not exist.
    pub fn load(filename: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(filename, &FormatResolver::default())
    }

    pub fn load_with(
        filename: Option<&Path>,
        resolver: &FormatResolver,
    ) -> Result<Self, ConfigError> {
        let mut state = Self::load_defaults_with(resolver);
        if let Some(filename) = filename {
            state.filename = filename.to_path_buf();
        }

        match parse_version(&state)? {
            VersionStatus::Missing => {
                warn!(
                    state_path = %state.filename.display(),
                    "Using FORMAT value from {}",
                    state.format_source
                );
                state.save()?;
            }
            VersionStatus::Current => state.parse()?,
            status => {
                info!(
                    ?status,
                    state_path = %state.filename.display(),
                    "Converting state to version {}",
                    CURRENT_STATE_VERSION
                );
                if let Err(err) = state.parse() {
                    warn!(
                        error = %err,
                        state_path = %state.filename.display(),
                        "Discarding unreadable state values, keeping defaults"
                    );
                }
                state.version = CURRENT_STATE_VERSION.to_string();
                state.save()?;
            }
        }

        Ok(state)
    }

    /// Write the version header and the `[Mix]` section, replacing the file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let body = toml::to_string(&StateBody { mix: &self.mix })?;
        write_document(&self.filename, &render_document(&self.version, &body))
    }

    fn parse(&mut self) -> Result<(), ConfigError> {
        let text =
            std::fs::read_to_string(&self.filename).map_err(|e| ConfigError::io(&self.filename, e))?;
        let body: PartialStateBody =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: self.filename.clone(),
                source,
            })?;

        if let Some(format) = body.mix.format {
            self.mix.format = format;
            self.format_source = FormatSource::State(self.filename.clone());
        }
        if let Some(offline) = body.mix.offline {
            self.mix.offline = offline;
        }
        Ok(())
    }

    pub fn format(&self) -> &str {
        &self.mix.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.mix.format = format.into();
    }

    /// Offline flag; anything other than `true` (any case) reads as online.
    pub fn is_offline(&self) -> bool {
        self.mix.offline.trim().eq_ignore_ascii_case("true")
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.mix.offline = offline.to_string();
    }

    /// Where the current format value came from.
    pub fn format_source(&self) -> &FormatSource {
        &self.format_source
    }
}

impl VersionedDocument for MixState {
    fn filename(&self) -> &Path {
        &self.filename
    }

    fn set_filename(&mut self, filename: PathBuf) {
        self.filename = filename;
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn set_version(&mut self, version: String) {
        self.version = version;
    }

    fn latest_version(&self) -> &'static str {
        CURRENT_STATE_VERSION
    }
}
