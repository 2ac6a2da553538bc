//! Mix Configuration
//!
//! builder.conf holds the paths, URLs and flags a mix build needs. The file carries a
//! `#VERSION` header; files written by older releases are converted in place before they
//! are decoded. After decoding, `$NAME` / `${NAME}` references are expanded from the process
//! environment and required fields are checked. A document is only handed out once all of
//! these steps succeed.

use crate::document::{
    parse_version, render_document, write_document, VersionStatus, VersionedDocument,
};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod env;
pub mod legacy;
pub mod schema;

pub use schema::{ConfigField, FieldSpec, Section, FIELDS};

/// Current revision of the builder.conf structure.
pub const CURRENT_CONFIG_VERSION: &str = "1.0";

/// Default file name of the config, relative to the mix workspace.
pub const CONFIG_FILENAME: &str = "builder.conf";

const DEFAULT_BUNDLE: &str = "os-core-update";
const DEFAULT_CONTENT_URL: &str = "<URL where the content will be hosted>";
const DEFAULT_VERSION_URL: &str = "<URL where the version of the mix will be hosted>";
const DEFAULT_DEBUG_INFO_BANNED: &str = "true";
const DEFAULT_DEBUG_INFO_LIB: &str = "/usr/lib/debug";
const DEFAULT_DEBUG_INFO_SRC: &str = "/usr/src/debug";
const DEFAULT_DOCKER_IMAGE: &str = "clearlinux/mixer";

/// `[Builder]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderConf {
    pub cert: String,
    pub server_state_dir: String,
    pub version_path: String,
    pub dnf_conf: String,
}

/// `[Swupd]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwupdConf {
    pub bundle: String,
    pub content_url: String,
    pub version_url: String,
}

/// `[Server]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConf {
    pub debug_info_banned: String,
    pub debug_info_lib: String,
    pub debug_info_src: String,
}

/// `[Mixer]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixerConf {
    pub local_bundle_dir: String,
    pub local_repo_dir: String,
    pub local_rpm_dir: String,
    pub docker_image_path: String,
}

/// In-memory builder.conf.
///
/// The section structs are the persisted data. File name, version and the deprecated
/// `FORMAT` value are bookkeeping and only reach the file through the header and the
/// `[Swupd]` section respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixConfig {
    pub builder: BuilderConf,
    pub swupd: SwupdConf,
    pub server: ServerConf,
    pub mixer: MixerConf,

    filename: PathBuf,
    version: String,

    /// `[Swupd] FORMAT` moved to mixer.state. Kept while present in the file so the
    /// state can pick it up and the user is warned on every load.
    legacy_format: Option<String>,
}

impl MixConfig {
    /// Defaults anchored at the current working directory.
    pub fn load_defaults() -> Result<Self, ConfigError> {
        let pwd = std::env::current_dir().map_err(ConfigError::WorkingDirectory)?;
        Ok(Self::load_defaults_for_path(&pwd))
    }

    /// Defaults anchored at `path`: file and directory settings become subpaths of it.
    pub fn load_defaults_for_path(path: &Path) -> Self {
        let join = |name: &str| path.join(name).to_string_lossy().into_owned();

        Self {
            builder: BuilderConf {
                cert: join("Swupd_Root.pem"),
                server_state_dir: join("update"),
                version_path: path.to_string_lossy().into_owned(),
                dnf_conf: join(".yum-mix.conf"),
            },
            swupd: SwupdConf {
                bundle: DEFAULT_BUNDLE.to_string(),
                content_url: DEFAULT_CONTENT_URL.to_string(),
                version_url: DEFAULT_VERSION_URL.to_string(),
            },
            server: ServerConf {
                debug_info_banned: DEFAULT_DEBUG_INFO_BANNED.to_string(),
                debug_info_lib: DEFAULT_DEBUG_INFO_LIB.to_string(),
                debug_info_src: DEFAULT_DEBUG_INFO_SRC.to_string(),
            },
            mixer: MixerConf {
                local_bundle_dir: join("local-bundles"),
                local_repo_dir: join("local-yum"),
                local_rpm_dir: join("local-rpms"),
                docker_image_path: DEFAULT_DOCKER_IMAGE.to_string(),
            },
            filename: path.join(CONFIG_FILENAME),
            version: CURRENT_CONFIG_VERSION.to_string(),
            legacy_format: None,
        }
    }

    /// Write a default builder.conf into the current working directory.
    pub fn create_default_config() -> Result<Self, ConfigError> {
        let config = Self::load_defaults()?;
        config.save()?;
        Ok(config)
    }

    /// Load builder.conf from `filename`, or from `<cwd>/builder.conf` when `None`.
    pub fn load(filename: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load_defaults()?;
        config.load_from(filename)?;
        Ok(config)
    }

    /// Load over the values already held by `self`.
    ///
    /// Keys missing from the file keep their current value. Stale files are converted and
    /// rewritten first. On error, `self` must be discarded.
    pub fn load_from(&mut self, filename: Option<&Path>) -> Result<(), ConfigError> {
        self.init_config_path(filename)?;

        match parse_version(&*self)? {
            VersionStatus::Current => {}
            VersionStatus::Missing => {
                return Err(ConfigError::io(
                    &self.filename,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            }
            status => {
                debug!(?status, config_path = %self.filename.display(), "Config needs conversion");
                legacy::convert(self)?;
            }
        }

        self.parse()?;
        self.version = CURRENT_CONFIG_VERSION.to_string();
        self.expand_env()?;
        self.validate()
    }

    /// Convert an outdated config file without loading it.
    ///
    /// Returns `false` when the file is already current.
    pub fn convert(&mut self, filename: Option<&Path>) -> Result<bool, ConfigError> {
        *self = Self::load_defaults()?;
        self.init_config_path(filename)?;

        match parse_version(&*self)? {
            VersionStatus::Current => Ok(false),
            VersionStatus::Missing => Err(ConfigError::io(
                &self.filename,
                std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            )),
            _ => {
                legacy::convert(self)?;
                Ok(true)
            }
        }
    }

    /// Use `path` as the config file, or `<cwd>/builder.conf` when `None`.
    pub fn init_config_path(&mut self, path: Option<&Path>) -> Result<(), ConfigError> {
        self.filename = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()
                .map_err(ConfigError::WorkingDirectory)?
                .join(CONFIG_FILENAME),
        };
        Ok(())
    }

    /// Write the version header and the encoded sections, replacing the file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let body = self.encode_body()?;
        write_document(&self.filename, &render_document(&self.version, &body))
    }

    /// Encoded sections as they would be saved, without the version header.
    pub fn render(&self) -> Result<String, ConfigError> {
        self.encode_body()
    }

    /// Print the in-memory values to stdout.
    pub fn print(&self) -> Result<(), ConfigError> {
        println!("{}", self.render()?);
        Ok(())
    }

    /// Check that every required field is non-empty.
    ///
    /// Reports the first offending field by its on-disk key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(spec) = FIELDS
            .iter()
            .find(|spec| spec.required && self.field(spec.field).is_empty())
        {
            return Err(ConfigError::MissingField(spec.display_name().to_string()));
        }

        if self.has_format_field() {
            warn!("FORMAT value was transferred to mixer.state file");
        }

        Ok(())
    }

    pub fn field(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::Cert => &self.builder.cert,
            ConfigField::ServerStateDir => &self.builder.server_state_dir,
            ConfigField::VersionPath => &self.builder.version_path,
            ConfigField::DnfConf => &self.builder.dnf_conf,
            ConfigField::Bundle => &self.swupd.bundle,
            ConfigField::ContentUrl => &self.swupd.content_url,
            ConfigField::VersionUrl => &self.swupd.version_url,
            ConfigField::DebugInfoBanned => &self.server.debug_info_banned,
            ConfigField::DebugInfoLib => &self.server.debug_info_lib,
            ConfigField::DebugInfoSrc => &self.server.debug_info_src,
            ConfigField::LocalBundleDir => &self.mixer.local_bundle_dir,
            ConfigField::LocalRepoDir => &self.mixer.local_repo_dir,
            ConfigField::LocalRpmDir => &self.mixer.local_rpm_dir,
            ConfigField::DockerImagePath => &self.mixer.docker_image_path,
        }
    }

    pub fn field_mut(&mut self, field: ConfigField) -> &mut String {
        match field {
            ConfigField::Cert => &mut self.builder.cert,
            ConfigField::ServerStateDir => &mut self.builder.server_state_dir,
            ConfigField::VersionPath => &mut self.builder.version_path,
            ConfigField::DnfConf => &mut self.builder.dnf_conf,
            ConfigField::Bundle => &mut self.swupd.bundle,
            ConfigField::ContentUrl => &mut self.swupd.content_url,
            ConfigField::VersionUrl => &mut self.swupd.version_url,
            ConfigField::DebugInfoBanned => &mut self.server.debug_info_banned,
            ConfigField::DebugInfoLib => &mut self.server.debug_info_lib,
            ConfigField::DebugInfoSrc => &mut self.server.debug_info_src,
            ConfigField::LocalBundleDir => &mut self.mixer.local_bundle_dir,
            ConfigField::LocalRepoDir => &mut self.mixer.local_repo_dir,
            ConfigField::LocalRpmDir => &mut self.mixer.local_rpm_dir,
            ConfigField::DockerImagePath => &mut self.mixer.docker_image_path,
        }
    }

    /// Look up a value by `Section.KEY`, ignoring case.
    pub fn get_property(&self, property: &str) -> Option<&str> {
        let (section, key) = property.split_once('.')?;
        schema::lookup(section, key).map(|spec| self.field(spec.field))
    }

    /// Whether the loaded file still carries the deprecated `[Swupd] FORMAT` key.
    pub fn has_format_field(&self) -> bool {
        self.legacy_format.is_some()
    }

    /// Value of the deprecated `[Swupd] FORMAT` key, if the file had one.
    pub fn legacy_format(&self) -> Option<&str> {
        self.legacy_format.as_deref()
    }

    pub(crate) fn set_legacy_format(&mut self, format: Option<String>) {
        self.legacy_format = format;
    }

    fn encode_body(&self) -> Result<String, ConfigError> {
        let mut sections: BTreeMap<&'static str, toml::Table> = BTreeMap::new();
        for section in Section::ALL {
            sections.insert(section.as_str(), toml::Table::new());
        }

        for spec in FIELDS {
            sections.entry(spec.section.as_str()).or_default().insert(
                spec.key.to_string(),
                toml::Value::String(self.field(spec.field).to_string()),
            );
        }

        if let Some(format) = &self.legacy_format {
            sections.entry(Section::Swupd.as_str()).or_default().insert(
                schema::FORMAT_KEY.to_string(),
                toml::Value::String(format.clone()),
            );
        }

        Ok(toml::to_string(&sections)?)
    }

    fn parse(&mut self) -> Result<(), ConfigError> {
        let text =
            std::fs::read_to_string(&self.filename).map_err(|e| ConfigError::io(&self.filename, e))?;
        self.decode_body(&text)
    }

    /// Overwrite fields present in `text`; unknown sections and keys are ignored.
    fn decode_body(&mut self, text: &str) -> Result<(), ConfigError> {
        let root: toml::Table = text.parse().map_err(|source| ConfigError::Parse {
            path: self.filename.clone(),
            source,
        })?;

        self.legacy_format = None;

        for (section_name, section_value) in &root {
            let Some(section) = Section::parse(section_name) else {
                continue;
            };
            let Some(table) = section_value.as_table() else {
                continue;
            };

            for (key, value) in table {
                if section == Section::Swupd && key.eq_ignore_ascii_case(schema::FORMAT_KEY) {
                    self.legacy_format = Some(match value {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                    continue;
                }

                let Some(spec) = schema::lookup(section.as_str(), key) else {
                    continue;
                };
                let toml::Value::String(value) = value else {
                    return Err(ConfigError::InvalidValue {
                        key: format!("{}.{}", section, spec.key),
                        message: format!("expected a string, found {}", value.type_str()),
                    });
                };
                *self.field_mut(spec.field) = value.clone();
            }
        }

        Ok(())
    }

    fn expand_env(&mut self) -> Result<(), ConfigError> {
        self.expand_env_with(env::process_env)
    }

    /// Expand env references in every field, or in none of them.
    pub(crate) fn expand_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = FIELDS.iter().map(|spec| self.field(spec.field));
        if let Some(name) = env::first_undefined_with(values, &lookup) {
            return Err(ConfigError::UndefinedEnvVar(name));
        }

        for spec in FIELDS {
            let expanded = env::expand_with(self.field(spec.field), &lookup);
            *self.field_mut(spec.field) = expanded;
        }
        Ok(())
    }
}

impl VersionedDocument for MixConfig {
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
        CURRENT_CONFIG_VERSION
    }
}
