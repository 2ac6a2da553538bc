//! Static field table for builder.conf.
//!
//! Encoding, decoding, environment expansion and validation all walk [`FIELDS`] instead of
//! inspecting the config structs, so every field's on-disk key and required flag is
//! declared exactly once.

/// Top-level sections of builder.conf, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Builder,
    Swupd,
    Server,
    Mixer,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Builder,
        Section::Swupd,
        Section::Server,
        Section::Mixer,
    ];

    /// Section name as written on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Builder => "Builder",
            Section::Swupd => "Swupd",
            Section::Server => "Server",
            Section::Mixer => "Mixer",
        }
    }

    /// Case-insensitive lookup by on-disk name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every persisted field of builder.conf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Cert,
    ServerStateDir,
    VersionPath,
    DnfConf,
    Bundle,
    ContentUrl,
    VersionUrl,
    DebugInfoBanned,
    DebugInfoLib,
    DebugInfoSrc,
    LocalBundleDir,
    LocalRepoDir,
    LocalRpmDir,
    DockerImagePath,
}

/// Schema entry: where a field lives, what it is called, and whether it may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub section: Section,
    pub field: ConfigField,
    /// Internal field name, used when no on-disk key is declared.
    pub name: &'static str,
    /// On-disk key inside the section.
    pub key: &'static str,
    pub required: bool,
}

impl FieldSpec {
    /// Name used in diagnostics: the on-disk key, or the internal name without one.
    pub fn display_name(&self) -> &'static str {
        if self.key.is_empty() {
            self.name
        } else {
            self.key
        }
    }
}

/// Deprecated `[Swupd]` key; the value now lives in the state file.
pub const FORMAT_KEY: &str = "FORMAT";

const fn spec(
    section: Section,
    field: ConfigField,
    name: &'static str,
    key: &'static str,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        section,
        field,
        name,
        key,
        required,
    }
}

/// Schema of the current config version.
pub const FIELDS: &[FieldSpec] = &[
    // [Builder]
    spec(Section::Builder, ConfigField::Cert, "cert", "CERT", true),
    spec(
        Section::Builder,
        ConfigField::ServerStateDir,
        "server_state_dir",
        "SERVER_STATE_DIR",
        true,
    ),
    spec(
        Section::Builder,
        ConfigField::VersionPath,
        "version_path",
        "VERSIONS_PATH",
        true,
    ),
    spec(Section::Builder, ConfigField::DnfConf, "dnf_conf", "YUM_CONF", true),
    // [Swupd]
    spec(Section::Swupd, ConfigField::Bundle, "bundle", "BUNDLE", false),
    spec(
        Section::Swupd,
        ConfigField::ContentUrl,
        "content_url",
        "CONTENTURL",
        false,
    ),
    spec(
        Section::Swupd,
        ConfigField::VersionUrl,
        "version_url",
        "VERSIONURL",
        false,
    ),
    // [Server]
    spec(
        Section::Server,
        ConfigField::DebugInfoBanned,
        "debug_info_banned",
        "DEBUG_INFO_BANNED",
        false,
    ),
    spec(
        Section::Server,
        ConfigField::DebugInfoLib,
        "debug_info_lib",
        "DEBUG_INFO_LIB",
        false,
    ),
    spec(
        Section::Server,
        ConfigField::DebugInfoSrc,
        "debug_info_src",
        "DEBUG_INFO_SRC",
        false,
    ),
    // [Mixer]
    spec(
        Section::Mixer,
        ConfigField::LocalBundleDir,
        "local_bundle_dir",
        "LOCAL_BUNDLE_DIR",
        true,
    ),
    spec(
        Section::Mixer,
        ConfigField::LocalRepoDir,
        "local_repo_dir",
        "LOCAL_REPO_DIR",
        true,
    ),
    spec(
        Section::Mixer,
        ConfigField::LocalRpmDir,
        "local_rpm_dir",
        "LOCAL_RPM_DIR",
        true,
    ),
    spec(
        Section::Mixer,
        ConfigField::DockerImagePath,
        "docker_image_path",
        "DOCKER_IMAGE_PATH",
        false,
    ),
];

/// Find the schema entry for `section.key`, ignoring case on both parts.
pub fn lookup(section: &str, key: &str) -> Option<&'static FieldSpec> {
    let section = Section::parse(section)?;
    FIELDS
        .iter()
        .find(|spec| spec.section == section && spec.key.eq_ignore_ascii_case(key))
}
