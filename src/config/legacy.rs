//! Legacy builder.conf conversion.
//!
//! Before versioning, builder.conf was an informal INI file: four sections of flat
//! `KEY=value` pairs, matched without regard to case. The file is read through the INI
//! format of the `config` crate; the converter maps those pairs onto the current schema,
//! captures the removed `[swupd] FORMAT` key, and rewrites the file with the current
//! version header.

use super::schema::{self, ConfigField, Section, FIELDS, FORMAT_KEY};
use super::MixConfig;
use crate::document::VersionedDocument;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Legacy keys whose names differ from the current schema.
/// Keys not listed here are matched against the current schema keys.
const LEGACY_KEYS: &[(Section, &str, ConfigField)] = &[
    (Section::Server, "debuginfo_banned", ConfigField::DebugInfoBanned),
    (Section::Server, "debuginfo_lib", ConfigField::DebugInfoLib),
    (Section::Server, "debuginfo_src", ConfigField::DebugInfoSrc),
    (Section::Mixer, "RPMDIR", ConfigField::LocalRpmDir),
    (Section::Mixer, "REPODIR", ConfigField::LocalRepoDir),
];

/// Values recovered from a legacy file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyConfig {
    /// Recognized fields, ordered by section then key; later entries win.
    pub values: Vec<(ConfigField, String)>,
    /// Value of the removed `[swupd] FORMAT` key, if present.
    pub format: Option<String>,
}

fn is_required(field: ConfigField) -> bool {
    FIELDS
        .iter()
        .any(|spec| spec.field == field && spec.required)
}

fn resolve_key(section: Section, key: &str) -> Option<ConfigField> {
    LEGACY_KEYS
        .iter()
        .find(|(s, k, _)| *s == section && k.eq_ignore_ascii_case(key))
        .map(|(_, _, field)| *field)
        .or_else(|| schema::lookup(section.as_str(), key).map(|spec| spec.field))
}

/// Parse the legacy layout with the INI reader of the `config` crate.
///
/// Sections and keys are matched without regard to case. Unknown sections and keys
/// (including keys outside any section) are skipped; malformed input fails.
pub fn parse_legacy(path: &Path, text: &str) -> Result<LegacyConfig, ConfigError> {
    let error = |source: ::config::ConfigError| ConfigError::LegacyParse {
        path: path.to_path_buf(),
        source,
    };

    let settings = ::config::Config::builder()
        .add_source(::config::File::from_str(text, ::config::FileFormat::Ini))
        .build()
        .map_err(error)?;
    let sections: HashMap<String, ::config::Value> = settings.try_deserialize().map_err(error)?;

    let mut sections: Vec<_> = sections.into_iter().collect();
    sections.sort_by(|a, b| a.0.cmp(&b.0));

    let mut parsed = LegacyConfig::default();
    for (name, value) in sections {
        let Some(section) = Section::parse(&name) else {
            debug!(section = %name, "Ignoring unknown legacy section");
            continue;
        };
        let Ok(table) = value.into_table() else {
            debug!(key = %name, "Ignoring legacy key outside a section");
            continue;
        };

        let mut entries: Vec<_> = table.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in entries {
            let value = value.into_string().map_err(error)?;

            if section == Section::Swupd && key.eq_ignore_ascii_case(FORMAT_KEY) {
                parsed.format = Some(value);
                continue;
            }

            match resolve_key(section, &key) {
                Some(field) => parsed.values.push((field, value)),
                None => debug!(section = %section, key = %key, "Ignoring unknown legacy key"),
            }
        }
    }

    Ok(parsed)
}

/// Convert the file behind `config` to the current schema and persist it.
///
/// Fields absent from the legacy file keep the values already held by `config`.
pub fn convert(config: &mut MixConfig) -> Result<(), ConfigError> {
    let path = config.filename().to_path_buf();
    let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
    let legacy = parse_legacy(&path, &text)?;

    for (field, value) in legacy.values {
        // Legacy tools wrote some required directories out empty; keep the defaults for those.
        if value.is_empty() && is_required(field) {
            debug!(?field, "Keeping default for empty legacy value");
            continue;
        }
        *config.field_mut(field) = value;
    }
    if let Some(format) = legacy.format {
        config.set_legacy_format(Some(format));
    }

    let latest = config.latest_version();
    info!(
        config_path = %path.display(),
        version = latest,
        "Converting config to the current format"
    );
    config.set_version(latest.to_string());
    config.save()
}
