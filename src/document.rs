//! Versioned Documents
//!
//! Both mix documents start with a single `#VERSION <version>` header line, a blank line,
//! and then a TOML body. This module reads that header, classifies a document against the
//! version the running tool understands, and writes documents back to disk atomically.

use crate::error::ConfigError;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Marker that opens the header line of every persisted document.
pub const VERSION_PREFIX: &str = "#VERSION";

/// Contract shared by every on-disk document that carries a version header.
pub trait VersionedDocument {
    /// Path the document is loaded from and saved to.
    fn filename(&self) -> &Path;

    fn set_filename(&mut self, filename: PathBuf);

    /// Schema version currently held by this document.
    fn version(&self) -> &str;

    fn set_version(&mut self, version: String);

    /// Schema version the running tool reads and writes.
    fn latest_version(&self) -> &'static str;
}

/// Where a document stands relative to the latest schema version.
///
/// `Missing`, `Unversioned` and `Stale` all lead to `Current`: configs through the legacy
/// converter, state through a version bump. Only `Current` documents are decoded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    /// The file does not exist.
    Missing,
    /// The file exists but its first line is not a readable version header.
    Unversioned,
    /// The header names an older version.
    Stale(String),
    /// The header matches the latest version.
    Current,
}

impl VersionStatus {
    pub fn is_current(&self) -> bool {
        matches!(self, VersionStatus::Current)
    }
}

/// Read the header line of `doc`'s file and classify it against `doc.latest_version()`.
///
/// A missing file or a malformed header is not an error. A header naming a version newer
/// than the latest one is rejected, since the upgrade path only runs forward.
pub fn parse_version<D: VersionedDocument + ?Sized>(doc: &D) -> Result<VersionStatus, ConfigError> {
    let path = doc.filename();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(VersionStatus::Missing),
        Err(e) => return Err(ConfigError::io(path, e)),
    };

    let mut first_line = String::new();
    match BufReader::new(file).read_line(&mut first_line) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Ok(VersionStatus::Unversioned)
        }
        Err(e) => return Err(ConfigError::io(path, e)),
    }

    let Some(found) = header_version(&first_line) else {
        return Ok(VersionStatus::Unversioned);
    };

    let latest = doc.latest_version();
    if found == latest {
        return Ok(VersionStatus::Current);
    }

    match compare_versions(found, latest) {
        Some(Ordering::Greater) => Err(ConfigError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: found.to_string(),
            latest: latest.to_string(),
        }),
        _ => Ok(VersionStatus::Stale(found.to_string())),
    }
}

/// Extract the version token from a `#VERSION <version>` line.
pub fn header_version(line: &str) -> Option<&str> {
    let rest = line.trim_end().strip_prefix(VERSION_PREFIX)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        None
    } else {
        Some(token)
    }
}

/// Compare dotted numeric versions, padding the shorter one with zeros.
/// Returns `None` when either side has a non-numeric component.
fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let parse = |v: &str| {
        v.split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()
    };
    let (a, b) = (parse(a)?, parse(b)?);

    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

/// Prefix an encoded body with the version header.
pub fn render_document(version: &str, body: &str) -> String {
    format!("{} {}\n\n{}", VERSION_PREFIX, version, body)
}

/// Write `contents` to `path`, replacing any existing file.
///
/// Uses temporary file + rename so a failed write leaves the previous file intact.
pub fn write_document(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
    }

    let temp_path = temp_path(path);
    fs::write(&temp_path, contents).map_err(|e| ConfigError::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ConfigError::io(path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".tmp");
    path.with_file_name(name)
}
