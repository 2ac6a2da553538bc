//! Shared test utilities for integration tests

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Serializes process environment mutation across tests running in parallel.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// A complete current-version builder.conf rooted at `base`.
pub fn current_config(base: &str) -> String {
    format!(
        r#"#VERSION 1.0

# hand-edited
[Builder]
CERT = "{base}/Swupd_Root.pem"
SERVER_STATE_DIR = "{base}/update"
VERSIONS_PATH = "{base}"
YUM_CONF = "{base}/.yum-mix.conf"

[Swupd]
BUNDLE = "os-core-update"
CONTENTURL = "http://example.com/update"
VERSIONURL = "http://example.com/update"

[Server]
DEBUG_INFO_BANNED = "true"
DEBUG_INFO_LIB = "/usr/lib/debug"
DEBUG_INFO_SRC = "/usr/src/debug"

[Mixer]
LOCAL_BUNDLE_DIR = "{base}/local-bundles"
LOCAL_REPO_DIR = "{base}/local-yum"
LOCAL_RPM_DIR = "{base}/local-rpms"
DOCKER_IMAGE_PATH = "clearlinux/mixer"
"#
    )
}
