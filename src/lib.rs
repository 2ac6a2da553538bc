//! Mixer: Versioned Mix Configuration and State
//!
//! Loads, converts, validates and saves the two documents a mix build reads: builder.conf
//! (paths, URLs, feature flags) and mixer.state (build format, offline flag). Both carry a
//! `#VERSION` header so files written by older releases can be upgraded in place.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod state;

pub use config::MixConfig;
pub use document::{VersionStatus, VersionedDocument};
pub use error::ConfigError;
pub use state::MixState;
