// (c) 2024 Ross Younger
//! # Configuration management
//!
//! localca obtains run-time configuration from the following sources, in order:
//! 1. Command-line options
//! 2. Environment variables prefixed `LOCALCA_`
//! 3. The user's configuration file (`~/.localca.toml`)
//! 4. The system-wide configuration file (`/etc/localca.toml`)
//! 5. Hard-wired defaults
//!
//! Each option may appear in multiple places, but only the first match is used.
//!
//! ## File format
//!
//! Configuration files are TOML.
//!
//! ### Example
//!
//! ```text
//! common_name = "build-server.internal"
//! organization = "Example Ltd"
//! validity_days = 30
//! subject_alt_names = ["127.0.0.1", "::1", "192.168.1.10"]
//! min_tls_version = "1.3"
//! ```
//!
//! ## Configurable options
//!
//! The full list of supported fields is defined by [Configuration].
//!
//! On the command line:
//! * `localca --show-config` outputs a list of supported fields, their current values, and where each value came from.
//! * `localca --config-files` outputs the list of configuration files for the current user and platform.

mod structure;
pub use structure::Configuration;

mod manager;
pub use manager::{Manager, SourcesTable};

pub(crate) const BASE_CONFIG_FILENAME: &str = "localca.toml";
pub(crate) const ENV_PREFIX: &str = "LOCALCA_";
