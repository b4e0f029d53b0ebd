// localca command-line arguments
// (c) 2024 Ross Younger

use std::{net::IpAddr, path::PathBuf};

use clap::Parser;
use serde::Serialize;

use crate::identity::TlsVersion;

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version(env!("LOCALCA_VERSION_STRING")),
    about,
    before_help = "e.g.   localca --print-ca      localca --cert server.pem",
    infer_long_args(true)
)]
#[command(help_template(
    "\
{name} version {version}
{about-with-newline}
{usage-heading} {usage}
{before-help}
{all-args}{after-help}
"
))]
#[command(styles=super::styles::CLAP_STYLES)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CliArgs {
    // MODE SELECTION ======================================================================
    /// Describes and fingerprints an existing PEM certificate instead of generating an identity
    #[arg(
        long,
        value_name("FILE"),
        help_heading("Modes"),
        conflicts_with_all(["print_ca", "show_config", "config_files"])
    )]
    pub(crate) cert: Option<PathBuf>,

    /// Outputs the active configuration, and where each value came from, then exits
    #[arg(long, action, help_heading("Configuration"))]
    pub(crate) show_config: bool,

    /// Outputs the paths of the configuration files localca reads, then exits
    #[arg(long, action, help_heading("Configuration"))]
    pub(crate) config_files: bool,

    /// Reads an additional configuration file (TOML), which takes priority over the standard ones
    #[arg(short = 'c', long, value_name("FILE"), help_heading("Configuration"))]
    pub(crate) config: Option<PathBuf>,

    // OUTPUT ==============================================================================
    /// Also prints the generated authority certificate, so clients can be told to trust it
    #[arg(long, action, help_heading("Output"))]
    pub(crate) print_ca: bool,

    /// Also prints the generated server certificate
    #[arg(long, action, help_heading("Output"))]
    pub(crate) print_cert: bool,

    /// Quiet mode; reports only errors
    #[arg(short, long, action, conflicts_with("debug"), help_heading("Output"))]
    pub(crate) quiet: bool,

    // DEBUG ===============================================================================
    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=localca=debug` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action, help_heading("Debug"))]
    pub(crate) debug: bool,

    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(short('l'), long, action, help_heading("Debug"), value_name("FILE"))]
    pub(crate) log_file: Option<String>,

    // CONFIGURATION OVERRIDES =============================================================
    #[command(flatten)]
    pub(crate) overrides: ConfigOverrides,
}

/// Configuration fields that may be set on the command line.
///
/// Fields left unset are not serialized, so they fall through to lower priority sources.
#[derive(Debug, Clone, Default, clap::Args, Serialize)]
pub(crate) struct ConfigOverrides {
    /// Common name (CN) for the generated certificates
    #[arg(long, value_name("NAME"), help_heading("Identity"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) common_name: Option<String>,

    /// Organization (O) for the generated certificates
    #[arg(long, value_name("NAME"), help_heading("Identity"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) organization: Option<String>,

    /// How long the generated certificates are valid for [default: 3650]
    #[arg(long, value_name("days"), help_heading("Issuance"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) validity_days: Option<u32>,

    /// RSA key size [default: 4096]
    #[arg(long, value_name("bits"), help_heading("Issuance"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key_bits: Option<usize>,

    /// An IP address the server certificate is valid for [default: 127.0.0.1 and ::1]
    ///
    /// Repeat for each address.
    #[arg(long = "san", value_name("IP"), help_heading("Issuance"))]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) subject_alt_names: Vec<IpAddr>,

    /// The oldest TLS version to accept [default: 1.2]
    #[arg(long = "min-tls", value_name("version"), help_heading("TLS"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) min_tls_version: Option<TlsVersion>,
}
