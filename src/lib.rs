//! Ephemeral two-tier certificate authority.
//!
//! Equips a local server with a self-signed TLS identity: a root authority and a
//! server certificate signed by it, both minted fresh for the life of the process,
//! plus fingerprints a human can compare by eye.
//! User-supplied PEM certificates can be fingerprinted the same way.
//!
//! ```no_run
//! let config = localca::config::Configuration::default();
//! let identity = localca::identity::setup(&config)?;
//! println!("{}", identity.fingerprint);
//! # Ok::<(), localca::Error>(())
//! ```
// (c) 2024 Ross Younger

/// The root authority
pub mod authority;
mod cli;
pub use cli::cli;
pub mod config;
mod error;
pub use error::{Error, Result};
/// Certificate fingerprints
pub mod fingerprint;
/// TLS identity assembly
pub mod identity;
/// RSA key pairs
pub mod keys;
/// Server certificates
pub mod leaf;
/// Loading user-supplied certificates
pub mod loader;
/// Distinguished names
pub mod name;
/// PEM encoding
pub mod pem_codec;
/// Certificate serial numbers
pub mod serial;
/// Utilities
pub mod util;
/// Certificate validity windows
pub mod validity;
