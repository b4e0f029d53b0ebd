// (c) 2024 Ross Younger
//! Certificate fingerprints

use std::fmt::{Display, Write as _};

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY, SHA256};

/// Digests of a certificate's DER bytes, formatted for people to compare by eye.
///
/// Each digest is uppercase hex, grouped into byte pairs separated by single spaces,
/// e.g. `AA BB CC DD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// SHA-256 digest
    pub sha256: String,
    /// SHA-1 digest. For display only; it carries no security weight.
    pub sha1: String,
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SHA-256: {}", self.sha256)?;
        write!(f, "SHA-1:   {}", self.sha1)
    }
}

/// Fingerprints the exact byte sequence given
#[must_use]
pub fn fingerprint(der: &[u8]) -> Fingerprint {
    Fingerprint {
        sha256: format_hex_pairs(digest(&SHA256, der).as_ref()),
        sha1: format_hex_pairs(digest(&SHA1_FOR_LEGACY_USE_ONLY, der).as_ref()),
    }
}

/// Formats bytes as space-separated uppercase hex pairs, with no trailing separator
#[must_use]
pub fn format_hex_pairs(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}
