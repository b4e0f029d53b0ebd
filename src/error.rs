//! Error types for the certificate authority core
// (c) 2024 Ross Younger

use std::path::PathBuf;

/// Everything that can go wrong while minting, encoding or loading certificates.
///
/// The command-line layer wraps these in `anyhow`; library callers can match on the variant.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested RSA key size is outside the supported range
    #[error("RSA key size of {bits} bits is not supported (must be {min}..={max})")]
    KeySize {
        /// Requested size
        bits: usize,
        /// Smallest accepted size
        min: usize,
        /// Largest accepted size
        max: usize,
    },

    /// Key pair generation (or import into the signer) failed
    #[error("key generation failed: {0}")]
    KeyGeneration(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The random serial number source failed
    #[error("could not draw a certificate serial number: {0}")]
    SerialDraw(#[source] rand::Error),

    /// Building or signing a certificate failed
    #[error("certificate creation failed: {0}")]
    CertificateCreation(#[from] rcgen::Error),

    /// No usable PEM block was found
    #[error("failed to decode PEM block: {0}")]
    PemDecode(String),

    /// The decoded bytes are not a well-formed X.509 certificate
    #[error("failed to parse certificate: {0}")]
    CertificateParse(String),

    /// A file could not be read
    #[error("failed to read {path:?}: {source}")]
    FileRead {
        /// The file we tried to read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// The TLS layer rejected the key/certificate pair or the protocol selection
    #[error("TLS configuration failed: {0}")]
    Tls(#[from] rustls::Error),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<pem::PemError> for Error {
    fn from(value: pem::PemError) -> Self {
        Self::PemDecode(value.to_string())
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn key_size_message() {
        let e = Error::KeySize {
            bits: 512,
            min: 2048,
            max: 4096,
        };
        assert_eq!(
            e.to_string(),
            "RSA key size of 512 bits is not supported (must be 2048..=4096)"
        );
    }

    #[test]
    fn file_read_keeps_source() {
        use std::error::Error as _;
        let e = Error::FileRead {
            path: "/nonexistent".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/nonexistent"));
    }
}
