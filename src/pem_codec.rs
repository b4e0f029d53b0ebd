// (c) 2024 Ross Younger
//! PEM encoding and decoding of certificates and keys

use pem::{EncodeConfig, LineEnding, Pem};

use crate::{Error, Result};

/// The kinds of PEM block we read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PemKind {
    /// An X.509 certificate
    #[strum(to_string = "CERTIFICATE")]
    Certificate,
    /// A PKCS#8 private key
    #[strum(to_string = "PRIVATE KEY")]
    PrivateKey,
    /// A PKCS#1 RSA private key
    #[strum(to_string = "RSA PRIVATE KEY")]
    RsaPrivateKey,
}

impl PemKind {
    const ALL: [PemKind; 3] = [Self::Certificate, Self::PrivateKey, Self::RsaPrivateKey];

    /// Looks up a kind by its PEM label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.to_string() == label)
    }
}

/// Wraps DER bytes in a PEM block of the given kind
#[must_use]
pub fn encode(kind: PemKind, der: &[u8]) -> String {
    let block = Pem::new(kind.to_string(), der);
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Extracts the first PEM block from `input`.
///
/// Fails if there is no block at all, if it is malformed, or if its label is not one we know.
pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<(PemKind, Vec<u8>)> {
    let block = pem::parse(input)?;
    let kind = PemKind::from_label(block.tag())
        .ok_or_else(|| Error::PemDecode(format!("unsupported PEM label {:?}", block.tag())))?;
    if block.contents().is_empty() {
        return Err(Error::PemDecode("PEM block is empty".into()));
    }
    Ok((kind, block.into_contents()))
}

/// As [`decode`], but also insists the block is of the given kind
pub fn decode_expecting<T: AsRef<[u8]>>(kind: PemKind, input: T) -> Result<Vec<u8>> {
    let (found, der) = decode(input)?;
    if found != kind {
        return Err(Error::PemDecode(format!(
            "expected a {kind} block, found {found}"
        )));
    }
    Ok(der)
}
