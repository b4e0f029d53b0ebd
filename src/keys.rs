// (c) 2024 Ross Younger
//! RSA key pair generation

use std::fmt::Debug;

use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey as _;
use rsa::pkcs8::EncodePrivateKey as _;
use rsa::traits::PublicKeyParts as _;
use rsa::RsaPrivateKey;
use rustls_pki_types::PrivatePkcs8KeyDer;
use tracing::debug;

use crate::{Error, Result};

/// Smallest RSA modulus we are prepared to generate
pub const MIN_KEY_BITS: usize = 2048;
/// Largest RSA modulus we are prepared to generate.
///
/// The signer (ring) refuses RSA private keys with a larger modulus.
pub const MAX_KEY_BITS: usize = 4096;
/// Key size used unless configured otherwise
pub const DEFAULT_KEY_BITS: usize = 4096;

/// A freshly generated RSA key pair, ready to sign certificates.
///
/// The private half lives only in memory for as long as this struct does.
pub struct GeneratedKey {
    private_key: RsaPrivateKey,
    signer: rcgen::KeyPair,
}

impl Debug for GeneratedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

impl GeneratedKey {
    /// Modulus size in bits
    #[must_use]
    pub fn bits(&self) -> usize {
        self.private_key.size() * 8
    }

    /// The key pair in the form the certificate signer wants it
    #[must_use]
    pub fn signer(&self) -> &rcgen::KeyPair {
        &self.signer
    }

    /// DER-encoded `SubjectPublicKeyInfo`
    #[must_use]
    pub fn public_key_der(&self) -> Vec<u8> {
        self.signer.public_key_der()
    }

    /// DER-encoded PKCS#8 private key
    #[must_use]
    pub fn private_key_pkcs8_der(&self) -> Vec<u8> {
        self.signer.serialize_der()
    }

    /// DER-encoded PKCS#1 (`RSA PRIVATE KEY`) private key
    pub fn private_key_pkcs1_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .private_key
            .to_pkcs1_der()
            .map_err(|e| Error::KeyGeneration(Box::new(e)))?;
        Ok(doc.as_bytes().to_vec())
    }
}

/// Generates a new RSA key pair of the given size, using the operating system's CSPRNG.
///
/// Sizes outside `MIN_KEY_BITS..=MAX_KEY_BITS` are refused before any entropy is consumed.
pub fn generate_key_pair(bits: usize) -> Result<GeneratedKey> {
    if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
        return Err(Error::KeySize {
            bits,
            min: MIN_KEY_BITS,
            max: MAX_KEY_BITS,
        });
    }
    debug!("generating {bits}-bit RSA key");
    let private_key =
        RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| Error::KeyGeneration(Box::new(e)))?;
    let pkcs8 = private_key
        .to_pkcs8_der()
        .map_err(|e| Error::KeyGeneration(Box::new(e)))?;
    let signer = rcgen::KeyPair::from_pkcs8_der_and_sign_algo(
        &PrivatePkcs8KeyDer::from(pkcs8.as_bytes()),
        &rcgen::PKCS_RSA_SHA256,
    )
    .map_err(|e| Error::KeyGeneration(Box::new(e)))?;
    Ok(GeneratedKey {
        private_key,
        signer,
    })
}
