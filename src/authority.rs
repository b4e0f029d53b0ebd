// (c) 2024 Ross Younger
//! The root certificate authority

use std::fmt::Debug;

use rcgen::{
    BasicConstraints, CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyUsagePurpose,
    SerialNumber,
};
use rustls_pki_types::CertificateDer;
use tracing::debug;

use crate::{
    keys::GeneratedKey, name::Identity, serial::serial_to_hex, validity::Validity, Result,
};

/// A self-signed root authority, held in memory for the life of the process.
pub struct CertificateAuthority {
    key: GeneratedKey,
    certificate: rcgen::Certificate,
    serial: SerialNumber,
    validity: Validity,
}

impl Debug for CertificateAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateAuthority")
            .field("serial", &serial_to_hex(&self.serial))
            .field("validity", &self.validity)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CertificateAuthority {
    /// The signed certificate, DER encoded
    #[must_use]
    pub fn der(&self) -> &CertificateDer<'static> {
        self.certificate.der()
    }

    /// The signed certificate, PEM encoded
    #[must_use]
    pub fn pem(&self) -> String {
        self.certificate.pem()
    }

    /// Serial number of the certificate
    #[must_use]
    pub fn serial(&self) -> &SerialNumber {
        &self.serial
    }

    /// Validity window of the certificate
    #[must_use]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// The authority's key pair
    #[must_use]
    pub fn key(&self) -> &GeneratedKey {
        &self.key
    }

    pub(crate) fn certificate(&self) -> &rcgen::Certificate {
        &self.certificate
    }
}

/// Builds the unsigned authority template.
///
/// CA=true, may sign certificates and data, good for client and server authentication.
#[must_use]
pub fn authority_template(
    serial: SerialNumber,
    identity: &Identity,
    validity: Validity,
) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.serial_number = Some(serial);
    params.distinguished_name = identity.to_distinguished_name();
    validity.apply(&mut params);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyCertSign,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ClientAuth,
        ExtendedKeyUsagePurpose::ServerAuth,
    ];
    params
}

/// Issues a root authority certificate, self-signed with `key`.
pub fn issue_authority(
    key: GeneratedKey,
    serial: SerialNumber,
    identity: &Identity,
    validity: Validity,
) -> Result<CertificateAuthority> {
    debug!(
        "issuing authority certificate, serial {}",
        serial_to_hex(&serial)
    );
    let certificate =
        authority_template(serial.clone(), identity, validity).self_signed(key.signer())?;
    Ok(CertificateAuthority {
        key,
        certificate,
        serial,
        validity,
    })
}
