// (c) 2024 Ross Younger
//! Server (leaf) certificates signed by the authority

use std::{
    fmt::Debug,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use rcgen::{
    CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyIdMethod, KeyUsagePurpose, SanType,
    SerialNumber,
};
use rustls_pki_types::CertificateDer;
use tracing::debug;

use crate::{
    authority::CertificateAuthority, keys::GeneratedKey, name::Identity, serial::serial_to_hex,
    validity::Validity, Error, Result,
};

/// Subject key identifier stamped on every leaf
pub const LEAF_SUBJECT_KEY_ID: [u8; 5] = [1, 2, 3, 4, 6];

/// The addresses a leaf is valid for unless configured otherwise
pub const LOOPBACK_ADDRESSES: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::LOCALHOST),
    IpAddr::V6(Ipv6Addr::LOCALHOST),
];

/// A server certificate and its key, signed by a [`CertificateAuthority`].
pub struct LeafCertificate {
    key: GeneratedKey,
    certificate: rcgen::Certificate,
    serial: SerialNumber,
    validity: Validity,
}

impl Debug for LeafCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafCertificate")
            .field("serial", &serial_to_hex(&self.serial))
            .field("validity", &self.validity)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl LeafCertificate {
    /// The signed certificate, DER encoded
    #[must_use]
    pub fn der(&self) -> &CertificateDer<'static> {
        self.certificate.der()
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

    /// The leaf's own key pair
    #[must_use]
    pub fn key(&self) -> &GeneratedKey {
        &self.key
    }
}

/// Builds the unsigned leaf template.
///
/// Not a CA; digital signatures only; client and server authentication;
/// valid for the given IP addresses.
#[must_use]
pub fn leaf_template(
    serial: SerialNumber,
    identity: &Identity,
    validity: Validity,
    subject_alt_names: &[IpAddr],
) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.serial_number = Some(serial);
    params.distinguished_name = identity.to_distinguished_name();
    validity.apply(&mut params);
    params.is_ca = IsCa::ExplicitNoCa;
    params.subject_alt_names = subject_alt_names
        .iter()
        .copied()
        .map(SanType::IpAddress)
        .collect();
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ClientAuth,
        ExtendedKeyUsagePurpose::ServerAuth,
    ];
    params.key_identifier_method = KeyIdMethod::PreSpecified(LEAF_SUBJECT_KEY_ID.to_vec());
    params
}

/// Issues a leaf certificate for `key`, signed by `authority`.
///
/// The issuer name is copied from the authority certificate, so it always matches the authority's subject.
pub fn issue_leaf(
    key: GeneratedKey,
    serial: SerialNumber,
    identity: &Identity,
    validity: Validity,
    subject_alt_names: &[IpAddr],
    authority: &CertificateAuthority,
) -> Result<LeafCertificate> {
    if subject_alt_names.is_empty() {
        return Err(Error::InvalidConfiguration(
            "a leaf certificate needs at least one subject alternative name".into(),
        ));
    }
    debug!(
        "issuing leaf certificate, serial {}, for {subject_alt_names:?}",
        serial_to_hex(&serial)
    );
    let certificate = leaf_template(serial.clone(), identity, validity, subject_alt_names)
        .signed_by(key.signer(), authority.certificate(), authority.key().signer())?;
    Ok(LeafCertificate {
        key,
        certificate,
        serial,
        validity,
    })
}
