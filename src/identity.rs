// (c) 2024 Ross Younger
//! Assembly of a ready-to-serve TLS identity

use std::sync::Arc;

use rcgen::SerialNumber;
use rustls::{version, ProtocolVersion, ServerConfig, SupportedProtocolVersion};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    authority::issue_authority,
    config::Configuration,
    fingerprint::{fingerprint, Fingerprint},
    keys::generate_key_pair,
    leaf::issue_leaf,
    pem_codec::{self, PemKind},
    serial::{OsRngSerial, SerialSource},
    validity::Validity,
    Error, Result,
};

static TLS12_AND_LATER: &[&SupportedProtocolVersion] = &[&version::TLS13, &version::TLS12];
static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&version::TLS13];

/// The oldest TLS version a server will negotiate
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    clap::ValueEnum,
)]
pub enum TlsVersion {
    /// TLS 1.2 (and 1.3)
    #[serde(rename = "1.2", alias = "tls1.2")]
    #[strum(to_string = "1.2")]
    #[value(name = "1.2", alias = "tls1.2")]
    Tls12,
    /// TLS 1.3 only
    #[serde(rename = "1.3", alias = "tls1.3")]
    #[strum(to_string = "1.3")]
    #[value(name = "1.3", alias = "tls1.3")]
    Tls13,
}

impl TlsVersion {
    /// The protocol versions a server with this floor offers
    #[must_use]
    pub fn supported_versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            TlsVersion::Tls12 => TLS12_AND_LATER,
            TlsVersion::Tls13 => TLS13_ONLY,
        }
    }

    /// The wire protocol version of the floor
    #[must_use]
    pub fn protocol_version(self) -> ProtocolVersion {
        match self {
            TlsVersion::Tls12 => ProtocolVersion::TLSv1_2,
            TlsVersion::Tls13 => ProtocolVersion::TLSv1_3,
        }
    }
}

/// Everything a TLS-terminating listener needs, plus what a human needs to trust it.
///
/// Private keys live only inside `server_config`; nothing here is written to disk.
#[derive(Debug, Clone)]
pub struct TlsIdentity {
    /// Server configuration holding the leaf certificate and its key
    pub server_config: Arc<ServerConfig>,
    /// The oldest protocol version `server_config` will negotiate
    pub min_protocol_version: ProtocolVersion,
    /// Fingerprint of the leaf certificate
    pub fingerprint: Fingerprint,
    /// The leaf (server) certificate
    pub certificate: CertificateDer<'static>,
    /// The leaf certificate in PEM form
    pub certificate_pem: String,
    /// The root authority certificate, for clients that want to trust it
    pub authority_certificate: CertificateDer<'static>,
    /// The root authority certificate in PEM form
    pub authority_certificate_pem: String,
}

impl TlsIdentity {
    /// The certificate chain to present to clients.
    ///
    /// This is just the leaf; clients are expected to trust the authority directly.
    #[must_use]
    pub fn cert_chain(&self) -> Vec<CertificateDer<'static>> {
        vec![self.certificate.clone()]
    }
}

/// Mints an authority and a server certificate, then wraps them up as a [`TlsIdentity`].
#[derive(Debug)]
pub struct Assembler<S: SerialSource> {
    config: Configuration,
    serials: S,
}

impl<S: SerialSource> Assembler<S> {
    /// Constructor
    #[must_use]
    pub fn new(config: Configuration, serials: S) -> Self {
        Self { config, serials }
    }

    /// Generates a fresh identity.
    ///
    /// Each call generates new keys and serial numbers; nothing is shared between calls.
    /// The first failure aborts the whole process.
    pub fn setup(&mut self) -> Result<TlsIdentity> {
        self.config.validate()?;
        let identity = self.config.identity();
        let validity = Validity::starting_now(self.config.validity_days)?;

        let authority_key = generate_key_pair(self.config.key_bits)?;
        let serial = self.draw_serial()?;
        let authority = issue_authority(authority_key, serial, &identity, validity)?;

        let leaf_key = generate_key_pair(self.config.key_bits)?;
        let serial = self.draw_serial()?;
        let leaf = issue_leaf(
            leaf_key,
            serial,
            &identity,
            validity,
            &self.config.subject_alt_names,
            &authority,
        )?;

        let certificate_pem = pem_codec::encode(PemKind::Certificate, leaf.der());
        let key_pem = pem_codec::encode(
            PemKind::PrivateKey,
            &leaf.key().private_key_pkcs8_der(),
        );
        let server_config =
            server_config_from_pem(&certificate_pem, &key_pem, self.config.min_tls_version)?;

        let fingerprint = fingerprint(leaf.der());
        info!("server certificate SHA-256 fingerprint: {}", fingerprint.sha256);
        debug!("server certificate SHA-1 fingerprint: {}", fingerprint.sha1);

        Ok(TlsIdentity {
            server_config: Arc::new(server_config),
            min_protocol_version: self.config.min_tls_version.protocol_version(),
            fingerprint,
            certificate: leaf.der().clone(),
            certificate_pem,
            authority_certificate: authority.der().clone(),
            authority_certificate_pem: authority.pem(),
        })
    }

    fn draw_serial(&mut self) -> Result<SerialNumber> {
        self.serials
            .next_serial()
            .inspect_err(|e| error!("when creating certificate: {e}"))
    }
}

/// Generates a fresh identity from the given configuration, drawing serial numbers from the OS.
pub fn setup(config: &Configuration) -> Result<TlsIdentity> {
    Assembler::new(config.clone(), OsRngSerial).setup()
}

/// Pairs a PEM certificate with its PEM private key into a server configuration.
///
/// The key may be PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`).
/// Fails if either block cannot be decoded or the TLS layer will not accept the pair.
pub fn server_config_from_pem(
    certificate_pem: &str,
    key_pem: &str,
    min_version: TlsVersion,
) -> Result<ServerConfig> {
    let certificate = CertificateDer::from(pem_codec::decode_expecting(
        PemKind::Certificate,
        certificate_pem,
    )?);
    let key = match pem_codec::decode(key_pem)? {
        (PemKind::PrivateKey, der) => PrivateKeyDer::Pkcs8(der.into()),
        (PemKind::RsaPrivateKey, der) => PrivateKeyDer::Pkcs1(der.into()),
        (PemKind::Certificate, _) => {
            return Err(Error::PemDecode(
                "expected a private key, found a CERTIFICATE block".into(),
            ))
        }
    };
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(min_version.supported_versions())?
        .with_no_client_auth()
        .with_single_cert(vec![certificate], key)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr, Ipv6Addr},
        sync::Arc,
    };

    use rcgen::SerialNumber;
    use rustls::{
        client::{danger::ServerCertVerifier as _, WebPkiServerVerifier},
        ProtocolVersion, RootCertStore,
    };
    use rustls_pki_types::{ServerName, UnixTime};
    use x509_parser::prelude::*;

    use super::{server_config_from_pem, setup, Assembler, TlsIdentity, TlsVersion};
    use crate::{
        config::Configuration,
        fingerprint::fingerprint,
        keys::MIN_KEY_BITS,
        pem_codec::{encode, PemKind},
        serial::SerialSource,
        Error, Result,
    };

    fn test_config() -> Configuration {
        Configuration {
            key_bits: MIN_KEY_BITS,
            ..Default::default()
        }
    }

    /// Hands out 1, 2, 3, ... and fails after `limit` draws
    struct CountingSerials {
        next: u8,
        limit: u8,
    }

    impl SerialSource for CountingSerials {
        fn next_serial(&mut self) -> Result<SerialNumber> {
            if self.next >= self.limit {
                return Err(Error::SerialDraw(rand::Error::new("entropy exhausted")));
            }
            self.next += 1;
            Ok(SerialNumber::from_slice(&[self.next]))
        }
    }

    fn verify_as(identity: &TlsIdentity, ip: IpAddr) -> std::result::Result<(), rustls::Error> {
        let mut roots = RootCertStore::empty();
        roots.add(identity.authority_certificate.clone())?;
        let verifier = WebPkiServerVerifier::builder_with_provider(
            Arc::new(roots),
            Arc::new(rustls::crypto::ring::default_provider()),
        )
        .build()
        .unwrap();
        verifier
            .verify_server_cert(
                &identity.certificate,
                &[],
                &ServerName::from(ip),
                &[],
                UnixTime::now(),
            )
            .map(|_| ())
    }

    #[test]
    fn chain_of_trust() {
        let identity = setup(&test_config()).unwrap();

        let (_, ca) = parse_x509_certificate(&identity.authority_certificate).unwrap();
        let (_, leaf) = parse_x509_certificate(&identity.certificate).unwrap();
        assert_eq!(leaf.issuer().as_raw(), ca.subject().as_raw());
        assert_ne!(ca.raw_serial(), leaf.raw_serial());

        verify_as(&identity, IpAddr::V4(Ipv4Addr::LOCALHOST)).unwrap();
        verify_as(&identity, IpAddr::V6(Ipv6Addr::LOCALHOST)).unwrap();
        assert!(verify_as(&identity, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))).is_err());
    }

    #[test]
    fn fingerprint_matches_leaf_der() {
        let identity = setup(&test_config()).unwrap();
        assert_eq!(identity.fingerprint, fingerprint(&identity.certificate));
        assert_eq!(identity.min_protocol_version, ProtocolVersion::TLSv1_2);
        assert_eq!(identity.cert_chain(), vec![identity.certificate.clone()]);
        assert!(identity
            .certificate_pem
            .starts_with("-----BEGIN CERTIFICATE-----"));
    }

    #[test]
    fn serials_are_drawn_per_certificate() {
        let mut assembler = Assembler::new(
            test_config(),
            CountingSerials { next: 0, limit: 2 },
        );
        let identity = assembler.setup().unwrap();
        let (_, ca) = parse_x509_certificate(&identity.authority_certificate).unwrap();
        let (_, leaf) = parse_x509_certificate(&identity.certificate).unwrap();
        assert_eq!(ca.raw_serial(), &[1]);
        assert_eq!(leaf.raw_serial(), &[2]);
    }

    #[test]
    fn serial_failure_is_fatal() {
        for limit in [0, 1] {
            let mut assembler = Assembler::new(test_config(), CountingSerials { next: 0, limit });
            assert!(matches!(assembler.setup(), Err(Error::SerialDraw(_))));
        }
    }

    #[test]
    fn independent_calls() {
        let a = setup(&test_config()).unwrap();
        let b = setup(&test_config()).unwrap();
        let (_, ca_a) = parse_x509_certificate(&a.authority_certificate).unwrap();
        let (_, ca_b) = parse_x509_certificate(&b.authority_certificate).unwrap();
        assert_ne!(ca_a.raw_serial(), ca_b.raw_serial());
        assert_ne!(ca_a.public_key().raw, ca_b.public_key().raw);
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn invalid_config_fails_early() {
        let config = Configuration {
            key_bits: 1024,
            ..Default::default()
        };
        assert!(matches!(setup(&config), Err(Error::KeySize { .. })));
    }

    #[test]
    fn tls13_floor() {
        let config = Configuration {
            min_tls_version: TlsVersion::Tls13,
            ..test_config()
        };
        let identity = setup(&config).unwrap();
        assert_eq!(identity.min_protocol_version, ProtocolVersion::TLSv1_3);
        assert_eq!(TlsVersion::Tls13.supported_versions().len(), 1);
        assert_eq!(TlsVersion::Tls12.supported_versions().len(), 2);
    }

    #[test]
    fn pairing_rejects_bad_inputs() {
        let ck = rcgen::generate_simple_self_signed(["pairing.test".to_string()]).unwrap();
        let cert_pem = ck.cert.pem();

        // a certificate where the key should be
        assert!(matches!(
            server_config_from_pem(&cert_pem, &cert_pem, TlsVersion::Tls12),
            Err(Error::PemDecode(_))
        ));
        // something that is not a key at all
        let junk = encode(PemKind::PrivateKey, b"not a key");
        assert!(matches!(
            server_config_from_pem(&cert_pem, &junk, TlsVersion::Tls12),
            Err(Error::Tls(_))
        ));
        // and the happy path
        let key_pem = ck.key_pair.serialize_pem();
        let _ = server_config_from_pem(&cert_pem, &key_pem, TlsVersion::Tls12).unwrap();
    }

    #[test]
    fn version_names() {
        assert_eq!(TlsVersion::Tls12.to_string(), "1.2");
        assert_eq!(TlsVersion::Tls13.protocol_version(), ProtocolVersion::TLSv1_3);
    }
}
