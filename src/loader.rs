// (c) 2024 Ross Younger
//! Loading user-supplied certificates

use std::path::Path;

use x509_parser::{nom, parse_x509_certificate};

use crate::{
    fingerprint::{fingerprint, format_hex_pairs, Fingerprint},
    pem_codec::{decode_expecting, PemKind},
    Error, Result,
};

/// A summary of a certificate read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCertificate {
    /// Subject name, RFC 4514 style
    pub subject: String,
    /// Issuer name, RFC 4514 style
    pub issuer: String,
    /// Serial number as hex pairs
    pub serial: String,
    /// Start of validity
    pub not_before: String,
    /// End of validity
    pub not_after: String,
    /// Fingerprint of the certificate DER
    pub fingerprint: Fingerprint,
}

/// Reads a PEM certificate file, parses it and describes it.
///
/// The fingerprint covers the DER of the parsed certificate, not the file contents.
pub fn load_certificate<P: AsRef<Path>>(path: P) -> Result<LoadedCertificate> {
    let path = path.as_ref();
    let contents = std::fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let der = decode_expecting(PemKind::Certificate, contents)?;
    let (rest, cert) = parse_x509_certificate(&der).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => Error::CertificateParse(e.to_string()),
        nom::Err::Incomplete(_) => Error::CertificateParse("certificate is truncated".into()),
    })?;
    if !rest.is_empty() {
        return Err(Error::CertificateParse(format!(
            "{} bytes of trailing data after certificate",
            rest.len()
        )));
    }
    // Raw DER of the certificate as parsed
    let raw = &der[..der.len() - rest.len()];
    tracing::debug!("loaded certificate {} from {path:?}", cert.subject());
    Ok(LoadedCertificate {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        serial: format_hex_pairs(cert.raw_serial()),
        not_before: cert.validity().not_before.to_string(),
        not_after: cert.validity().not_after.to_string(),
        fingerprint: fingerprint(raw),
    })
}

/// Reads a PEM certificate file and fingerprints it
pub fn load_and_fingerprint<P: AsRef<Path>>(path: P) -> Result<Fingerprint> {
    load_certificate(path).map(|c| c.fingerprint)
}

#[cfg(test)]
mod tests {
    use super::{load_and_fingerprint, load_certificate};
    use crate::{
        fingerprint::{fingerprint, format_hex_pairs},
        pem_codec::{encode, PemKind},
        util::make_test_tempfile,
        Error,
    };

    fn self_signed() -> rcgen::CertifiedKey {
        rcgen::generate_simple_self_signed(["loader.test".to_string()]).unwrap()
    }

    #[test]
    fn fingerprints_der_not_file() {
        let ck = self_signed();
        let pem = ck.cert.pem();
        let (path, _dir) = make_test_tempfile(&pem, "cert.pem");
        let fp = load_and_fingerprint(&path).unwrap();
        assert_eq!(fp, fingerprint(ck.cert.der()));
        assert_ne!(fp, fingerprint(pem.as_bytes()));

        let expected = ring::digest::digest(&ring::digest::SHA256, ck.cert.der());
        assert_eq!(fp.sha256, format_hex_pairs(expected.as_ref()));
    }

    #[test]
    fn describes_certificate() {
        let ck = self_signed();
        let (path, _dir) = make_test_tempfile(&ck.cert.pem(), "cert.pem");
        let loaded = load_certificate(&path).unwrap();
        assert_eq!(loaded.subject, loaded.issuer);
        assert!(loaded.subject.contains("CN=rcgen self signed cert"));
        assert!(!loaded.serial.is_empty());
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_and_fingerprint(dir.path().join("nope.pem"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn not_pem() {
        let (path, _dir) = make_test_tempfile("this is not a certificate", "cert.pem");
        assert!(matches!(
            load_and_fingerprint(&path),
            Err(Error::PemDecode(_))
        ));
    }

    #[test]
    fn key_instead_of_certificate() {
        let ck = self_signed();
        let (path, _dir) = make_test_tempfile(&ck.key_pair.serialize_pem(), "key.pem");
        assert!(matches!(
            load_and_fingerprint(&path),
            Err(Error::PemDecode(_))
        ));
    }

    #[test]
    fn garbage_certificate() {
        let pem = encode(PemKind::Certificate, b"definitely not DER");
        let (path, _dir) = make_test_tempfile(&pem, "cert.pem");
        assert!(matches!(
            load_and_fingerprint(&path),
            Err(Error::CertificateParse(_))
        ));
    }

    #[test]
    fn trailing_data() {
        let ck = self_signed();
        let mut der = ck.cert.der().to_vec();
        der.extend_from_slice(&[0, 0, 0]);
        let (path, _dir) = make_test_tempfile(&encode(PemKind::Certificate, &der), "cert.pem");
        assert!(matches!(
            load_and_fingerprint(&path),
            Err(Error::CertificateParse(_))
        ));
    }
}
