//! Configuration structure
// (c) 2024 Ross Younger

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use struct_field_names_as_array::FieldNamesAsSlice;

use crate::{
    identity::TlsVersion,
    keys::{DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS},
    leaf::LOOPBACK_ADDRESSES,
    name::Identity,
    validity::DEFAULT_VALIDITY_DAYS,
    Error, Result,
};

/// The set of configurable options supported by localca.
///
/// **Note:** The implementation of `default()` for this struct returns localca's hard-wired configuration defaults.
///
/// The identity fields are written into both the authority and the server certificate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, FieldNamesAsSlice)]
pub struct Configuration {
    // IDENTITY ========================================================================================
    /// Organization (O)
    pub organization: String,
    /// Organizational unit (OU)
    pub organizational_unit: String,
    /// Common name (CN)
    pub common_name: String,
    /// Two-letter country code (C)
    pub country: String,
    /// State or province (ST)
    pub state: String,
    /// Locality (L)
    pub locality: String,
    /// Street address
    pub street_address: String,
    /// Postal code
    pub postal_code: String,

    // ISSUANCE ========================================================================================
    /// How long the generated certificates are valid for, in days
    pub validity_days: u32,
    /// RSA modulus size for both generated keys
    pub key_bits: usize,
    /// IP addresses the server certificate is valid for
    pub subject_alt_names: Vec<IpAddr>,

    // TLS =============================================================================================
    /// The oldest TLS version the server will negotiate
    pub min_tls_version: TlsVersion,
}

impl Default for Configuration {
    /// **(Unusual!)**
    /// Returns localca's hard-wired configuration defaults.
    fn default() -> Self {
        Self {
            organization: "localca".into(),
            organizational_unit: "localca".into(),
            common_name: "localca - ephemeral server identity".into(),
            country: "NZ".into(),
            state: "Wellington".into(),
            locality: "Wellington".into(),
            street_address: "Lambton Quay".into(),
            postal_code: "6011".into(),

            validity_days: DEFAULT_VALIDITY_DAYS,
            key_bits: DEFAULT_KEY_BITS,
            subject_alt_names: LOOPBACK_ADDRESSES.to_vec(),

            min_tls_version: TlsVersion::Tls12,
        }
    }
}

impl Configuration {
    /// The distinguished name attributes, as used by the issuers
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            organization: self.organization.clone(),
            organizational_unit: self.organizational_unit.clone(),
            common_name: self.common_name.clone(),
            country: self.country.clone(),
            state: self.state.clone(),
            locality: self.locality.clone(),
            street_address: self.street_address.clone(),
            postal_code: self.postal_code.clone(),
        }
    }

    /// Checks the values are usable, before any expensive work is done
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&self.key_bits) {
            return Err(Error::KeySize {
                bits: self.key_bits,
                min: MIN_KEY_BITS,
                max: MAX_KEY_BITS,
            });
        }
        if self.validity_days == 0 {
            return Err(Error::InvalidConfiguration(
                "validity_days must be at least 1".into(),
            ));
        }
        if self.subject_alt_names.is_empty() {
            return Err(Error::InvalidConfiguration(
                "subject_alt_names must not be empty".into(),
            ));
        }
        if !self.country.is_empty()
            && !(self.country.len() == 2 && self.country.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return Err(Error::InvalidConfiguration(format!(
                "country must be a two-letter code, not {:?}",
                self.country
            )));
        }
        Ok(())
    }

    /// Formats the issuance options for display
    #[must_use]
    pub fn format_issuance_config(&self) -> String {
        format!(
            "{bits}-bit RSA, valid {days} days for {sans:?}, TLS {tls} or newer",
            bits = self.key_bits,
            days = self.validity_days,
            sans = self.subject_alt_names,
            tls = self.min_tls_version,
        )
    }
}
