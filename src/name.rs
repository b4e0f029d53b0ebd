// (c) 2024 Ross Younger
//! Distinguished names for issued certificates

use rcgen::{DistinguishedName, DnType};

/// OID 2.5.4.9 (streetAddress), which rcgen has no named variant for
const OID_STREET_ADDRESS: [u64; 4] = [2, 5, 4, 9];
/// OID 2.5.4.17 (postalCode)
const OID_POSTAL_CODE: [u64; 4] = [2, 5, 4, 17];

/// The identity attributes written into a certificate subject.
///
/// The authority and the leaf share one `Identity`; they differ only in their extensions.
/// Empty fields are left out of the encoded name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// O
    pub organization: String,
    /// OU
    pub organizational_unit: String,
    /// CN
    pub common_name: String,
    /// C
    pub country: String,
    /// ST
    pub state: String,
    /// L
    pub locality: String,
    /// street
    pub street_address: String,
    /// postalCode
    pub postal_code: String,
}

impl Identity {
    /// Converts to the form used by the certificate builder.
    ///
    /// Attributes are emitted in a fixed order so two conversions of the same identity encode identically.
    #[must_use]
    pub fn to_distinguished_name(&self) -> DistinguishedName {
        let mut dn = DistinguishedName::new();
        let attributes = [
            (DnType::CountryName, &self.country),
            (DnType::StateOrProvinceName, &self.state),
            (DnType::LocalityName, &self.locality),
            (
                DnType::CustomDnType(OID_STREET_ADDRESS.to_vec()),
                &self.street_address,
            ),
            (
                DnType::CustomDnType(OID_POSTAL_CODE.to_vec()),
                &self.postal_code,
            ),
            (DnType::OrganizationName, &self.organization),
            (DnType::OrganizationalUnitName, &self.organizational_unit),
            (DnType::CommonName, &self.common_name),
        ];
        for (ty, value) in attributes {
            if !value.is_empty() {
                dn.push(ty, value.as_str());
            }
        }
        dn
    }
}
