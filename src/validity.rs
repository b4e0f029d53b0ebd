// (c) 2024 Ross Younger
//! Certificate validity windows

use time::{Duration, OffsetDateTime};

use crate::{Error, Result};

/// Ten years, give or take the leap days
pub const DEFAULT_VALIDITY_DAYS: u32 = 3650;

/// The `notBefore` / `notAfter` pair stamped on a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    /// Start of validity
    pub not_before: OffsetDateTime,
    /// End of validity
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// A window of `days` days starting at `not_before`
    pub fn new(not_before: OffsetDateTime, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(Error::InvalidConfiguration(
                "certificate validity must be at least one day".into(),
            ));
        }
        let not_after = not_before
            .checked_add(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!("validity of {days} days is out of range"))
            })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// A window of `days` days starting now
    pub fn starting_now(days: u32) -> Result<Self> {
        Self::new(OffsetDateTime::now_utc(), days)
    }

    /// Applies this window to a certificate template
    pub(crate) fn apply(&self, params: &mut rcgen::CertificateParams) {
        params.not_before = self.not_before;
        params.not_after = self.not_after;
    }
}

#[cfg(test)]
mod tests {
    use super::{Validity, DEFAULT_VALIDITY_DAYS};
    use time::{macros::datetime, Duration};

    #[test]
    fn ten_years() {
        let v = Validity::new(datetime!(2024-01-01 0:00 UTC), DEFAULT_VALIDITY_DAYS).unwrap();
        assert_eq!(v.not_after - v.not_before, Duration::days(3650));
        assert_eq!(v.not_after.year(), 2033);
    }

    #[test]
    fn zero_days_rejected() {
        assert!(Validity::starting_now(0).is_err());
    }

    #[test]
    fn short_lived() {
        let v = Validity::starting_now(1).unwrap();
        assert_eq!(v.not_after - v.not_before, Duration::days(1));
    }
}
