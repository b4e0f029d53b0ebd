// (c) 2024 Ross Younger
//! Certificate serial numbers

use std::fmt::Write as _;

use rand::{rngs::OsRng, RngCore as _};
use rcgen::SerialNumber;

use crate::{Error, Result};

/// Width of a generated serial number, in bytes
pub const SERIAL_BYTES: usize = 16;

/// A source of certificate serial numbers.
///
/// Every issued certificate takes its own draw.
pub trait SerialSource {
    /// Returns the next serial number, which must be a non-negative integer
    fn next_serial(&mut self) -> Result<SerialNumber>;
}

/// Draws 128-bit serial numbers from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngSerial;

impl SerialSource for OsRngSerial {
    fn next_serial(&mut self) -> Result<SerialNumber> {
        let mut buf = [0u8; SERIAL_BYTES];
        OsRng.try_fill_bytes(&mut buf).map_err(Error::SerialDraw)?;
        Ok(positive_serial(buf))
    }
}

/// Clears the sign bit so the DER INTEGER is non-negative
fn positive_serial(mut bytes: [u8; SERIAL_BYTES]) -> SerialNumber {
    bytes[0] &= 0x7f;
    SerialNumber::from_slice(&bytes)
}

/// Renders a serial number as colon-free lowercase hex, for logging
#[must_use]
pub fn serial_to_hex(serial: &SerialNumber) -> String {
    serial
        .as_ref()
        .iter()
        .fold(String::new(), |mut output, b| {
            let _ = write!(output, "{b:02x}");
            output
        })
}
