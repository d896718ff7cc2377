//! Hex forms of raw values: the walk cache encoding, net-snmp's spaced
//! dump, and a lazy formatter for log fields.

use std::fmt::{self, Write};

/// Lowercase hex, two digits per byte.
///
/// ```
/// use snmp_table::format::hex;
///
/// assert_eq!(hex::encode(&[0x00, 0x1b, 0xff]), "001bff");
/// assert_eq!(hex::encode(&[]), "");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // writing to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Inverse of [`encode`]; accepts either case.
///
/// ```
/// use snmp_table::format::hex::{self, DecodeError};
///
/// assert_eq!(hex::decode("001BFF"), Ok(vec![0x00, 0x1b, 0xff]));
/// assert_eq!(hex::decode("0"), Err(DecodeError::OddLength));
/// assert_eq!(hex::decode("0g"), Err(DecodeError::InvalidChar));
/// ```
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = s.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(DecodeError::OddLength);
    }
    digits
        .chunks_exact(2)
        .map(|pair| Ok(nibble(pair[0])? << 4 | nibble(pair[1])?))
        .collect()
}

/// Bytes from net-snmp's spaced dump of binary strings.
///
/// Every byte is two hex digits followed by one space, the last one
/// included. Text of any other shape is not a dump and yields `None`.
///
/// ```
/// use snmp_table::format::hex::decode_spaced;
///
/// assert_eq!(decode_spaced("00 1B FF "), Some(vec![0x00, 0x1b, 0xff]));
/// assert_eq!(decode_spaced("00 1B FF"), None);
/// assert_eq!(decode_spaced("eth0"), None);
/// ```
pub fn decode_spaced(s: &str) -> Option<Vec<u8>> {
    let text = s.as_bytes();
    if text.is_empty() || text.len() % 3 != 0 {
        return None;
    }
    text.chunks_exact(3)
        .map(|group| match group {
            [hi, lo, b' '] => Some(nibble(*hi).ok()? << 4 | nibble(*lo).ok()?),
            _ => None,
        })
        .collect()
}

fn nibble(digit: u8) -> Result<u8, DecodeError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(DecodeError::InvalidChar),
    }
}

/// Why a hex string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("odd number of hex digits")]
    OddLength,
    #[error("invalid hex digit")]
    InvalidChar,
}

/// Formats a byte slice as hex only when displayed, for log fields.
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({self})")
    }
}
