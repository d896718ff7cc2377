//! Walk row type.
//!
//! A Row pairs the absolute OID returned by a walk with its raw value.

use bytes::Bytes;

use crate::format::hex;
use crate::oid::Oid;

/// One `(OID, raw value)` pair as returned by a subtree walk.
///
/// Values stay opaque bytes until the table is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The fully-qualified object identifier.
    pub oid: Oid,
    /// The undecoded value.
    pub value: Bytes,
}

impl Row {
    /// Create a new Row.
    pub fn new(oid: Oid, value: impl Into<Bytes>) -> Self {
        Self {
            oid,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match std::str::from_utf8(&self.value) {
            Ok(text) if !text.chars().any(char::is_control) => {
                write!(f, "{} = {:?}", self.oid, text)
            }
            _ => write!(f, "{} = 0x{}", self.oid, hex::Bytes(&self.value)),
        }
    }
}
