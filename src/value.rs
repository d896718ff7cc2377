//! Decoded table cell values.
//!
//! The `Value` enum is what check logic sees after decoding: either text or
//! a sequence of byte values, depending on the column's encoding tag.

use serde::Serialize;

/// A decoded table cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Text from a "string" column.
    Text(String),
    /// Byte values (0-255) from a "binary" column, one per raw byte.
    Binary(Vec<u8>),
}

impl Value {
    /// Get the text, if this is a string cell.
    ///
    /// ```
    /// use snmp_table::Value;
    ///
    /// assert_eq!(Value::from("eth0").as_str(), Some("eth0"));
    /// assert_eq!(Value::Binary(vec![1, 2]).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Binary(_) => None,
        }
    }

    /// Get the byte values, if this is a binary cell.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::Text(_) => None,
        }
    }

    /// Whether the cell holds no data, as gap placeholders do.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Binary(b) => b.is_empty(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Binary(b) => {
                write!(f, "[")?;
                for (i, byte) in b.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", byte)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
