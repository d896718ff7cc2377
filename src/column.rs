//! Column specifiers.
//!
//! A table column is either a concrete OID suffix that is walked on the
//! device, or an index marker whose values are synthesized from the row
//! OIDs of another column.
//!
//! Columns also have a textual form, used by JSON table descriptors:
//!
//! | Text                    | Column                                  |
//! |-------------------------|-----------------------------------------|
//! | `"2"`, `"2.1"`, `""`    | string column under that suffix         |
//! | `"binary:6"`            | binary column                           |
//! | `"cached:2"`            | string column persisted in walk cache   |
//! | `"cached:binary:6"`     | both                                    |
//! | `"OID_END"` etc.        | index marker                            |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigErrorKind, Error};
use crate::oid::Oid;

const BINARY_PREFIX: &str = "binary:";
const CACHED_PREFIX: &str = "cached:";

/// How the values of an index column are derived from row OIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// `OID_END`: the end-OID as text, e.g. `"2"` or `"10.1"`.
    End,
    /// `OID_STRING`: the absolute row OID as text.
    String,
    /// `OID_BIN`: the absolute row OID, one byte per arc.
    Bin,
    /// `OID_END_BIN`: the end-OID, one byte per arc.
    EndBin,
    /// `OID_END_OCTET_STRING`: like `OID_END_BIN` without the leading length byte.
    EndOctetString,
}

impl IndexKind {
    /// All markers, in declaration order.
    pub const ALL: [IndexKind; 5] = [
        IndexKind::End,
        IndexKind::String,
        IndexKind::Bin,
        IndexKind::EndBin,
        IndexKind::EndOctetString,
    ];

    /// The marker name as written in table definitions.
    pub fn marker(self) -> &'static str {
        match self {
            IndexKind::End => "OID_END",
            IndexKind::String => "OID_STRING",
            IndexKind::Bin => "OID_BIN",
            IndexKind::EndBin => "OID_END_BIN",
            IndexKind::EndOctetString => "OID_END_OCTET_STRING",
        }
    }

    /// Look up a marker by name.
    pub fn from_marker(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == name)
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// How raw column values are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// Decode bytes to text with the device charset (default).
    #[default]
    String,
    /// Keep bytes as a sequence of byte values.
    Binary,
}

/// One target column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Column {
    /// A column walked under `base[.suboid].suffix`.
    Oid {
        /// Dotted suffix below the base OID; empty walks the base itself.
        suffix: String,
        encoding: ValueEncoding,
        /// Read and write this column's walk through the walk cache.
        cached: bool,
    },
    /// A synthetic index column.
    Index(IndexKind),
}

impl Column {
    /// A string-encoded, uncached column.
    ///
    /// ```
    /// use snmp_table::Column;
    ///
    /// let descr = Column::oid("2");
    /// assert_eq!(descr.to_string(), "2");
    /// assert_eq!(Column::oid("6").binary().cached().to_string(), "cached:binary:6");
    /// ```
    pub fn oid(suffix: impl Into<String>) -> Self {
        Column::Oid {
            suffix: suffix.into(),
            encoding: ValueEncoding::String,
            cached: false,
        }
    }

    /// An index marker column.
    pub fn index(kind: IndexKind) -> Self {
        Column::Index(kind)
    }

    /// Switch an OID column to binary decoding. No-op for index columns.
    pub fn binary(mut self) -> Self {
        if let Column::Oid { encoding, .. } = &mut self {
            *encoding = ValueEncoding::Binary;
        }
        self
    }

    /// Opt an OID column into the walk cache. No-op for index columns.
    pub fn cached(mut self) -> Self {
        if let Column::Oid { cached, .. } = &mut self {
            *cached = true;
        }
        self
    }

    /// The value encoding; index columns are always decoded as strings.
    pub fn encoding(&self) -> ValueEncoding {
        match self {
            Column::Oid { encoding, .. } => *encoding,
            Column::Index(_) => ValueEncoding::String,
        }
    }

    /// The index marker, if this is an index column.
    pub fn index_kind(&self) -> Option<IndexKind> {
        match self {
            Column::Index(kind) => Some(*kind),
            Column::Oid { .. } => None,
        }
    }

    /// Whether this column opted into the walk cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, Column::Oid { cached: true, .. })
    }

    /// The OID suffix this column contributes to its fetch OID.
    ///
    /// Index columns contribute nothing.
    pub(crate) fn suffix_oid(&self) -> crate::Result<Oid> {
        match self {
            Column::Oid { suffix, .. } => {
                if !is_dotted_numeric(suffix) {
                    return Err(Error::config(ConfigErrorKind::InvalidColumn(
                        suffix.as_str().into(),
                    )));
                }
                Oid::parse(suffix)
                    .map_err(|_| Error::config(ConfigErrorKind::InvalidColumn(suffix.as_str().into())))
            }
            Column::Index(_) => Ok(Oid::empty()),
        }
    }
}

/// Digits and dots only; the empty string is allowed.
pub(crate) fn is_dotted_numeric(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Oid {
                suffix,
                encoding,
                cached,
            } => {
                if *cached {
                    f.write_str(CACHED_PREFIX)?;
                }
                if *encoding == ValueEncoding::Binary {
                    f.write_str(BINARY_PREFIX)?;
                }
                f.write_str(suffix)
            }
            Column::Index(kind) => f.write_str(kind.marker()),
        }
    }
}

impl FromStr for Column {
    type Err = Box<Error>;

    /// Parse the textual column form.
    ///
    /// ```
    /// use snmp_table::{Column, IndexKind};
    ///
    /// assert_eq!("OID_END".parse::<Column>().unwrap(), Column::index(IndexKind::End));
    /// assert_eq!("binary:6".parse::<Column>().unwrap(), Column::oid("6").binary());
    /// assert!("OID_FOO".parse::<Column>().is_err());
    /// assert!("ifDescr".parse::<Column>().is_err());
    /// ```
    fn from_str(s: &str) -> crate::Result<Self> {
        if s.starts_with("OID_") {
            return IndexKind::from_marker(s)
                .map(Column::Index)
                .ok_or_else(|| Error::config(ConfigErrorKind::UnknownIndexMarker(s.into())));
        }

        let mut rest = s;
        let mut column = Column::oid("");
        loop {
            if let Some(stripped) = rest.strip_prefix(CACHED_PREFIX) {
                column = column.cached();
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix(BINARY_PREFIX) {
                column = column.binary();
                rest = stripped;
            } else {
                break;
            }
        }

        if !is_dotted_numeric(rest) {
            return Err(Error::config(ConfigErrorKind::InvalidColumn(s.into())));
        }
        if let Column::Oid { suffix, .. } = &mut column {
            *suffix = rest.to_string();
        }
        Ok(column)
    }
}

impl TryFrom<String> for Column {
    type Error = Box<Error>;

    fn try_from(s: String) -> crate::Result<Self> {
        s.parse()
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.to_string()
    }
}

impl From<IndexKind> for Column {
    fn from(kind: IndexKind) -> Self {
        Column::Index(kind)
    }
}

impl From<&str> for Column {
    /// A plain string column. Use [`str::parse`] for the full textual form.
    fn from(suffix: &str) -> Self {
        Column::oid(suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_names_roundtrip() {
        for kind in IndexKind::ALL {
            assert_eq!(IndexKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(IndexKind::from_marker("OID_NOPE"), None);
    }

    #[test]
    fn parse_prefix_order_is_free() {
        let a: Column = "binary:cached:6".parse().unwrap();
        let b: Column = "cached:binary:6".parse().unwrap();
        assert_eq!(a, b);
        assert!(a.is_cached());
        assert_eq!(a.encoding(), ValueEncoding::Binary);
    }

    #[test]
    fn parse_unknown_marker_is_config_error() {
        let err = "OID_END_HEX".parse::<Column>().unwrap_err();
        assert!(matches!(
            &*err,
            Error::Config {
                kind: ConfigErrorKind::UnknownIndexMarker(_)
            }
        ));
    }

    #[test]
    fn parse_empty_suffix() {
        assert_eq!("".parse::<Column>().unwrap(), Column::oid(""));
    }

    #[test]
    fn index_column_ignores_modifiers() {
        let col = Column::index(IndexKind::EndBin).binary().cached();
        assert_eq!(col, Column::Index(IndexKind::EndBin));
        assert_eq!(col.encoding(), ValueEncoding::String);
        assert!(!col.is_cached());
    }

    #[test]
    fn suffix_oid_validates() {
        assert_eq!(Column::oid("2.1").suffix_oid().unwrap().arcs(), &[2, 1]);
        assert!(Column::oid("").suffix_oid().unwrap().is_empty());
        assert!(Column::oid("ifDescr").suffix_oid().is_err());
    }

    #[test]
    fn serde_uses_textual_form() {
        let cols: Vec<Column> =
            serde_json::from_str(r#"["1", "binary:6", "OID_END"]"#).unwrap();
        assert_eq!(
            cols,
            vec![
                Column::oid("1"),
                Column::oid("6").binary(),
                Column::index(IndexKind::End)
            ]
        );
        assert_eq!(
            serde_json::to_string(&cols).unwrap(),
            r#"["1","binary:6","OID_END"]"#
        );
    }
}
