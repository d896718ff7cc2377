//! Value decoding.
//!
//! Turns reconciled raw columns into [`Value`]s. A cell that does not decode
//! cleanly in the configured charset gets replacement characters and a
//! warning; the rest of the table is unaffected.

use bytes::Bytes;
use encoding_rs::Encoding;

use crate::column::ValueEncoding;
use crate::format::hex;
use crate::value::Value;

/// Source character set of string columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Charset {
    /// UTF-8 where valid, ISO-8859-1 otherwise.
    Default,
    /// ISO-8859-1, every byte its own code point.
    ///
    /// `encoding_rs` follows WHATWG and maps the `latin1` labels to
    /// windows-1252, which turns `0x80..=0x9f` into printable characters.
    Latin1,
    /// An explicitly configured encoding.
    Encoding(&'static Encoding),
}

/// Labels meaning ISO-8859-1 proper, compared after lowercasing and with
/// `_` read as `-`.
const LATIN1_LABELS: &[&str] = &[
    "latin1",
    "latin-1",
    "l1",
    "iso-8859-1",
    "iso8859-1",
    "iso88591",
    "iso-ir-100",
    "cp819",
    "ibm819",
];

impl Charset {
    /// Resolve a configured label such as `"utf-8"`, `"latin1"` or `"cp1252"`.
    ///
    /// Unknown labels fall back to [`Charset::Default`] with a warning.
    pub(crate) fn resolve(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Charset::Default;
        };
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        if LATIN1_LABELS.contains(&normalized.as_str()) {
            return Charset::Latin1;
        }
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => Charset::Encoding(encoding),
            None => {
                tracing::warn!(target: "snmp_table::decode", { snmp.charset = label }, "unknown character encoding, using default");
                Charset::Default
            }
        }
    }

    /// Decode one value, never failing.
    pub(crate) fn decode(self, raw: &[u8]) -> String {
        match self {
            Charset::Default => match std::str::from_utf8(raw) {
                Ok(text) => text.to_owned(),
                Err(e) => {
                    tracing::debug!(target: "snmp_table::decode", { snmp.value = %hex::Bytes(raw), snmp.offset = e.valid_up_to() }, "value not valid UTF-8, decoding as ISO-8859-1");
                    latin1(raw)
                }
            },
            Charset::Latin1 => latin1(raw),
            Charset::Encoding(encoding) => {
                let (text, had_errors) = encoding.decode_without_bom_handling(raw);
                if had_errors {
                    tracing::warn!(target: "snmp_table::decode", { snmp.charset = encoding.name(), snmp.value = %hex::Bytes(raw) }, "value not valid in configured charset, replacing");
                }
                text.into_owned()
            }
        }
    }
}

fn latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Decode a reconciled column.
pub(crate) fn decode_column(
    raw: Vec<Bytes>,
    encoding: ValueEncoding,
    charset: Charset,
) -> Vec<Value> {
    match encoding {
        ValueEncoding::Binary => raw.into_iter().map(|v| Value::Binary(v.to_vec())).collect(),
        ValueEncoding::String => raw
            .iter()
            .map(|v| Value::Text(charset.decode(v)))
            .collect(),
    }
}
