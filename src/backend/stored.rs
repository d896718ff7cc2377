//! Stored walk replay backend.
//!
//! Replays a walk previously captured from a device. The file has one row
//! per line: the OID, whitespace, then the value as net-snmp prints it.
//!
//! ```text
//! .1.3.6.1.2.1.1.1.0 "Linux router 5.10"
//! .1.3.6.1.2.1.2.2.1.6.2 "00 1B 21 3C 4D 5E "
//! .1.3.6.1.2.1.2.2.1.3.2 6
//! ```
//!
//! Quoted values are unquoted; quoted hex dumps (two hex digits and a space
//! per byte) become the raw bytes; doubled backslashes in quoted text are
//! collapsed. Rows are replayed in file order, so duplicated or unsorted
//! rows captured from broken devices reach the engine unchanged.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use super::Backend;
use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::format::hex;
use crate::oid::Oid;
use crate::row::Row;

/// Backend answering from a stored walk.
#[derive(Clone)]
pub struct StoredWalkBackend {
    config: HostConfig,
    rows: Arc<[Row]>,
}

impl StoredWalkBackend {
    /// Parse walk text.
    ///
    /// ```
    /// use snmp_table::{HostConfig, StoredWalkBackend};
    ///
    /// let walk = b".1.3.6.1.2.1.1.5.0 \"router1\"\n.1.3.6.1.2.1.1.7.0 72\n";
    /// let backend = StoredWalkBackend::parse(HostConfig::new("router1"), walk).unwrap();
    /// assert_eq!(backend.len(), 2);
    /// ```
    pub fn parse(config: HostConfig, text: &[u8]) -> Result<Self> {
        let mut rows = Vec::new();
        for (lineno, line) in text.split(|&b| b == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.iter().all(u8::is_ascii_whitespace) || line.starts_with(b"#") {
                continue;
            }
            let row = parse_line(line).ok_or_else(|| {
                Error::InvalidOid(
                    format!(
                        "stored walk line {}: {}",
                        lineno + 1,
                        String::from_utf8_lossy(line)
                    )
                    .into(),
                )
                .boxed()
            })?;
            rows.push(row);
        }

        tracing::debug!(target: "snmp_table::backend", { snmp.host = %config.hostname, snmp.rows = rows.len() }, "loaded stored walk");

        Ok(Self {
            config,
            rows: rows.into(),
        })
    }

    /// Load a stored walk file.
    pub async fn open(config: HostConfig, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read(path).await.map_err(|source| {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
            .boxed()
        })?;
        Self::parse(config, &text)
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the walk holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_line(line: &[u8]) -> Option<Row> {
    let line = line.trim_ascii_start();
    let split = line
        .iter()
        .position(u8::is_ascii_whitespace)
        .unwrap_or(line.len());
    let (oid, value) = line.split_at(split);
    let oid = Oid::parse(std::str::from_utf8(oid).ok()?).ok()?;
    if oid.is_empty() {
        return None;
    }
    Some(Row::new(oid, strip_value(value)))
}

/// Undo net-snmp's value quoting.
fn strip_value(value: &[u8]) -> Bytes {
    let value = value.trim_ascii();
    let Some(inner) = value
        .strip_prefix(b"\"")
        .map(|v| v.strip_suffix(b"\"").unwrap_or(v))
    else {
        return Bytes::copy_from_slice(value);
    };

    if inner.len() > 2
        && let Some(bytes) = std::str::from_utf8(inner).ok().and_then(hex::decode_spaced)
    {
        return bytes.into();
    }

    let inner = inner.trim_ascii();
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        out.push(inner[i]);
        if inner[i] == b'\\' && inner.get(i + 1) == Some(&b'\\') {
            i += 1;
        }
        i += 1;
    }
    out.into()
}

impl Backend for StoredWalkBackend {
    fn config(&self) -> &HostConfig {
        &self.config
    }

    fn get(
        &self,
        oid: &Oid,
        _context: Option<&str>,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        let found = self
            .rows
            .iter()
            .find(|row| row.oid == *oid)
            .map(|row| row.value.clone());
        async move { Ok(found) }
    }

    fn walk(
        &self,
        oid: &Oid,
        _section: Option<&str>,
        _table_base: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send {
        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| row.oid.starts_with(oid))
            .cloned()
            .collect();
        tracing::trace!(target: "snmp_table::backend", { snmp.oid = %oid, snmp.context = ?context, snmp.rows = rows.len() }, "replayed stored walk");
        async move { Ok(rows) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    const WALK: &[u8] = b"\
.1.3.6.1.2.1.2.2.1.1.1 1
.1.3.6.1.2.1.2.2.1.1.2 2
.1.3.6.1.2.1.2.2.1.2.1 \"lo\"
.1.3.6.1.2.1.2.2.1.2.2 \"eth0\"
.1.3.6.1.2.1.2.2.1.6.2 \"00 1B 21 3C 4D 5E \"
.1.3.6.1.2.1.2.2.1.10.1 12
";

    fn backend() -> StoredWalkBackend {
        StoredWalkBackend::parse(HostConfig::new("host"), WALK).unwrap()
    }

    #[test]
    fn strip_plain_and_quoted_values() {
        assert_eq!(strip_value(b" 24 "), Bytes::from_static(b"24"));
        assert_eq!(strip_value(b"\"eth0\""), Bytes::from_static(b"eth0"));
        assert_eq!(strip_value(b"\"\""), Bytes::new());
        assert_eq!(strip_value(b"\"c:\\\\\""), Bytes::from_static(b"c:\\"));
    }

    #[test]
    fn strip_hex_dump() {
        assert_eq!(
            strip_value(b"\"C0 FE FE \""),
            Bytes::from_static(&[0xc0, 0xfe, 0xfe])
        );
        // no trailing space: plain text
        assert_eq!(strip_value(b"\"C0 FE\""), Bytes::from_static(b"C0 FE"));
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let backend =
            StoredWalkBackend::parse(HostConfig::new("h"), b"# captured\n\n.1.3 5\r\n").unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn parse_rejects_bad_oid() {
        let err = StoredWalkBackend::parse(HostConfig::new("h"), b".1.3 ok\nbogus value\n")
            .err()
            .unwrap();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn parse_keeps_non_utf8_values() {
        let backend =
            StoredWalkBackend::parse(HostConfig::new("h"), b".1.3 \"M\xfcnchen\"\n").unwrap();
        assert_eq!(&backend.rows[0].value[..], b"M\xfcnchen");
    }

    #[tokio::test]
    async fn walk_filters_by_prefix() {
        let backend = backend();
        let base = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1);
        let rows = backend
            .walk(&base.child(1), None, &base, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, Bytes::from_static(b"2"));

        // .1 must not match .10
        let rows = backend
            .walk(&base.child(10), None, &base, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn get_exact_oid() {
        let backend = backend();
        let value = backend
            .get(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 6, 2), None)
            .await
            .unwrap();
        assert_eq!(value.unwrap().len(), 6);

        let missing = backend.get(&oid!(1, 3, 6, 1, 9), None).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn open_missing_file_is_io_error() {
        let err = StoredWalkBackend::open(HostConfig::new("h"), "/nonexistent/walk")
            .await
            .err()
            .unwrap();
        assert!(matches!(&*err, Error::Io { .. }));
    }
}
