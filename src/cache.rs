//! Walk cache.
//!
//! Stores raw per-column walk results between runs, keyed by device identity
//! and fetch OID. The cache is a pure optimization: the engine turns every
//! [`CacheError`] into a log line and carries on as if the entry was absent.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::CacheError;
use crate::format::hex;
use crate::oid::Oid;
use crate::row::Row;

/// Whether cached walks may be used in place of device walks.
///
/// Either way, columns that opted into caching have their fresh walks
/// written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Always walk the device, then update the cache (default).
    #[default]
    Refresh,
    /// Serve opted-in columns from the cache when an entry exists.
    Reuse,
}

/// Storage for walk results.
///
/// Implementations must tolerate concurrent use from several workers polling
/// different hosts; entries for one `(host, fetch OID)` are immutable once
/// written, so racing writers store identical data.
pub trait WalkCache: Send + Sync {
    /// Previously stored rows, `Ok(None)` on a miss.
    fn read(&self, host: &str, fetch_oid: &Oid) -> Result<Option<Vec<Row>>, CacheError>;

    /// Store the rows of one column walk.
    fn write(&self, host: &str, fetch_oid: &Oid, rows: &[Row]) -> Result<(), CacheError>;
}

/// On-disk format: OIDs in dotted form, values hex-encoded.
#[derive(Serialize, Deserialize)]
struct CachedWalk {
    rows: Vec<(String, String)>,
}

/// Walk cache keeping one JSON file per host and fetch OID.
///
/// Layout: `<root>/<host>/<fetch oid>`, e.g.
/// `/var/cache/snmp/switch01/.1.3.6.1.2.1.2.2.1.2`. Every write goes to its
/// own temporary file in the host directory and is renamed into place, so
/// readers never see partial entries and racing writers never collide.
#[derive(Debug, Clone)]
pub struct FileWalkCache {
    root: PathBuf,
}

impl FileWalkCache {
    /// Cache rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the walk of `fetch_oid` on `host`.
    pub fn entry_path(&self, host: &str, fetch_oid: &Oid) -> PathBuf {
        self.root.join(host_dir(host)).join(fetch_oid.to_string())
    }
}

/// Host names become directory names. Anything outside `[A-Za-z0-9._-]`
/// is percent-encoded, as are leading dots, so distinct hosts never share a
/// directory and no name escapes the root.
fn host_dir(host: &str) -> String {
    if host.is_empty() {
        return "%".to_owned();
    }
    let mut name = String::with_capacity(host.len());
    let mut leading = true;
    for byte in host.bytes() {
        let safe = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_')
            || (byte == b'.' && !leading);
        leading &= byte == b'.';
        if safe {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name
}

impl WalkCache for FileWalkCache {
    fn read(&self, host: &str, fetch_oid: &Oid) -> Result<Option<Vec<Row>>, CacheError> {
        let path = self.entry_path(host, fetch_oid);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let corrupt = |reason: String| CacheError::Corrupt {
            path: path.clone(),
            reason: reason.into(),
        };

        let cached: CachedWalk =
            serde_json::from_slice(&data).map_err(|e| corrupt(e.to_string()))?;
        let rows = cached
            .rows
            .into_iter()
            .map(|(oid, value)| {
                let oid = Oid::parse(&oid).map_err(|e| corrupt(e.to_string()))?;
                let value = hex::decode(&value).map_err(|e| corrupt(e.to_string()))?;
                Ok(Row::new(oid, value))
            })
            .collect::<Result<Vec<_>, CacheError>>()?;

        Ok(Some(rows))
    }

    fn write(&self, host: &str, fetch_oid: &Oid, rows: &[Row]) -> Result<(), CacheError> {
        let path = self.entry_path(host, fetch_oid);
        let io_err = |path: &Path, source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let cached = CachedWalk {
            rows: rows
                .iter()
                .map(|row| (row.oid.to_string(), hex::encode(&row.value)))
                .collect(),
        };
        let data = serde_json::to_vec(&cached).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            reason: e.to_string().into(),
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_err(dir, e))?;
        tmp.write_all(&data).map_err(|e| io_err(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| io_err(&path, e.error))?;
        Ok(())
    }
}
