//! Error types for snmp-table.
//!
//! This module provides:
//!
//! - [`Error`] - The main error type for table fetches
//! - [`ConfigErrorKind`] - Reasons a table descriptor was rejected
//! - [`CacheError`] - Non-fatal walk cache failures
//!
//! # Error Handling
//!
//! Errors are boxed for efficiency: `Result<T> = Result<T, Box<Error>>`.
//!
//! Configuration and backend errors abort the whole table fetch. Cache and
//! character decoding problems never surface here; they are logged and the
//! fetch continues.
//!
//! ```rust
//! use snmp_table::{ConfigErrorKind, Error, Result};
//!
//! fn handle_error(result: Result<()>) {
//!     match result {
//!         Ok(()) => println!("Success"),
//!         Err(e) => match &*e {
//!             Error::Config { kind } => {
//!                 println!("broken table definition: {}", kind);
//!             }
//!             Error::Timeout { target, .. } => {
//!                 println!("{} did not answer", target);
//!             }
//!             _ => println!("Error: {}", e),
//!         }
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using the library's boxed Error type.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Boxed error type carried by backend failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reason a table descriptor was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// Base OID is empty, lacks the leading `.`, or has non-numeric arcs.
    InvalidBaseOid(Box<str>),
    /// Suboid infix is not a dotted numeric string.
    InvalidSuboid(Box<str>),
    /// Column suffix is not a dotted numeric string.
    InvalidColumn(Box<str>),
    /// More than one index marker in the same table.
    MultipleIndexColumns { count: usize },
    /// Column names an `OID_*` marker this library does not know.
    UnknownIndexMarker(Box<str>),
}

impl std::fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseOid(oid) => {
                write!(f, "base OID {:?} must be numeric and begin with '.'", oid)
            }
            Self::InvalidSuboid(suboid) => write!(f, "invalid suboid {:?}", suboid),
            Self::InvalidColumn(column) => write!(f, "invalid column {:?}", column),
            Self::MultipleIndexColumns { count } => {
                write!(f, "{} index columns in one table, at most one allowed", count)
            }
            Self::UnknownIndexMarker(marker) => write!(f, "unknown index marker {:?}", marker),
        }
    }
}

/// The main error type for all snmp-table operations.
///
/// Backends report their own failures through [`Error::Backend`] and
/// [`Error::Timeout`]; the engine propagates them unchanged.
///
/// ```
/// use snmp_table::Error;
///
/// fn is_definition_bug(error: &Error) -> bool {
///     matches!(error, Error::Config { .. } | Error::InvalidOid(_))
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed table descriptor. Never retried.
    #[error("configuration error: {kind}")]
    Config { kind: ConfigErrorKind },

    /// Invalid OID format.
    #[error("invalid OID: {0}")]
    InvalidOid(Box<str>),

    /// Transport failure reported by a backend.
    #[error("backend error for {target}: {source}")]
    Backend {
        target: Box<str>,
        #[source]
        source: BoxError,
    },

    /// Backend gave up waiting for the device.
    #[error("timeout after {elapsed:?} waiting for {target}")]
    Timeout { target: Box<str>, elapsed: Duration },

    /// Reading a stored walk failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Box this error (convenience for constructing boxed errors).
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub(crate) fn config(kind: ConfigErrorKind) -> Box<Self> {
        Self::Config { kind }.boxed()
    }

    /// Wrap an arbitrary transport failure.
    pub fn backend(
        target: impl Into<Box<str>>,
        source: impl Into<BoxError>,
    ) -> Box<Self> {
        Self::Backend {
            target: target.into(),
            source: source.into(),
        }
        .boxed()
    }
}

/// Walk cache failure.
///
/// Never escapes a table fetch: a failed read counts as a miss and a failed
/// write is dropped.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("walk cache I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt walk cache entry {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: Box<str> },

    /// The blocking cache task panicked or was cancelled.
    #[error("walk cache task failed: {0}")]
    Task(Box<str>),
}
