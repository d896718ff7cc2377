//! Backend abstraction.
//!
//! Provides the `Backend` trait the table engine drives, plus the
//! stored-walk replay backend and (for tests) a programmable mock.

mod stored;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use stored::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::config::HostConfig;
use crate::error::Result;
use crate::oid::Oid;
use crate::row::Row;
use bytes::Bytes;
use std::future::Future;

/// Transport capability used by the table engine.
///
/// Implementations wrap a real SNMP client, a stored walk, or a simulation.
/// Timeouts, retries and the wire protocol are entirely theirs; the engine
/// awaits each call to completion before issuing the next one.
///
/// Errors are returned as [`Error::Backend`](crate::Error::Backend) or
/// [`Error::Timeout`](crate::Error::Timeout) and abort the table fetch.
pub trait Backend: Send + Sync {
    /// Configuration of the device this backend talks to.
    fn config(&self) -> &HostConfig;

    /// Fetch a single value. `Ok(None)` if the device has no such OID.
    fn get(
        &self,
        oid: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Walk the subtree below `oid`.
    ///
    /// - `section`: plugin on whose behalf the walk runs (for backends that
    ///   tune per plugin)
    /// - `table_base`: base OID of the table the walk belongs to
    /// - `context`: SNMPv3 context, `None` for the default
    ///
    /// Rows should come back in a deterministic order, ascending preferred.
    fn walk(
        &self,
        oid: &Oid,
        section: Option<&str>,
        table_base: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send;
}

impl<B: Backend> Backend for &B {
    fn config(&self) -> &HostConfig {
        (**self).config()
    }

    fn get(
        &self,
        oid: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        (**self).get(oid, context)
    }

    fn walk(
        &self,
        oid: &Oid,
        section: Option<&str>,
        table_base: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send {
        (**self).walk(oid, section, table_base, context)
    }
}
