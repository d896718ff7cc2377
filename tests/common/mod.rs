//! Shared test infrastructure for snmp-table.
//!
//! Provides stored walk fixtures and a backend wrapper that counts and
//! optionally fails calls.

// Allow dead code since not all test files use all utilities
#![allow(dead_code)]

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use snmp_table::{
    Backend, Column, Error, HostConfig, IndexKind, Oid, Result, Row, StoredWalkBackend,
    TableDescriptor,
};

/// ifTable / ifXTable base OIDs.
pub const IF_TABLE: &str = ".1.3.6.1.2.1.2.2.1";
pub const IF_X_TABLE: &str = ".1.3.6.1.2.1.31.1.1.1";

/// Path of a file under `tests/data`.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

/// Stored walk of a two-interface Linux router.
pub async fn router1(config: HostConfig) -> StoredWalkBackend {
    StoredWalkBackend::open(config, data_path("router1.walk"))
        .await
        .expect("load router1.walk")
}

/// ifIndex, ifDescr, ifType plus `OID_END`.
pub fn if_table() -> TableDescriptor {
    TableDescriptor::new(
        IF_TABLE,
        [
            Column::oid("1"),
            Column::oid("2"),
            Column::oid("3"),
            Column::index(IndexKind::End),
        ],
    )
}

/// Render a table as strings for comparison.
pub fn text(table: &snmp_table::Table) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect()
}

/// Backend wrapper counting calls, failing from the `fail_at`-th walk on.
#[derive(Clone)]
pub struct CountingBackend<B> {
    inner: B,
    walks: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
    fail_at: Option<usize>,
}

impl<B: Backend> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            walks: Arc::new(AtomicUsize::new(0)),
            gets: Arc::new(AtomicUsize::new(0)),
            fail_at: None,
        }
    }

    /// Fail walk number `n` (1-based) and every one after it.
    pub fn failing_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl<B: Backend> Backend for CountingBackend<B> {
    fn config(&self) -> &HostConfig {
        self.inner.config()
    }

    fn get(
        &self,
        oid: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(oid, context)
    }

    fn walk(
        &self,
        oid: &Oid,
        section: Option<&str>,
        table_base: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send {
        let n = self.walks.fetch_add(1, Ordering::SeqCst) + 1;
        let failed = self.fail_at.is_some_and(|at| n >= at);
        let host = self.inner.config().hostname.clone();
        let walk = self.inner.walk(oid, section, table_base, context);
        async move {
            if failed {
                return Err(Error::backend(
                    host,
                    std::io::Error::new(std::io::ErrorKind::TimedOut, "no response"),
                ));
            }
            walk.await
        }
    }
}
