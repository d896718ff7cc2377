//! Table assembly.
//!
//! [`TableFetcher`] drives the whole pipeline for one device: per pass it
//! fetches every column, synthesizes the index column, reconciles rows and
//! decodes values, then appends the pass's rows to the table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::instrument;

use crate::backend::Backend;
use crate::cache::{CacheMode, WalkCache};
use crate::decode::{Charset, decode_column};
use crate::descriptor::TableDescriptor;
use crate::error::Result;
use crate::fetch::{CacheAccess, FetchedColumn, fetch_column};
use crate::index::resolve_index;
use crate::oid::Oid;
use crate::reconcile::reconcile;
use crate::value::Value;

/// A decoded, rectangular table.
///
/// Every row has one value per declared column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Rows in output order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Value>> {
        self.rows.iter()
    }

    /// Take the rows.
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

impl IntoIterator for Table {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Vec<Value>;
    type IntoIter = std::slice::Iter<'a, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Builder for [`TableFetcher`].
pub struct TableFetcherBuilder<B> {
    backend: B,
    walk_cache: Option<Arc<dyn WalkCache>>,
    cache_mode: CacheMode,
}

impl<B: Backend> TableFetcherBuilder<B> {
    /// Store and reuse walks of columns marked as cached (default: none).
    pub fn walk_cache(mut self, cache: Arc<dyn WalkCache>) -> Self {
        self.walk_cache = Some(cache);
        self
    }

    /// Set how the walk cache is used (default: [`CacheMode::Refresh`]).
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> TableFetcher<B> {
        let charset = Charset::resolve(self.backend.config().character_encoding.as_deref());
        TableFetcher {
            backend: self.backend,
            walk_cache: self.walk_cache,
            cache_mode: self.cache_mode,
            charset,
            single_oids: Mutex::new(HashMap::new()),
        }
    }
}

/// Table retrieval for one device.
///
/// Columns are fetched one after another in declaration order, each backend
/// call awaited before the next is issued. Any backend error aborts the
/// table; nothing partial is returned.
///
/// # Example
///
/// ```
/// use snmp_table::{Column, HostConfig, IndexKind, StoredWalkBackend, TableDescriptor, TableFetcher};
///
/// # async fn example() -> snmp_table::Result<()> {
/// let walk = b"\
/// .1.3.6.1.2.1.2.2.1.1.1 1
/// .1.3.6.1.2.1.2.2.1.1.2 2
/// .1.3.6.1.2.1.2.2.1.2.1 \"lo\"
/// .1.3.6.1.2.1.2.2.1.2.2 \"eth0\"
/// ";
/// let backend = StoredWalkBackend::parse(HostConfig::new("router1"), walk)?;
/// let fetcher = TableFetcher::new(backend);
///
/// let descriptor = TableDescriptor::new(
///     ".1.3.6.1.2.1.2.2.1",
///     [Column::oid("2"), Column::index(IndexKind::End)],
/// );
/// let table = fetcher.fetch_table(Some("interfaces"), &descriptor).await?;
/// assert_eq!(table.rows()[1], ["eth0", "2"]);
/// # Ok(())
/// # }
/// ```
pub struct TableFetcher<B> {
    backend: B,
    walk_cache: Option<Arc<dyn WalkCache>>,
    cache_mode: CacheMode,
    charset: Charset,
    /// Decoded results of `get_single_oid`, including misses.
    single_oids: Mutex<HashMap<Oid, Option<String>>>,
}

impl<B: Backend> TableFetcher<B> {
    /// Fetcher without a walk cache.
    pub fn new(backend: B) -> Self {
        Self::builder(backend).build()
    }

    /// Start building a fetcher.
    pub fn builder(backend: B) -> TableFetcherBuilder<B> {
        TableFetcherBuilder {
            backend,
            walk_cache: None,
            cache_mode: CacheMode::default(),
        }
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch and assemble one table.
    ///
    /// `section` selects the SNMPv3 contexts to walk and is handed to the
    /// backend. Descriptor errors are reported before any backend call.
    #[instrument(skip(self, descriptor), err, fields(snmp.host = %self.backend.config().hostname, snmp.base = %descriptor.base))]
    pub async fn fetch_table(
        &self,
        section: Option<&str>,
        descriptor: &TableDescriptor,
    ) -> Result<Table> {
        let table = descriptor.resolve()?;
        let access = CacheAccess {
            cache: self.walk_cache.as_ref(),
            mode: self.cache_mode,
        };

        let mut rows = Vec::new();
        for suboid in &table.passes {
            let fetch_oids = table.fetch_oids(suboid.as_ref());

            let mut fetched: Vec<FetchedColumn> = Vec::with_capacity(table.columns.len());
            for (column, fetch_oid) in table.columns.iter().zip(&fetch_oids) {
                let result =
                    fetch_column(&self.backend, column, fetch_oid, section, &table.base, access)
                        .await?;
                fetched.push(result);
            }

            resolve_index(&table.columns, &mut fetched);

            if let Some(suboid) = suboid
                && let Some(first) = fetched.first_mut()
            {
                for row in &mut first.rows {
                    let mut value = suboid.prefix.clone();
                    value.extend_from_slice(&row.value);
                    row.value = value.into();
                }
            }

            let columns: Vec<Vec<Value>> = reconcile(&fetched)
                .into_iter()
                .zip(&fetched)
                .map(|(raw, column)| decode_column(raw, column.encoding, self.charset))
                .collect();

            let before = rows.len();
            rows.extend(transpose(columns));
            tracing::debug!(target: "snmp_table::fetch", { snmp.suboid = ?suboid.as_ref().map(|s| &s.oid), snmp.rows = rows.len() - before }, "assembled pass");
        }

        Ok(Table { rows })
    }

    /// Fetch several tables for one section, in order.
    ///
    /// Stops at the first error.
    pub async fn fetch_tables(
        &self,
        section: Option<&str>,
        descriptors: &[TableDescriptor],
    ) -> Result<Vec<Table>> {
        let mut tables = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            tables.push(self.fetch_table(section, descriptor).await?);
        }
        Ok(tables)
    }

    /// Fetch one scalar value as text.
    ///
    /// The contexts of `section` are tried in order until one returns a
    /// value. Results are remembered for the lifetime of the fetcher, misses
    /// included.
    #[instrument(skip(self), err, fields(snmp.host = %self.backend.config().hostname))]
    pub async fn get_single_oid(&self, section: Option<&str>, oid: &str) -> Result<Option<String>> {
        let oid = Oid::parse(oid)?;

        let memoized = self.memo().get(&oid).cloned();
        if let Some(value) = memoized {
            tracing::trace!(target: "snmp_table::fetch", { snmp.oid = %oid }, "single OID from memo");
            return Ok(value);
        }

        let mut value = None;
        for context in self.backend.config().contexts_for(section) {
            if let Some(raw) = self.backend.get(&oid, context).await? {
                value = Some(self.charset.decode(&raw));
                break;
            }
        }

        tracing::debug!(target: "snmp_table::fetch", { snmp.oid = %oid, snmp.found = value.is_some() }, "fetched single OID");
        self.memo().insert(oid, value.clone());
        Ok(value)
    }

    fn memo(&self) -> std::sync::MutexGuard<'_, HashMap<Oid, Option<String>>> {
        // A poisoned memo only holds complete entries.
        self.single_oids
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Column-major to row-major.
fn transpose(columns: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let height = columns.first().map_or(0, Vec::len);
    let mut rows: Vec<Vec<Value>> = (0..height)
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();
    for column in columns {
        for (row, value) in rows.iter_mut().zip(column) {
            row.push(value);
        }
    }
    rows
}
