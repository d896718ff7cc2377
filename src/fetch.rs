//! Column fetching.
//!
//! One subtree walk per target column, once per SNMPv3 context, with
//! defenses against agents that repeat OIDs. Opted-in columns go through the
//! walk cache.

use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::{CacheMode, WalkCache};
use crate::column::{Column, ValueEncoding};
use crate::error::{CacheError, Result};
use crate::format::hex;
use crate::oid::Oid;
use crate::row::Row;

/// Raw rows of one column, still undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchedColumn {
    /// OID the column was walked under; end-OIDs are relative to it.
    pub(crate) fetch_oid: Oid,
    pub(crate) rows: Vec<Row>,
    pub(crate) encoding: ValueEncoding,
}

/// Walk cache handle plus the mode it is used in.
#[derive(Clone, Copy)]
pub(crate) struct CacheAccess<'a> {
    pub(crate) cache: Option<&'a Arc<dyn WalkCache>>,
    pub(crate) mode: CacheMode,
}

/// Tracks OIDs already returned within one column walk.
///
/// Later rows repeating an OID are dropped, whatever their value.
struct SeenOids {
    seen: HashSet<Oid>,
}

impl SeenOids {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Append the rows of one context's walk to `out`.
    fn extend(&mut self, fetch_oid: &Oid, mut rows: Vec<Row>, out: &mut Vec<Row>) {
        // Some agents answer every GETNEXT with the same OID instead of
        // ending the walk.
        if rows.len() > 1 && rows[0].oid == rows[1].oid {
            tracing::debug!(target: "snmp_table::walk", { snmp.oid = %fetch_oid, snmp.duplicate = %rows[0].oid, snmp.rows = rows.len() }, "broken agent repeats first OID, keeping only the first row");
            rows.truncate(1);
        }

        for row in rows {
            if self.seen.contains(&row.oid) {
                tracing::debug!(target: "snmp_table::walk", { snmp.oid = %fetch_oid, snmp.duplicate = %row.oid, snmp.value = %hex::Bytes(&row.value) }, "dropping duplicate OID");
                continue;
            }
            self.seen.insert(row.oid.clone());
            out.push(row);
        }
    }
}

/// Fetch the raw rows of one column.
///
/// Index columns return no rows without touching backend or cache; their
/// rows are synthesized once all other columns are in.
pub(crate) async fn fetch_column<B: Backend>(
    backend: &B,
    column: &Column,
    fetch_oid: &Oid,
    section: Option<&str>,
    table_base: &Oid,
    cache: CacheAccess<'_>,
) -> Result<FetchedColumn> {
    let fetched = |rows| FetchedColumn {
        fetch_oid: fetch_oid.clone(),
        rows,
        encoding: column.encoding(),
    };

    if column.index_kind().is_some() {
        return Ok(fetched(Vec::new()));
    }

    let host = backend.config().hostname.as_str();
    let walk_cache = if column.is_cached() { cache.cache } else { None };

    if let Some(walk_cache) = walk_cache
        && cache.mode == CacheMode::Reuse
    {
        match cache_read(walk_cache, host, fetch_oid).await {
            Ok(Some(rows)) => {
                tracing::debug!(target: "snmp_table::cache", { snmp.host = host, snmp.oid = %fetch_oid, snmp.rows = rows.len() }, "using cached walk");
                return Ok(fetched(rows));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(target: "snmp_table::cache", { snmp.host = host, snmp.oid = %fetch_oid, error = %e }, "walk cache read failed, walking device");
            }
        }
    }

    let rows = walk_contexts(backend, fetch_oid, section, table_base).await?;

    if let Some(walk_cache) = walk_cache
        && let Err(e) = cache_write(walk_cache, host, fetch_oid, rows.clone()).await
    {
        tracing::warn!(target: "snmp_table::cache", { snmp.host = host, snmp.oid = %fetch_oid, error = %e }, "walk cache write failed");
    }

    Ok(fetched(rows))
}

/// Cache implementations do blocking file I/O; keep it off the runtime
/// worker threads.
async fn cache_read(
    cache: &Arc<dyn WalkCache>,
    host: &str,
    fetch_oid: &Oid,
) -> std::result::Result<Option<Vec<Row>>, CacheError> {
    let (cache, host, fetch_oid) = (Arc::clone(cache), host.to_owned(), fetch_oid.clone());
    tokio::task::spawn_blocking(move || cache.read(&host, &fetch_oid))
        .await
        .unwrap_or_else(|e| Err(CacheError::Task(e.to_string().into())))
}

async fn cache_write(
    cache: &Arc<dyn WalkCache>,
    host: &str,
    fetch_oid: &Oid,
    rows: Vec<Row>,
) -> std::result::Result<(), CacheError> {
    let (cache, host, fetch_oid) = (Arc::clone(cache), host.to_owned(), fetch_oid.clone());
    tokio::task::spawn_blocking(move || cache.write(&host, &fetch_oid, &rows))
        .await
        .unwrap_or_else(|e| Err(CacheError::Task(e.to_string().into())))
}

/// Walk `fetch_oid` once per context of `section`, concatenating in context
/// order. Backend errors abort immediately.
async fn walk_contexts<B: Backend>(
    backend: &B,
    fetch_oid: &Oid,
    section: Option<&str>,
    table_base: &Oid,
) -> Result<Vec<Row>> {
    let mut seen = SeenOids::new();
    let mut rows = Vec::new();

    for context in backend.config().contexts_for(section) {
        let walked = backend.walk(fetch_oid, section, table_base, context).await?;
        tracing::trace!(target: "snmp_table::walk", { snmp.oid = %fetch_oid, snmp.context = ?context, snmp.rows = walked.len() }, "walked column");
        seen.extend(fetch_oid, walked, &mut rows);
    }

    Ok(rows)
}
