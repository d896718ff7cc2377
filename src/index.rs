//! Index column synthesis.
//!
//! An index column is never walked. Once every other column of a pass has
//! been fetched, its rows are derived from the OIDs of a reference column:
//! the non-index column with the most rows, the earliest declared one on a
//! tie.

use bytes::Bytes;

use crate::column::{Column, IndexKind};
use crate::fetch::FetchedColumn;
use crate::oid::Oid;
use crate::row::Row;

/// Fill in the rows of the index column, if the table has one.
///
/// `columns` and `fetched` are parallel. Without a non-index column to take
/// OIDs from, the index column stays empty.
pub(crate) fn resolve_index(columns: &[Column], fetched: &mut [FetchedColumn]) {
    let Some((position, kind)) = columns
        .iter()
        .enumerate()
        .find_map(|(i, c)| c.index_kind().map(|kind| (i, kind)))
    else {
        return;
    };

    let Some(reference) = reference_column(columns, fetched) else {
        tracing::debug!(target: "snmp_table::fetch", { snmp.index = %kind }, "no column to derive index from");
        return;
    };

    let fetch_oid = fetched[reference].fetch_oid.clone();
    let rows: Vec<Row> = fetched[reference]
        .rows
        .iter()
        .map(|row| Row::new(row.oid.clone(), index_value(kind, &row.oid, &fetch_oid)))
        .collect();

    tracing::trace!(target: "snmp_table::fetch", { snmp.index = %kind, snmp.reference = %fetch_oid, snmp.rows = rows.len() }, "synthesized index column");

    let index = &mut fetched[position];
    index.fetch_oid = fetch_oid;
    index.rows = rows;
}

/// Position of the non-index column with the most rows.
fn reference_column(columns: &[Column], fetched: &[FetchedColumn]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, (column, result)) in columns.iter().zip(fetched).enumerate() {
        if column.index_kind().is_some() {
            continue;
        }
        // strict comparison keeps the first of equally long columns
        if best.is_none_or(|b| result.rows.len() > fetched[b].rows.len()) {
            best = Some(i);
        }
    }
    best
}

/// Raw value of the index column for the row at `oid`.
fn index_value(kind: IndexKind, oid: &Oid, fetch_oid: &Oid) -> Bytes {
    match kind {
        IndexKind::End => oid.end_oid(fetch_oid).to_string().into(),
        IndexKind::String => oid.to_string().into(),
        IndexKind::Bin => oid.to_arc_bytes().into(),
        IndexKind::EndBin => oid.end_oid(fetch_oid).to_arc_bytes().into(),
        IndexKind::EndOctetString => {
            // drop the length arc
            let bytes = oid.end_oid(fetch_oid).to_arc_bytes();
            bytes.get(1..).unwrap_or_default().to_vec().into()
        }
    }
}
