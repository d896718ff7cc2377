//! Row reconciliation.
//!
//! Devices do not always return the same rows in every column (some omit
//! 64-bit counters for a few interfaces, for instance). Rows are correlated
//! by end-OID and missing cells are padded, so the result is rectangular no
//! matter how uneven the walks were.

use std::collections::BTreeSet;

use bytes::Bytes;

use crate::fetch::FetchedColumn;
use crate::oid::EndOid;

/// Align fetched columns into a rectangular, still undecoded table.
///
/// Returns one value vector per column, each holding one entry per distinct
/// end-OID seen in any column, in ascending numeric end-OID order. Cells a
/// column has no row for are empty.
pub(crate) fn reconcile(columns: &[FetchedColumn]) -> Vec<Vec<Bytes>> {
    let keyed: Vec<Vec<(EndOid, Bytes)>> = columns.iter().map(keyed_rows).collect();

    let union: Vec<EndOid> = keyed
        .iter()
        .flatten()
        .map(|(end, _)| end.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    keyed
        .into_iter()
        .zip(columns)
        .map(|(rows, column)| align(&union, rows, column))
        .collect()
}

/// Rows of one column keyed by end-OID, in ascending end-OID order.
fn keyed_rows(column: &FetchedColumn) -> Vec<(EndOid, Bytes)> {
    let mut rows: Vec<(EndOid, Bytes)> = column
        .rows
        .iter()
        .map(|row| (row.oid.end_oid(&column.fetch_oid), row.value.clone()))
        .collect();

    if !rows.is_sorted_by(|a, b| a.0 <= b.0) {
        tracing::debug!(target: "snmp_table::fetch", { snmp.oid = %column.fetch_oid, snmp.rows = rows.len() }, "column not in walk order, sorting");
        rows.sort_by(|a, b| a.0.cmp(&b.0));
    }
    rows
}

/// Merge one sorted column against the end-OID union.
fn align(union: &[EndOid], rows: Vec<(EndOid, Bytes)>, column: &FetchedColumn) -> Vec<Bytes> {
    let mut out = Vec::with_capacity(union.len());
    let mut rows = rows.into_iter().peekable();

    for expected in union {
        // Only rows repeating an end-OID already consumed land here.
        while let Some((end, _)) = rows.next_if(|(end, _)| end < expected) {
            tracing::debug!(target: "snmp_table::fetch", { snmp.oid = %column.fetch_oid, snmp.end_oid = %end }, "skipping repeated row");
        }

        match rows.next_if(|(end, _)| end == expected) {
            Some((_, value)) => out.push(value),
            None => out.push(Bytes::new()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ValueEncoding;
    use crate::oid;
    use crate::oid::Oid;
    use crate::row::Row;

    fn column(fetch_oid: Oid, rows: &[(u32, &'static str)]) -> FetchedColumn {
        FetchedColumn {
            rows: rows
                .iter()
                .map(|&(end, value)| Row::new(fetch_oid.child(end), value))
                .collect(),
            fetch_oid,
            encoding: ValueEncoding::String,
        }
    }

    fn text(table: &[Vec<Bytes>]) -> Vec<Vec<&str>> {
        table
            .iter()
            .map(|col| {
                col.iter()
                    .map(|v| std::str::from_utf8(v).unwrap())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn gaps_are_padded() {
        let base = oid!(1, 3, 6, 1, 2, 1, 31, 1, 1, 1);
        let a = column(base.child(1), &[(1, "a1"), (2, "a2"), (3, "a3")]);
        let b = column(base.child(6), &[(1, "b1"), (3, "b3")]);

        let table = reconcile(&[a, b]);

        assert_eq!(
            text(&table),
            vec![vec!["a1", "a2", "a3"], vec!["b1", "", "b3"]]
        );
    }

    #[test]
    fn union_covers_rows_missing_from_first_column() {
        let a = column(oid!(1, 3, 1), &[(2, "a2")]);
        let b = column(oid!(1, 3, 2), &[(1, "b1"), (2, "b2"), (3, "b3")]);

        let table = reconcile(&[a, b]);

        assert_eq!(
            text(&table),
            vec![vec!["", "a2", ""], vec!["b1", "b2", "b3"]]
        );
    }

    #[test]
    fn end_oids_order_numerically() {
        let a = column(oid!(1, 3, 1), &[(10, "ten"), (9, "nine")]);
        let b = column(oid!(1, 3, 2), &[(9, "b9"), (10, "b10")]);

        let table = reconcile(&[a, b]);

        assert_eq!(
            text(&table),
            vec![vec!["nine", "ten"], vec!["b9", "b10"]]
        );
    }

    #[test]
    fn multi_arc_end_oids() {
        let fetch = oid!(1, 3, 6);
        let a = FetchedColumn {
            rows: vec![
                Row::new(fetch.join(&oid!(1, 10)), "x"),
                Row::new(fetch.join(&oid!(1, 9)), "y"),
                Row::new(fetch.join(&oid!(0, 20)), "z"),
            ],
            fetch_oid: fetch,
            encoding: ValueEncoding::String,
        };

        let table = reconcile(&[a]);

        assert_eq!(text(&table), vec![vec!["z", "y", "x"]]);
    }

    #[test]
    fn repeated_end_oid_keeps_first() {
        // rows outside the fetch OID collide after positional stripping
        let fetch = oid!(1, 3, 1);
        let a = FetchedColumn {
            rows: vec![
                Row::new(oid!(1, 3, 1, 5), "first"),
                Row::new(oid!(1, 3, 2, 5), "second"),
            ],
            fetch_oid: fetch,
            encoding: ValueEncoding::String,
        };

        let table = reconcile(&[a]);

        assert_eq!(text(&table), vec![vec!["first"]]);
    }

    #[test]
    fn empty_column_is_all_placeholders() {
        let a = column(oid!(1, 3, 1), &[(1, "a1"), (2, "a2")]);
        let b = column(oid!(1, 3, 2), &[]);

        let table = reconcile(&[a, b]);

        assert_eq!(text(&table), vec![vec!["a1", "a2"], vec!["", ""]]);
    }

    #[test]
    fn no_rows_at_all() {
        let table = reconcile(&[column(oid!(1, 3, 1), &[]), column(oid!(1, 3, 2), &[])]);
        assert_eq!(table, vec![Vec::<Bytes>::new(), Vec::new()]);
    }
}
