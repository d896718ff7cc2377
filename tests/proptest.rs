//! Property-based tests for snmp-table.
//!
//! Random column layouts are written out as stored walks and fetched through
//! the full pipeline; the assembled table must stay rectangular and ordered
//! however uneven the columns are.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::OnceLock;

use proptest::prelude::*;
use snmp_table::{
    Column, HostConfig, IndexKind, Oid, StoredWalkBackend, Table, TableDescriptor, TableFetcher,
};
use tokio::runtime::Runtime;

const BASE: &str = ".1.3.6.1.4.1.99.1";

fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("failed to create runtime"))
}

// =============================================================================
// Strategies
// =============================================================================

/// Row indices per column, and whether the device returns them in reverse.
fn arb_columns() -> impl Strategy<Value = Vec<(BTreeSet<u32>, bool)>> {
    prop::collection::vec(
        (prop::collection::btree_set(1u32..500, 0..25), any::<bool>()),
        1..5,
    )
}

fn arb_arcs() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..12)
}

// =============================================================================
// Helpers
// =============================================================================

fn stored_walk(columns: &[(BTreeSet<u32>, bool)]) -> String {
    let mut walk = String::new();
    for (i, (indices, reversed)) in columns.iter().enumerate() {
        let column = i + 1;
        let ordered: Vec<u32> = if *reversed {
            indices.iter().rev().copied().collect()
        } else {
            indices.iter().copied().collect()
        };
        for index in ordered {
            writeln!(walk, "{BASE}.{column}.{index} \"c{column}r{index}\"").unwrap();
        }
    }
    walk
}

fn fetch(columns: &[(BTreeSet<u32>, bool)]) -> Table {
    let backend =
        StoredWalkBackend::parse(HostConfig::new("prop"), stored_walk(columns).as_bytes())
            .unwrap();
    let fetcher = TableFetcher::new(backend);

    let mut declared = vec![Column::index(IndexKind::End)];
    declared.extend((1..=columns.len()).map(|c| Column::oid(c.to_string())));
    let descriptor = TableDescriptor::new(BASE, declared);

    runtime()
        .block_on(fetcher.fetch_table(None, &descriptor))
        .unwrap()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn tables_are_rectangular_and_ordered(columns in arb_columns()) {
        let table = fetch(&columns);

        let union: BTreeSet<u32> = columns.iter().flat_map(|(indices, _)| indices).copied().collect();
        prop_assert_eq!(table.len(), union.len());

        // the first of the longest columns provides the index values
        let longest = columns.iter().map(|(indices, _)| indices.len()).max().unwrap_or(0);
        let reference = columns
            .iter()
            .find(|(indices, _)| indices.len() == longest)
            .map(|(indices, _)| indices);

        for (row, index) in table.iter().zip(&union) {
            prop_assert_eq!(row.len(), columns.len() + 1);

            let expected_index = match reference {
                Some(r) if r.contains(index) => index.to_string(),
                _ => String::new(),
            };
            prop_assert_eq!(row[0].as_str(), Some(expected_index.as_str()));

            for (i, (indices, _)) in columns.iter().enumerate() {
                let expected = if indices.contains(index) {
                    format!("c{}r{}", i + 1, index)
                } else {
                    String::new()
                };
                prop_assert_eq!(row[i + 1].as_str(), Some(expected.as_str()));
            }
        }
    }

    #[test]
    fn oid_order_is_numeric(a in arb_arcs(), b in arb_arcs()) {
        let (oid_a, oid_b) = (Oid::new(a.clone()), Oid::new(b.clone()));
        prop_assert_eq!(oid_a.cmp(&oid_b), a.cmp(&b));
    }

    #[test]
    fn oid_text_roundtrip(arcs in arb_arcs()) {
        let oid = Oid::new(arcs);
        prop_assert_eq!(Oid::parse(&oid.to_string()).unwrap(), oid);
    }
}
