//! Property-based invariant checks for the columnar table (spec §8
//! "Testable Properties"): key-index/alive-row-count agreement,
//! upsert idempotence, delete idempotence, and strictly-increasing
//! alive-row ordering, exercised over random op sequences the way
//! `tradefeed-ring`'s `property_tests.rs` exercises ring invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use tradefeed_codec::{Cell, Row, ROW_WIDTH};
use tradefeed_table::Table;

#[derive(Debug, Clone)]
enum TableOp {
    Upsert { key: String, symbol: String },
    Delete { key: String },
}

fn row_for(key: &str, symbol: &str) -> Row {
    let mut row: Row = std::array::from_fn(|_| Cell::Null);
    row[0] = Cell::Text(key.to_string());
    row[1] = Cell::Text(symbol.to_string());
    row
}

fn op_strategy() -> impl Strategy<Value = TableOp> {
    let key = (0usize..8).prop_map(|i| format!("K{i}"));
    let symbol = prop_oneof![Just("AAPL".to_string()), Just("MSFT".to_string())];
    prop_oneof![
        (key.clone(), symbol).prop_map(|(key, symbol)| TableOp::Upsert { key, symbol }),
        key.prop_map(|key| TableOp::Delete { key }),
    ]
}

proptest! {
    /// `|key_index| = count of live slots`, tracked here via a
    /// shadow `HashSet` of keys believed live, and `alive_rows().len()`
    /// must agree with it after every op in the sequence.
    #[test]
    fn alive_count_matches_live_key_set(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let table = Table::new();
        let mut live: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                TableOp::Upsert { key, symbol } => {
                    table.upsert(row_for(&key, &symbol)).unwrap();
                    live.insert(key);
                }
                TableOp::Delete { key } => {
                    let removed = table.delete(&key);
                    prop_assert_eq!(removed, live.remove(&key));
                }
            }
            prop_assert_eq!(table.alive_rows().len(), live.len());
        }
    }

    /// Alive-row projection is always in strictly increasing slot
    /// order, regardless of the insert/delete sequence that produced
    /// it.
    #[test]
    fn alive_rows_are_strictly_increasing(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let table = Table::new();
        for op in ops {
            match op {
                TableOp::Upsert { key, symbol } => {
                    table.upsert(row_for(&key, &symbol)).unwrap();
                }
                TableOp::Delete { key } => {
                    table.delete(&key);
                }
            }
        }
        let alive = table.alive_rows();
        prop_assert!(alive.windows(2).all(|w| w[0] < w[1]));
    }

    /// `upsert; upsert` with the same key never grows `row_count` and
    /// always exposes the last-written value.
    #[test]
    fn repeated_upsert_is_idempotent_on_row_count(
        key in "[A-Z]{3}[0-9]",
        symbols in prop::collection::vec(prop_oneof![Just("AAPL"), Just("MSFT"), Just("GOOG")], 1..20),
    ) {
        let table = Table::new();
        for symbol in &symbols {
            table.upsert(row_for(&key, symbol)).unwrap();
        }
        prop_assert_eq!(table.row_count(), 1);
        let last = symbols.last().unwrap();
        let fetched = table.row_by_key(&key).unwrap();
        prop_assert_eq!(fetched[1].to_string(), last.to_string());
    }

    /// `delete(k); delete(k)` — the second call is always a no-op
    /// that returns `false`.
    #[test]
    fn second_delete_always_returns_false(key in "[A-Z]{3}[0-9]") {
        let table = Table::new();
        table.upsert(row_for(&key, "AAPL")).unwrap();
        prop_assert!(table.delete(&key));
        prop_assert!(!table.delete(&key));
        prop_assert!(!table.delete(&key));
    }

    /// Every slot `search` returns has its target column containing
    /// the lower-cased needle, in strictly increasing slot order, and
    /// never more than `limit` results.
    #[test]
    fn search_results_are_bounded_ordered_and_matching(
        needle in "[a-z]{1,4}",
        symbols in prop::collection::vec("[A-Za-z]{2,8}", 0..60),
        limit in 1usize..30,
    ) {
        let table = Table::new();
        for (i, symbol) in symbols.iter().enumerate() {
            table.upsert(row_for(&format!("K{i}"), symbol)).unwrap();
        }
        let results = table.search(&needle, 1, limit);
        prop_assert!(results.len() <= limit);
        prop_assert!(results.windows(2).all(|w| w[0] < w[1]));
        for slot in &results {
            let cell = table.cell(*slot, 1).unwrap();
            prop_assert!(cell.to_lower_text().contains(&needle.to_lowercase()));
        }
    }

    /// `search("", _, _)` is always empty, regardless of table
    /// contents.
    #[test]
    fn empty_needle_always_returns_no_results(
        symbols in prop::collection::vec("[A-Za-z]{2,8}", 0..20),
        col in 0usize..ROW_WIDTH,
        limit in 0usize..50,
    ) {
        let table = Table::new();
        for (i, symbol) in symbols.iter().enumerate() {
            table.upsert(row_for(&format!("K{i}"), symbol)).unwrap();
        }
        prop_assert!(table.search("", col, limit).is_empty());
    }

    /// Applying a batch of upserts under one `batch_upsert` call
    /// yields the same final row count and alive-row projection as
    /// applying each upsert one at a time, in the same order (spec §8
    /// "Batching laws").
    #[test]
    fn batch_upsert_matches_sequential_upsert(
        keys in prop::collection::vec(0usize..10, 0..100),
        symbols in prop::collection::vec(prop_oneof![Just("AAPL"), Just("MSFT")], 0..100),
    ) {
        let n = keys.len().min(symbols.len());
        let rows: Vec<Row> = (0..n)
            .map(|i| row_for(&format!("K{}", keys[i]), symbols[i]))
            .collect();

        let batched = Table::new();
        batched.batch_upsert(rows.clone());

        let sequential = Table::new();
        for row in rows {
            sequential.upsert(row).unwrap();
        }

        prop_assert_eq!(batched.row_count(), sequential.row_count());
        prop_assert_eq!(batched.alive_rows(), sequential.alive_rows());
    }
}
