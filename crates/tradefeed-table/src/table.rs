//! Columnar table: stable slots, tombstoned deletes, key-indexed
//! upsert, alive-row projection, substring search .

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use tradefeed_codec::{Cell, Row, ROW_WIDTH};

use crate::error::TableError;

/// Hard cap on slots per table .
pub const CAPACITY: usize = 2_000_000;

/// Outcome of a single `upsert` .
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(usize),
    Updated(usize),
}

/// Outcome of a `batch_upsert`: counts plus how many rows were rejected
/// for capacity .
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchUpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub rejected: usize,
}

fn zero_row() -> Row {
    std::array::from_fn(|_| Cell::Null)
}

fn business_key(row: &Row) -> String {
    row[0].to_string()
}

/// A fixed-width, 50-column in-memory table .
///
/// Many concurrent readers, one writer at a time on `rows`; the key
/// index is a `DashMap` so point lookups never contend with the
/// writer's row-vector lock, and `row_count` is readable without any
/// lock .
pub struct Table {
    rows: RwLock<Vec<Row>>,
    key_index: DashMap<String, usize>,
    alive: RwLock<Vec<usize>>,
    row_count: AtomicUsize,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            key_index: DashMap::new(),
            alive: RwLock::new(Vec::new()),
            row_count: AtomicUsize::new(0),
        }
    }

    /// Number of slots, including tombstones . Observable
    /// without acquiring the row lock.
    pub fn row_count(&self) -> usize {
        self.row_count.load(Ordering::Acquire)
    }

    /// Coarse byte-count estimate for diagnostics .
    pub fn memory_estimate(&self) -> usize {
        self.rows.read().len() * std::mem::size_of::<Row>()
    }

    /// Inserts or wholesale-replaces a row keyed by column 0.
    pub fn upsert(&self, row: Row) -> Result<UpsertOutcome, TableError> {
        let key = business_key(&row);
        let mut rows = self.rows.write();
        Ok(self.upsert_locked(&mut rows, key, row)?)
    }

    /// Applies an entire batch under a single writer-lock acquisition
    /// .
    pub fn batch_upsert(&self, batch: Vec<Row>) -> BatchUpsertOutcome {
        let mut outcome = BatchUpsertOutcome::default();
        let mut rows = self.rows.write();
        for row in batch {
            let key = business_key(&row);
            match self.upsert_locked(&mut rows, key, row) {
                Ok(UpsertOutcome::Inserted(_)) => outcome.inserted += 1,
                Ok(UpsertOutcome::Updated(_)) => outcome.updated += 1,
                Err(TableError::CapacityExceeded { .. }) => outcome.rejected += 1,
            }
        }
        outcome
    }

    fn upsert_locked(
        &self,
        rows: &mut Vec<Row>,
        key: String,
        row: Row,
    ) -> Result<UpsertOutcome, TableError> {
        if let Some(slot_ref) = self.key_index.get(&key) {
            let slot = *slot_ref;
            drop(slot_ref);
            rows[slot] = row;
            return Ok(UpsertOutcome::Updated(slot));
        }

        if rows.len() >= CAPACITY {
            return Err(TableError::CapacityExceeded { capacity: CAPACITY });
        }

        let slot = rows.len();
        rows.push(row);
        self.key_index.insert(key, slot);
        self.row_count.fetch_add(1, Ordering::AcqRel);
        self.alive.write().push(slot);
        Ok(UpsertOutcome::Inserted(slot))
    }

    /// Tombstones the slot for `key` if present. Returns whether a row
    /// was actually removed .
    pub fn delete(&self, key: &str) -> bool {
        let Some((_, slot)) = self.key_index.remove(key) else {
            return false;
        };
        self.rows.write()[slot] = zero_row();
        self.alive.write().retain(|&s| s != slot);
        true
    }

    /// Reads a row by business key. `None` for missing or tombstoned
    /// keys .
    pub fn row_by_key(&self, key: &str) -> Option<Row> {
        let slot = *self.key_index.get(key)?;
        Some(self.rows.read()[slot].clone())
    }

    /// Reads a row by slot. `None` for out-of-range; a zeroed row for
    /// a tombstoned slot .
    pub fn row_by_slot(&self, slot: usize) -> Option<Row> {
        let rows = self.rows.read();
        rows.get(slot).cloned()
    }

    /// Bounds-checked single-cell read; tombstoned slots yield `Null`
    /// .
    pub fn cell(&self, slot: usize, col: usize) -> Option<Cell> {
        if col >= ROW_WIDTH {
            return None;
        }
        let rows = self.rows.read();
        rows.get(slot).map(|row| row[col].clone())
    }

    /// Ordered slot indices of all live (non-tombstoned) rows . Maintained incrementally on every `upsert`/`delete`, so
    /// it is always current — equivalent to rebuilding it after every
    /// applied batch, per the behavioral-equivalence note in §4.7.
    pub fn alive_rows(&self) -> Vec<usize> {
        self.alive.read().clone()
    }

    /// Bounded, case-insensitive substring search over one column
    /// . Scans live slots in ascending order; empty needle
    /// returns no results.
    pub fn search(&self, needle: &str, col: usize, limit: usize) -> Vec<usize> {
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }
        let needle = needle.to_lowercase();
        let alive = self.alive.read();
        let rows = self.rows.read();
        let mut matches = Vec::with_capacity(limit.min(alive.len()));
        for &slot in alive.iter() {
            if matches.len() >= limit {
                break;
            }
            if let Some(row) = rows.get(slot) {
                if col < ROW_WIDTH && row[col].to_lower_text().contains(&needle) {
                    matches.push(slot);
                }
            }
        }
        matches
    }
}
