//! Boxed-pair serial index.
//!
//! Stores `(Value, RowPosition)` pairs. Works for every orderable column type
//! and is the representation used for strings.

use crate::stats::IndexStats;
use crate::traits::{lower_bound, range_slice, KeyRange, SerialIndex};
use crate::IndexKind;
use alloc::string::String;
use alloc::vec::Vec;
use atlas_core::{ColumnStore, DataType, Error, Result, RowPosition, Value};

/// A serial index holding one boxed `(key, row position)` pair per non-null row.
#[derive(Clone, Debug)]
pub struct BoxedIndex {
    column: String,
    key_type: DataType,
    /// Entries sorted by key, ties by ascending row position.
    entries: Vec<(Value, RowPosition)>,
    /// Null rows, ascending.
    nulls: Vec<RowPosition>,
    stats: IndexStats,
}

impl BoxedIndex {
    /// Builds the index over `store`.
    ///
    /// Fails if the column's element type has no ordering.
    pub fn build(column: impl Into<String>, store: &ColumnStore) -> Result<Self> {
        let column = column.into();
        let key_type = store.data_type();
        if !key_type.is_orderable() {
            return Err(Error::not_orderable(column, key_type));
        }

        let mut entries = Vec::with_capacity(store.len() - store.null_count());
        let mut nulls = Vec::with_capacity(store.null_count());
        for row in 0..store.len() {
            match store.get(row) {
                Some(Value::Null) | None => nulls.push(row),
                Some(value) => entries.push((value, row)),
            }
        }

        // Stable sort: equal keys keep ascending row order.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let stats = IndexStats::from_sorted(
            entries.len(),
            nulls.len(),
            entries.windows(2).map(|w| w[0].0 != w[1].0),
        );

        Ok(Self {
            column,
            key_type,
            entries,
            nulls,
            stats,
        })
    }

    /// Returns the sorted entries.
    pub fn entries(&self) -> &[(Value, RowPosition)] {
        &self.entries
    }

    /// Only keys of the indexed type can match.
    fn accepts(&self, key: &Value) -> bool {
        key.data_type() == Some(self.key_type)
    }

    fn accepts_range(&self, range: &KeyRange<Value>) -> bool {
        range.keys().into_iter().all(|k| self.accepts(k))
    }

    fn slice(&self, range: &KeyRange<Value>) -> (usize, usize) {
        range_slice(self.entries.len(), range, |i, k| self.entries[i].0.cmp(k))
    }
}

impl SerialIndex for BoxedIndex {
    fn column(&self) -> &str {
        &self.column
    }

    fn key_type(&self) -> DataType {
        self.key_type
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Boxed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn lookup_equal(&self, key: &Value) -> Vec<RowPosition> {
        if !self.accepts(key) {
            return Vec::new();
        }
        let start = lower_bound(self.entries.len(), key, &|i: usize, k: &Value| {
            self.entries[i].0.cmp(k)
        });
        self.entries[start..]
            .iter()
            .take_while(|(k, _)| k == key)
            .map(|&(_, p)| p)
            .collect()
    }

    fn lookup_range(&self, range: &KeyRange<Value>) -> Vec<RowPosition> {
        if !self.accepts_range(range) {
            return Vec::new();
        }
        let (start, end) = self.slice(range);
        let matched = &self.entries[start..end];
        debug_assert!(matched.iter().all(|(k, _)| range.contains(k)));
        matched.iter().map(|&(_, p)| p).collect()
    }

    fn cost(&self, range: &KeyRange<Value>) -> usize {
        if !self.accepts_range(range) {
            return 0;
        }
        let (start, end) = self.slice(range);
        end - start
    }

    fn null_positions(&self) -> &[RowPosition] {
        &self.nulls
    }

    fn min_key(&self) -> Option<Value> {
        self.entries.first().map(|(k, _)| k.clone())
    }

    fn max_key(&self) -> Option<Value> {
        self.entries.last().map(|(k, _)| k.clone())
    }

    fn stats(&self) -> IndexStats {
        self.stats
    }
}
