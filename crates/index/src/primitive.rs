//! Primitive-array-backed serial index.
//!
//! Keys and row positions live in two parallel arrays, so an index over `n`
//! rows costs two allocations regardless of `n`.

use crate::key::PrimitiveKey;
use crate::stats::IndexStats;
use crate::traits::{lower_bound, range_slice, KeyRange, SerialIndex};
use crate::IndexKind;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use atlas_core::{ColumnStore, DataType, Error, Result, RowPosition, Value};

/// A serial index over a boolean or numeric column.
#[derive(Clone, Debug)]
pub struct PrimitiveIndex<K: PrimitiveKey> {
    column: String,
    /// Sorted keys.
    keys: Vec<K>,
    /// Row position of each key, parallel to `keys`.
    positions: Vec<RowPosition>,
    /// Null rows, ascending.
    nulls: Vec<RowPosition>,
    stats: IndexStats,
}

impl<K: PrimitiveKey> PrimitiveIndex<K> {
    /// Builds the index over `store`.
    ///
    /// Fails with a type mismatch if the column's element type is not `K`.
    pub fn build(column: impl Into<String>, store: &ColumnStore) -> Result<Self> {
        let column = column.into();
        let values = K::slice(store.data()).ok_or_else(|| {
            Error::type_mismatch(
                format!("primitive index on column {}", column),
                K::DATA_TYPE,
                store.data_type(),
            )
        })?;

        let validity = store.validity();
        let mut positions: Vec<RowPosition> = validity.iter_set().collect();
        let nulls: Vec<RowPosition> = validity.iter_unset().collect();

        // `sort_by` is stable and positions start ascending, so equal keys
        // keep ascending row order.
        positions.sort_by(|&a, &b| K::compare(&values[a], &values[b]));
        let keys: Vec<K> = positions.iter().map(|&p| values[p]).collect();

        let stats = IndexStats::from_sorted(
            keys.len(),
            nulls.len(),
            keys.windows(2).map(|w| K::compare(&w[0], &w[1]).is_ne()),
        );

        Ok(Self {
            column,
            keys,
            positions,
            nulls,
            stats,
        })
    }

    /// Returns the sorted keys.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the row positions, parallel to [`keys`](Self::keys).
    pub fn positions(&self) -> &[RowPosition] {
        &self.positions
    }

    /// Equality lookup on an unboxed key.
    pub fn get(&self, key: K) -> Vec<RowPosition> {
        let cmp = |i: usize, k: &K| K::compare(&self.keys[i], k);
        let start = lower_bound(self.keys.len(), &key, &cmp);
        self.keys[start..]
            .iter()
            .zip(&self.positions[start..])
            .take_while(|(k, _)| K::compare(*k, &key).is_eq())
            .map(|(_, &p)| p)
            .collect()
    }

    /// Range lookup on unboxed bounds.
    pub fn get_range(&self, range: &KeyRange<K>) -> Vec<RowPosition> {
        let (start, end) = self.slice(range);
        self.positions[start..end].to_vec()
    }

    fn slice(&self, range: &KeyRange<K>) -> (usize, usize) {
        range_slice(self.keys.len(), range, |i, k| K::compare(&self.keys[i], k))
    }

    /// Converts a range of values to a range of keys; None if any bound has
    /// another type.
    fn unbox_range(range: &KeyRange<Value>) -> Option<KeyRange<K>> {
        Some(match range {
            KeyRange::All => KeyRange::All,
            KeyRange::Only(v) => KeyRange::Only(K::from_value(v)?),
            KeyRange::LowerBound { value, exclusive } => KeyRange::LowerBound {
                value: K::from_value(value)?,
                exclusive: *exclusive,
            },
            KeyRange::UpperBound { value, exclusive } => KeyRange::UpperBound {
                value: K::from_value(value)?,
                exclusive: *exclusive,
            },
            KeyRange::Bound {
                lower,
                upper,
                lower_exclusive,
                upper_exclusive,
            } => KeyRange::Bound {
                lower: K::from_value(lower)?,
                upper: K::from_value(upper)?,
                lower_exclusive: *lower_exclusive,
                upper_exclusive: *upper_exclusive,
            },
        })
    }
}

impl<K: PrimitiveKey> SerialIndex for PrimitiveIndex<K> {
    fn column(&self) -> &str {
        &self.column
    }

    fn key_type(&self) -> DataType {
        K::DATA_TYPE
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Primitive
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn lookup_equal(&self, key: &Value) -> Vec<RowPosition> {
        match K::from_value(key) {
            Some(k) => self.get(k),
            None => Vec::new(),
        }
    }

    fn lookup_range(&self, range: &KeyRange<Value>) -> Vec<RowPosition> {
        match Self::unbox_range(range) {
            Some(r) => self.get_range(&r),
            None => Vec::new(),
        }
    }

    fn cost(&self, range: &KeyRange<Value>) -> usize {
        match Self::unbox_range(range) {
            Some(r) => {
                let (start, end) = self.slice(&r);
                end - start
            }
            None => 0,
        }
    }

    fn null_positions(&self) -> &[RowPosition] {
        &self.nulls
    }

    fn min_key(&self) -> Option<Value> {
        self.keys.first().map(|k| k.into_value())
    }

    fn max_key(&self) -> Option<Value> {
        self.keys.last().map(|k| k.into_value())
    }

    fn stats(&self) -> IndexStats {
        self.stats
    }
}
