//! Serial index trait definitions for Atlas.
//!
//! This module defines the `KeyRange` bounds type and the `SerialIndex` trait
//! that both index representations implement.

use crate::stats::IndexStats;
use crate::IndexKind;
use alloc::vec::Vec;
use atlas_core::{DataType, RowPosition, Value};
use core::cmp::Ordering;
use core::fmt;

/// A key range for index queries.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyRange<K> {
    /// All keys
    All,
    /// A single key (equality)
    Only(K),
    /// Keys >= lower bound
    LowerBound { value: K, exclusive: bool },
    /// Keys <= upper bound
    UpperBound { value: K, exclusive: bool },
    /// Keys between lower and upper bounds
    Bound {
        lower: K,
        upper: K,
        lower_exclusive: bool,
        upper_exclusive: bool,
    },
}

impl<K: Clone + Ord> KeyRange<K> {
    /// Creates a range for all keys.
    pub fn all() -> Self {
        KeyRange::All
    }

    /// Creates a range for a single key.
    pub fn only(key: K) -> Self {
        KeyRange::Only(key)
    }

    /// Creates a range with a lower bound.
    pub fn lower_bound(value: K, exclusive: bool) -> Self {
        KeyRange::LowerBound { value, exclusive }
    }

    /// Creates a range with an upper bound.
    pub fn upper_bound(value: K, exclusive: bool) -> Self {
        KeyRange::UpperBound { value, exclusive }
    }

    /// Creates a range with both bounds.
    pub fn bound(lower: K, upper: K, lower_exclusive: bool, upper_exclusive: bool) -> Self {
        KeyRange::Bound {
            lower,
            upper,
            lower_exclusive,
            upper_exclusive,
        }
    }

    /// Returns true if this range represents a single value (equality).
    pub fn is_only(&self) -> bool {
        matches!(self, KeyRange::Only(_))
    }

    /// Checks if a key is within this range.
    pub fn contains(&self, key: &K) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Only(k) => key == k,
            KeyRange::LowerBound { value, exclusive } => {
                if *exclusive {
                    key > value
                } else {
                    key >= value
                }
            }
            KeyRange::UpperBound { value, exclusive } => {
                if *exclusive {
                    key < value
                } else {
                    key <= value
                }
            }
            KeyRange::Bound {
                lower,
                upper,
                lower_exclusive,
                upper_exclusive,
            } => {
                let lower_ok = if *lower_exclusive {
                    key > lower
                } else {
                    key >= lower
                };
                let upper_ok = if *upper_exclusive {
                    key < upper
                } else {
                    key <= upper
                };
                lower_ok && upper_ok
            }
        }
    }

    /// Returns every bound key of this range.
    pub fn keys(&self) -> Vec<&K> {
        match self {
            KeyRange::All => Vec::new(),
            KeyRange::Only(k) => alloc::vec![k],
            KeyRange::LowerBound { value, .. } | KeyRange::UpperBound { value, .. } => {
                alloc::vec![value]
            }
            KeyRange::Bound { lower, upper, .. } => alloc::vec![lower, upper],
        }
    }
}

impl<K: fmt::Display> fmt::Display for KeyRange<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRange::All => f.write_str("(-inf, +inf)"),
            KeyRange::Only(k) => write!(f, "[{}]", k),
            KeyRange::LowerBound { value, exclusive } => {
                write!(f, "{}{}, +inf)", if *exclusive { "(" } else { "[" }, value)
            }
            KeyRange::UpperBound { value, exclusive } => {
                write!(f, "(-inf, {}{}", value, if *exclusive { ")" } else { "]" })
            }
            KeyRange::Bound {
                lower,
                upper,
                lower_exclusive,
                upper_exclusive,
            } => write!(
                f,
                "{}{}, {}{}",
                if *lower_exclusive { "(" } else { "[" },
                lower,
                upper,
                if *upper_exclusive { ")" } else { "]" }
            ),
        }
    }
}

/// Returns the first index in `0..len` for which `pred` is false, assuming
/// `pred` holds for a prefix of the indices.
#[inline]
pub(crate) fn partition(len: usize, mut pred: impl FnMut(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Returns the first of `len` ascending keys that is not less than `key`.
#[inline]
pub(crate) fn lower_bound<K>(len: usize, key: &K, cmp: &impl Fn(usize, &K) -> Ordering) -> usize {
    partition(len, |i| cmp(i, key) == Ordering::Less)
}

/// Returns the first of `len` ascending keys that is greater than `key`.
#[inline]
pub(crate) fn upper_bound<K>(len: usize, key: &K, cmp: &impl Fn(usize, &K) -> Ordering) -> usize {
    partition(len, |i| cmp(i, key) != Ordering::Greater)
}

/// Locates the half-open slice `[start, end)` of `len` ascending keys that
/// fall inside `range`. `cmp(i, k)` compares the key at `i` with bound `k`.
pub(crate) fn range_slice<K>(
    len: usize,
    range: &KeyRange<K>,
    cmp: impl Fn(usize, &K) -> Ordering,
) -> (usize, usize) {
    let start = match range {
        KeyRange::All | KeyRange::UpperBound { .. } => 0,
        KeyRange::Only(k) => lower_bound(len, k, &cmp),
        KeyRange::LowerBound { value, exclusive }
        | KeyRange::Bound {
            lower: value,
            lower_exclusive: exclusive,
            ..
        } => {
            if *exclusive {
                upper_bound(len, value, &cmp)
            } else {
                lower_bound(len, value, &cmp)
            }
        }
    };
    let end = match range {
        KeyRange::All | KeyRange::LowerBound { .. } => len,
        KeyRange::Only(k) => upper_bound(len, k, &cmp),
        KeyRange::UpperBound { value, exclusive }
        | KeyRange::Bound {
            upper: value,
            upper_exclusive: exclusive,
            ..
        } => {
            if *exclusive {
                lower_bound(len, value, &cmp)
            } else {
                upper_bound(len, value, &cmp)
            }
        }
    };
    // Inverted bounds select nothing.
    (start, end.max(start))
}

/// A dense, immutable index over one column: every non-null row appears once as
/// a `(key, row position)` entry sorted ascending by key, equal keys ordered by
/// row position. Null rows are kept in a side list.
///
/// Indices are built once from a column snapshot and never mutated; a changed
/// table needs a rebuilt index.
pub trait SerialIndex: Send + Sync + fmt::Debug {
    /// Returns the name of the indexed column.
    fn column(&self) -> &str;

    /// Returns the key type.
    fn key_type(&self) -> DataType;

    /// Returns the representation of this index.
    fn kind(&self) -> IndexKind;

    /// Returns the number of non-null entries.
    fn len(&self) -> usize;

    /// Returns true if the index holds no non-null entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of rows of the indexed column (entries plus nulls).
    fn row_count(&self) -> usize {
        self.len() + self.null_positions().len()
    }

    /// Returns the positions of rows whose key equals `key`, in ascending row
    /// position order. A null or differently typed key matches nothing.
    fn lookup_equal(&self, key: &Value) -> Vec<RowPosition>;

    /// Returns the positions of rows whose key lies in `range`, in ascending
    /// key order; positions of different keys are not sorted by position.
    fn lookup_range(&self, range: &KeyRange<Value>) -> Vec<RowPosition>;

    /// Range lookup with inclusive flags for each bound.
    fn lookup_between(
        &self,
        low: Value,
        low_inclusive: bool,
        high: Value,
        high_inclusive: bool,
    ) -> Vec<RowPosition> {
        self.lookup_range(&KeyRange::bound(low, high, !low_inclusive, !high_inclusive))
    }

    /// Returns the number of entries `lookup_range(range)` would produce,
    /// without materializing them.
    fn cost(&self, range: &KeyRange<Value>) -> usize;

    /// Returns the positions of null rows, ascending.
    fn null_positions(&self) -> &[RowPosition];

    /// Returns the smallest key.
    fn min_key(&self) -> Option<Value>;

    /// Returns the largest key.
    fn max_key(&self) -> Option<Value>;

    /// Returns build-time statistics.
    fn stats(&self) -> IndexStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_range_all() {
        let range: KeyRange<i32> = KeyRange::all();
        assert!(range.contains(&-100));
        assert!(range.contains(&0));
        assert!(range.contains(&100));
    }

    #[test]
    fn test_key_range_only() {
        let range = KeyRange::only(5);
        assert!(!range.contains(&4));
        assert!(range.contains(&5));
        assert!(!range.contains(&6));
    }

    #[test]
    fn test_key_range_lower_bound() {
        let range = KeyRange::lower_bound(5, false);
        assert!(!range.contains(&4));
        assert!(range.contains(&5));
        assert!(range.contains(&6));

        let range_ex = KeyRange::lower_bound(5, true);
        assert!(!range_ex.contains(&5));
        assert!(range_ex.contains(&6));
    }

    #[test]
    fn test_key_range_upper_bound() {
        let range = KeyRange::upper_bound(5, false);
        assert!(range.contains(&5));
        assert!(!range.contains(&6));

        let range_ex = KeyRange::upper_bound(5, true);
        assert!(range_ex.contains(&4));
        assert!(!range_ex.contains(&5));
    }

    #[test]
    fn test_key_range_mixed_exclusive() {
        // Lower inclusive, upper exclusive: [5, 10)
        let range1 = KeyRange::bound(5, 10, false, true);
        assert!(range1.contains(&5));
        assert!(range1.contains(&9));
        assert!(!range1.contains(&10));

        // Lower exclusive, upper inclusive: (5, 10]
        let range2 = KeyRange::bound(5, 10, true, false);
        assert!(!range2.contains(&5));
        assert!(range2.contains(&10));
    }

    #[test]
    fn test_key_range_empty() {
        let range = KeyRange::bound(10, 5, false, false);
        assert!(!range.contains(&5));
        assert!(!range.contains(&7));
        assert!(!range.contains(&10));
    }

    #[test]
    fn test_key_range_display() {
        use alloc::string::ToString;
        assert_eq!(KeyRange::bound(1, 5, false, true).to_string(), "[1, 5)");
        assert_eq!(KeyRange::lower_bound(3, true).to_string(), "(3, +inf)");
        assert_eq!(KeyRange::only(7).to_string(), "[7]");
    }

    #[test]
    fn test_range_slice() {
        let keys = [5, 10, 20, 20, 30];
        let slice = |r: KeyRange<i32>| range_slice(keys.len(), &r, |i, k| keys[i].cmp(k));

        assert_eq!(slice(KeyRange::all()), (0, 5));
        assert_eq!(slice(KeyRange::only(20)), (2, 4));
        assert_eq!(slice(KeyRange::only(15)), (2, 2));
        assert_eq!(slice(KeyRange::lower_bound(20, false)), (2, 5));
        assert_eq!(slice(KeyRange::lower_bound(20, true)), (4, 5));
        assert_eq!(slice(KeyRange::upper_bound(20, false)), (0, 4));
        assert_eq!(slice(KeyRange::upper_bound(20, true)), (0, 2));
        assert_eq!(slice(KeyRange::bound(10, 20, true, false)), (2, 4));
        assert_eq!(slice(KeyRange::bound(30, 5, false, false)), (4, 4));
    }
}
