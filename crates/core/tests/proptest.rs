//! Property-based tests for atlas-core using proptest.

use atlas_core::{Bitmap, ColumnStore, DataType, Table, Value};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        (-5i32..5).prop_map(Value::Int32),
        (-5i64..5).prop_map(Value::Int64),
        prop_oneof![
            (-5i32..5).prop_map(|v| f64::from(v) / 2.0),
            Just(f64::NAN),
            Just(-0.0),
            Just(f64::INFINITY),
        ]
        .prop_map(Value::Float64),
        "[a-c]{0,2}".prop_map(Value::String),
    ]
}

fn hash_of(v: &Value) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

fn nullable_i64s() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.7, any::<i64>()), 0..200)
}

proptest! {
    /// Value ordering is a total order consistent with equality and hashing.
    #[test]
    fn value_order_is_total(a in value(), b in value(), c in value()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        if a == b {
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    /// Coercion never changes a value's position relative to same-typed peers.
    #[test]
    fn int_widening_preserves_order(a in any::<i32>(), b in any::<i32>()) {
        let (wa, wb) = (
            Value::Int32(a).coerce_to(DataType::Int64).unwrap(),
            Value::Int32(b).coerce_to(DataType::Int64).unwrap(),
        );
        prop_assert_eq!(wa.cmp(&wb), a.cmp(&b));
        let (fa, fb) = (
            Value::Int32(a).coerce_to(DataType::Float64).unwrap(),
            Value::Int32(b).coerce_to(DataType::Float64).unwrap(),
        );
        prop_assert_eq!(fa.cmp(&fb), a.cmp(&b));
    }

    /// Narrowing succeeds exactly when the value fits.
    #[test]
    fn int_narrowing(v in any::<i64>()) {
        let narrowed = Value::Int64(v).coerce_to(DataType::Int32);
        prop_assert_eq!(narrowed, i32::try_from(v).ok().map(Value::Int32));
    }

    /// An Int64 converts to Float64 only when the float equals it exactly.
    #[test]
    fn int_to_float_is_exact(v in prop_oneof![any::<i64>(), (-(1i64 << 54))..(1i64 << 54)]) {
        match Value::Int64(v).coerce_to(DataType::Float64) {
            Some(Value::Float64(f)) => prop_assert_eq!(f as i128, i128::from(v)),
            Some(other) => prop_assert!(false, "unexpected {:?}", other),
            None => prop_assert_ne!((v as f64) as i128, i128::from(v)),
        }
    }

    /// A column built from values reads them back, nulls included.
    #[test]
    fn column_reads_back_its_cells(cells in nullable_i64s()) {
        let store =
            ColumnStore::from_values(DataType::Int64, cells.iter().map(|&c| Value::from(c)))
                .unwrap();
        prop_assert_eq!(store.len(), cells.len());
        prop_assert_eq!(store.null_count(), cells.iter().filter(|c| c.is_none()).count());
        for (row, cell) in cells.iter().enumerate() {
            prop_assert_eq!(store.get(row), Some(Value::from(*cell)));
            prop_assert_eq!(store.is_null(row), cell.is_none());
        }
        prop_assert_eq!(store.get(cells.len()), None);
    }

    /// Set and unset bits partition the bitmap.
    #[test]
    fn bitmap_partitions(bits in prop::collection::vec(any::<bool>(), 0..300)) {
        let bitmap: Bitmap = bits.iter().copied().collect();
        let set: Vec<usize> = bitmap.iter_set().collect();
        let unset: Vec<usize> = bitmap.iter_unset().collect();
        prop_assert_eq!(set.len() + unset.len(), bits.len());
        prop_assert_eq!(set.len(), bitmap.count_set());
        prop_assert!(set.iter().all(|&i| bits[i]));
        prop_assert!(unset.iter().all(|&i| !bits[i]));
    }

    /// Subsetting a table picks the same rows from every column.
    #[test]
    fn subset_prunes_every_column(
        cells in nullable_i64s(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..50),
    ) {
        prop_assume!(!cells.is_empty());
        let positions: Vec<usize> = picks.iter().map(|p| p.index(cells.len())).collect();
        let table = Table::of([
            (
                "a",
                ColumnStore::from_values(DataType::Int64, cells.iter().map(|&c| Value::from(c)))
                    .unwrap(),
            ),
            ("row", ColumnStore::from_i64s((0..cells.len() as i64).collect())),
        ])
        .unwrap();
        let subset = table.subset(&positions);
        prop_assert_eq!(subset.row_count(), positions.len());
        prop_assert_eq!(subset.width(), 2);
        for (i, &p) in positions.iter().enumerate() {
            prop_assert_eq!(subset.column("a").unwrap().get(i), Some(Value::from(cells[p])));
            prop_assert_eq!(subset.column("row").unwrap().get(i), Some(Value::Int64(p as i64)));
        }
    }
}
