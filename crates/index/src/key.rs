//! Fixed-width key types for primitive-array-backed indices.

use atlas_core::{compare_f64, ColumnData, DataType, Value};
use core::cmp::Ordering;
use core::fmt;

/// A key type stored unboxed in a [`PrimitiveIndex`](crate::PrimitiveIndex).
///
/// `compare` must agree with `Value::cmp` on the corresponding values, so a
/// primitive index and a boxed index over the same column sort identically.
pub trait PrimitiveKey: Copy + Send + Sync + fmt::Debug + 'static {
    /// The column type this key reads.
    const DATA_TYPE: DataType;

    /// Borrows the column's value slots if they hold this key type.
    fn slice(data: &ColumnData) -> Option<&[Self]>;

    /// Extracts a key from a value of exactly this key type.
    fn from_value(value: &Value) -> Option<Self>;

    /// Wraps the key back into a value.
    fn into_value(self) -> Value;

    /// Total order over keys.
    fn compare(a: &Self, b: &Self) -> Ordering;
}

impl PrimitiveKey for bool {
    const DATA_TYPE: DataType = DataType::Boolean;

    fn slice(data: &ColumnData) -> Option<&[Self]> {
        data.as_bools()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    #[inline]
    fn compare(a: &Self, b: &Self) -> Ordering {
        a.cmp(b)
    }
}

impl PrimitiveKey for i32 {
    const DATA_TYPE: DataType = DataType::Int32;

    fn slice(data: &ColumnData) -> Option<&[Self]> {
        data.as_i32s()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i32()
    }

    fn into_value(self) -> Value {
        Value::Int32(self)
    }

    #[inline]
    fn compare(a: &Self, b: &Self) -> Ordering {
        a.cmp(b)
    }
}

impl PrimitiveKey for i64 {
    const DATA_TYPE: DataType = DataType::Int64;

    fn slice(data: &ColumnData) -> Option<&[Self]> {
        data.as_i64s()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::Int64(self)
    }

    #[inline]
    fn compare(a: &Self, b: &Self) -> Ordering {
        a.cmp(b)
    }
}

impl PrimitiveKey for f64 {
    const DATA_TYPE: DataType = DataType::Float64;

    fn slice(data: &ColumnData) -> Option<&[Self]> {
        data.as_f64s()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn into_value(self) -> Value {
        Value::Float64(self)
    }

    #[inline]
    fn compare(a: &Self, b: &Self) -> Ordering {
        compare_f64(*a, *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agrees_with_value<K: PrimitiveKey>(a: K, b: K) {
        assert_eq!(K::compare(&a, &b), a.into_value().cmp(&b.into_value()));
    }

    #[test]
    fn test_compare_matches_value_order() {
        agrees_with_value(false, true);
        agrees_with_value(-3i32, 3i32);
        agrees_with_value(i64::MIN, 0i64);
        agrees_with_value(1.5f64, f64::NAN);
        agrees_with_value(f64::NAN, f64::NAN);
        agrees_with_value(-0.0f64, 0.0f64);
    }

    #[test]
    fn test_from_value_is_exact() {
        assert_eq!(i64::from_value(&Value::Int64(4)), Some(4));
        assert_eq!(i64::from_value(&Value::Int32(4)), None);
        assert_eq!(bool::from_value(&Value::Null), None);
    }
}
