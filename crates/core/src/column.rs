//! Column stores: typed contiguous storage for one attribute plus a presence mask.

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;
use crate::RowPosition;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Contiguous values of a single element type.
///
/// Slots of null rows hold the type's zero value and are never observed
/// through [`ColumnStore::get`].
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    String(Vec<String>),
}

impl ColumnData {
    /// Creates empty storage for `data_type` with room for `capacity` values.
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Boolean => ColumnData::Boolean(Vec::with_capacity(capacity)),
            DataType::Int32 => ColumnData::Int32(Vec::with_capacity(capacity)),
            DataType::Int64 => ColumnData::Int64(Vec::with_capacity(capacity)),
            DataType::Float64 => ColumnData::Float64(Vec::with_capacity(capacity)),
            DataType::String => ColumnData::String(Vec::with_capacity(capacity)),
        }
    }

    /// Returns the element type.
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Boolean(_) => DataType::Boolean,
            ColumnData::Int32(_) => DataType::Int32,
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::String(_) => DataType::String,
        }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::String(v) => v.len(),
        }
    }

    /// Returns true if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads slot `row` as a value, ignoring presence.
    fn value_at(&self, row: RowPosition) -> Value {
        match self {
            ColumnData::Boolean(v) => Value::Boolean(v[row]),
            ColumnData::Int32(v) => Value::Int32(v[row]),
            ColumnData::Int64(v) => Value::Int64(v[row]),
            ColumnData::Float64(v) => Value::Float64(v[row]),
            ColumnData::String(v) => Value::String(v[row].clone()),
        }
    }

    fn take(&self, positions: &[RowPosition]) -> ColumnData {
        match self {
            ColumnData::Boolean(v) => {
                ColumnData::Boolean(positions.iter().map(|&p| v[p]).collect())
            }
            ColumnData::Int32(v) => ColumnData::Int32(positions.iter().map(|&p| v[p]).collect()),
            ColumnData::Int64(v) => ColumnData::Int64(positions.iter().map(|&p| v[p]).collect()),
            ColumnData::Float64(v) => {
                ColumnData::Float64(positions.iter().map(|&p| v[p]).collect())
            }
            ColumnData::String(v) => {
                ColumnData::String(positions.iter().map(|&p| v[p].clone()).collect())
            }
        }
    }

    pub fn as_bools(&self) -> Option<&[bool]> {
        match self {
            ColumnData::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32s(&self) -> Option<&[i32]> {
        match self {
            ColumnData::Int32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64s(&self) -> Option<&[i64]> {
        match self {
            ColumnData::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64s(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ColumnData::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Immutable storage for one attribute across every row of a table.
///
/// The value slots and the presence mask always have the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStore {
    data: ColumnData,
    validity: Bitmap,
}

impl ColumnStore {
    /// Creates a column store from values and a presence mask of equal length.
    pub fn new(data: ColumnData, validity: Bitmap) -> Result<Self> {
        if data.len() != validity.len() {
            return Err(Error::shape_mismatch(
                "<presence mask>",
                data.len(),
                validity.len(),
            ));
        }
        Ok(Self { data, validity })
    }

    /// Creates a column store in which every row holds a value.
    pub fn from_data(data: ColumnData) -> Self {
        let validity = Bitmap::all_set(data.len());
        Self { data, validity }
    }

    /// Builds a column of `data_type` from values, where `Value::Null` marks a null row.
    pub fn from_values<I>(data_type: DataType, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let values = values.into_iter();
        let mut builder = ColumnBuilder::with_capacity(data_type, values.size_hint().0);
        for value in values {
            builder.push(value)?;
        }
        Ok(builder.finish())
    }

    pub fn from_bools(values: Vec<bool>) -> Self {
        Self::from_data(ColumnData::Boolean(values))
    }

    pub fn from_i32s(values: Vec<i32>) -> Self {
        Self::from_data(ColumnData::Int32(values))
    }

    pub fn from_i64s(values: Vec<i64>) -> Self {
        Self::from_data(ColumnData::Int64(values))
    }

    pub fn from_f64s(values: Vec<f64>) -> Self {
        Self::from_data(ColumnData::Float64(values))
    }

    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::from_data(ColumnData::String(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Returns the value at `row`, `Some(Value::Null)` for a null row, or None
    /// if `row` is out of range.
    pub fn get(&self, row: RowPosition) -> Option<Value> {
        if row >= self.len() {
            return None;
        }
        if !self.validity.get(row) {
            return Some(Value::Null);
        }
        Some(self.data.value_at(row))
    }

    /// Returns true if `row` holds a value.
    #[inline]
    pub fn is_valid(&self, row: RowPosition) -> bool {
        self.validity.get(row)
    }

    /// Returns true if `row` is null (or out of range).
    #[inline]
    pub fn is_null(&self, row: RowPosition) -> bool {
        !self.validity.get(row)
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the element type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Returns the number of null rows.
    pub fn null_count(&self) -> usize {
        self.validity.count_unset()
    }

    /// Returns the typed value slots.
    #[inline]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Returns the presence mask.
    #[inline]
    pub fn validity(&self) -> &Bitmap {
        &self.validity
    }

    /// Builds a new column holding the rows at `positions`, in that order.
    ///
    /// Every position must be in range.
    pub fn take(&self, positions: &[RowPosition]) -> ColumnStore {
        ColumnStore {
            data: self.data.take(positions),
            validity: self.validity.take(positions),
        }
    }
}

/// Incremental builder for a [`ColumnStore`].
#[derive(Debug)]
pub struct ColumnBuilder {
    data: ColumnData,
    validity: Bitmap,
}

impl ColumnBuilder {
    /// Creates a builder for a column of `data_type`.
    pub fn new(data_type: DataType) -> Self {
        Self::with_capacity(data_type, 0)
    }

    /// Creates a builder with room for `capacity` rows.
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        Self {
            data: ColumnData::with_capacity(data_type, capacity),
            validity: Bitmap::with_capacity(capacity),
        }
    }

    /// Appends a value; `Value::Null` appends a null row.
    ///
    /// Fails with a type mismatch if the value's type differs from the column's.
    pub fn push(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            self.push_null();
            return Ok(());
        }
        let row = self.validity.len();
        match (&mut self.data, value) {
            (ColumnData::Boolean(v), Value::Boolean(x)) => v.push(x),
            (ColumnData::Int32(v), Value::Int32(x)) => v.push(x),
            (ColumnData::Int64(v), Value::Int64(x)) => v.push(x),
            (ColumnData::Float64(v), Value::Float64(x)) => v.push(x),
            (ColumnData::String(v), Value::String(x)) => v.push(x),
            (data, other) => {
                let got = match other.data_type() {
                    Some(dt) => dt,
                    None => data.data_type(),
                };
                return Err(Error::type_mismatch(
                    format!("column value at row {}", row),
                    data.data_type(),
                    got,
                ));
            }
        }
        self.validity.push(true);
        Ok(())
    }

    /// Appends a null row.
    pub fn push_null(&mut self) {
        match &mut self.data {
            ColumnData::Boolean(v) => v.push(false),
            ColumnData::Int32(v) => v.push(0),
            ColumnData::Int64(v) => v.push(0),
            ColumnData::Float64(v) => v.push(0.0),
            ColumnData::String(v) => v.push(String::new()),
        }
        self.validity.push(false);
    }

    /// Returns the number of rows appended so far.
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Finalizes the column; no rows can be added afterwards.
    pub fn finish(self) -> ColumnStore {
        ColumnStore {
            data: self.data,
            validity: self.validity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alloc::vec;

    #[test]
    fn test_from_values_with_nulls() {
        let col = ColumnStore::from_values(
            DataType::Int64,
            vec![Value::Int64(10), Value::Null, Value::Int64(30)],
        )
        .unwrap();

        assert_eq!(col.len(), 3);
        assert_eq!(col.data_type(), DataType::Int64);
        assert_eq!(col.get(0), Some(Value::Int64(10)));
        assert_eq!(col.get(1), Some(Value::Null));
        assert_eq!(col.get(2), Some(Value::Int64(30)));
        assert_eq!(col.get(3), None);
        assert_eq!(col.null_count(), 1);
        assert!(col.is_null(1));
        assert!(col.is_valid(2));
    }

    #[test]
    fn test_builder_rejects_wrong_type() {
        let mut builder = ColumnBuilder::new(DataType::String);
        builder.push(Value::from("Minneapolis")).unwrap();
        let err = builder.push(Value::Int32(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        match err {
            Error::TypeMismatch { expected, got, .. } => {
                assert_eq!(expected, DataType::String);
                assert_eq!(got, DataType::Int32);
            }
            _ => panic!("Wrong error type"),
        }
        // The failed push leaves the builder untouched.
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_builder_does_not_widen() {
        let err = ColumnStore::from_values(DataType::Int64, vec![Value::Int32(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_new_checks_mask_length() {
        let err = ColumnStore::new(ColumnData::Int32(vec![1, 2]), Bitmap::all_set(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_convenience_constructors() {
        let col = ColumnStore::from_strings(["MN", "WI"]);
        assert_eq!(col.get(1), Some(Value::from("WI")));
        assert_eq!(col.data().as_strings().map(|s| s.len()), Some(2));

        let col = ColumnStore::from_f64s(vec![1.5]);
        assert_eq!(col.data().as_f64s(), Some(&[1.5][..]));
        assert_eq!(col.data().as_i64s(), None);
    }

    #[test]
    fn test_take() {
        let col = ColumnStore::from_values(
            DataType::Boolean,
            vec![Value::Boolean(true), Value::Null, Value::Boolean(false)],
        )
        .unwrap();
        let taken = col.take(&[2, 1]);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.get(0), Some(Value::Boolean(false)));
        assert_eq!(taken.get(1), Some(Value::Null));
    }
}
