//! Data type definitions for Atlas column stores.
//!
//! This module defines the closed set of element types a column can hold.

use core::fmt;

/// Element type of a column store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
}

impl DataType {
    /// Returns the lowercase type name used in error messages and plan output.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::String => "string",
        }
    }

    /// Returns whether values of this type have a total order usable as an index key.
    ///
    /// Strings order lexicographically on their UTF-8 bytes, floats order with
    /// NaN above every other value.
    pub fn is_orderable(&self) -> bool {
        match self {
            DataType::Boolean
            | DataType::Int32
            | DataType::Int64
            | DataType::Float64
            | DataType::String => true,
        }
    }

    /// Returns whether this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::Float64)
    }

    /// Returns whether values of this type fit a fixed-width primitive array.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DataType::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
