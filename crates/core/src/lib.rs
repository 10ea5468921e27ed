//! Atlas Core - the columnar data model of the Atlas query engine.
//!
//! This crate provides the foundational types:
//!
//! - `DataType`: Supported element types (Boolean, Int32, Int64, Float64, String)
//! - `Value`: Closed tagged value moved between columns, literals and index keys
//! - `ColumnStore`: Typed contiguous storage for one attribute plus a presence mask
//! - `Table`: Named, equal-length column stores; the unit of query input
//! - `Association`: Links from the rows of one table to rows of another
//! - `Catalog`: Tables registered by name, with paired forward and reverse
//!   associations
//! - `Error`: Schema, shape and type errors
//!
//! # Example
//!
//! ```rust
//! use atlas_core::{ColumnStore, DataType, Table, Value};
//!
//! let table = Table::of([
//!     ("city", ColumnStore::from_strings(["Minneapolis", "Madison"])),
//!     (
//!         "population",
//!         ColumnStore::from_values(DataType::Int64, [Value::Int64(425_000), Value::Null])
//!             .unwrap(),
//!     ),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.column("population").unwrap().get(1), Some(Value::Null));
//! ```

#![no_std]

extern crate alloc;

mod association;
mod bitmap;
mod catalog;
mod column;
mod error;
mod table;
mod types;
mod value;

pub use association::{Association, AssociationColumn};
pub use bitmap::Bitmap;
pub use catalog::Catalog;
pub use column::{ColumnBuilder, ColumnData, ColumnStore};
pub use error::{Error, ErrorKind, Result};
pub use table::{Table, TableBuilder};
pub use types::DataType;
pub use value::{compare_f64, Value};

/// Zero-based position of a row within a table, stable for the table's lifetime.
pub type RowPosition = usize;
