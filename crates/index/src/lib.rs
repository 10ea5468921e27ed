//! Atlas Index - serial indices over Atlas column stores.
//!
//! A serial index is a dense, sorted sequence of `(key, row position)` pairs
//! over one column, searched by binary search. Two representations implement
//! the [`SerialIndex`] trait:
//!
//! - `BoxedIndex`: one `(Value, RowPosition)` pair per row; any orderable type
//! - `PrimitiveIndex<K>`: parallel key and position arrays for boolean and
//!   numeric columns, with no per-entry allocation
//!
//! Indices over a table are collected in an [`IndexRegistry`], and the
//! registries of a whole catalog in [`CatalogIndexes`].
//!
//! # Example
//!
//! ```rust
//! use atlas_core::{ColumnStore, Table, Value};
//! use atlas_index::{IndexKind, IndexRegistry, KeyRange};
//!
//! let table = Table::of([("population", ColumnStore::from_i64s(vec![10, 20, 20, 5]))]).unwrap();
//! let mut registry = IndexRegistry::new(&table);
//! let index = registry.build("population", IndexKind::Auto).unwrap();
//!
//! // Equal keys come back in row order.
//! assert_eq!(index.lookup_equal(&Value::Int64(20)), vec![1, 2]);
//!
//! // Range results come back in key order.
//! let range = KeyRange::lower_bound(Value::Int64(10), false);
//! assert_eq!(index.lookup_range(&range), vec![0, 1, 2]);
//! ```

#![no_std]

extern crate alloc;

pub mod boxed;
pub mod key;
pub mod primitive;
pub mod registry;
pub mod stats;
pub mod traits;

pub use boxed::BoxedIndex;
pub use key::PrimitiveKey;
pub use primitive::PrimitiveIndex;
pub use registry::{build_index, CatalogIndexes, IndexKind, IndexRegistry};
pub use stats::IndexStats;
pub use traits::{KeyRange, SerialIndex};
