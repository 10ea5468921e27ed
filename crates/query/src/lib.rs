//! Atlas Query - predicate evaluation over Atlas tables.
//!
//! This crate provides:
//!
//! - `ast`: predicate trees and their table-bound, validated form
//! - `planner`: index-or-scan choice per leaf and conjunction ordering
//! - `executor`: row set operations, scans and projection
//! - `context`: engine options
//!
//! Tables registered in an [`atlas_core::Catalog`] can also be filtered by
//! their associated rows with [`Expr::related`] and the `*_in` entry points
//! of [`QueryEngine`].
//!
//! # Example
//!
//! ```rust
//! use atlas_core::{ColumnStore, Table};
//! use atlas_index::{IndexKind, IndexRegistry};
//! use atlas_query::{Expr, Query, QueryEngine};
//!
//! let table = Table::of([
//!     ("zip", ColumnStore::from_strings(vec!["94601", "10001", "10002", "73301"])),
//!     ("population", ColumnStore::from_i64s(vec![10, 20, 20, 5])),
//! ])
//! .unwrap();
//! let mut indexes = IndexRegistry::new(&table);
//! indexes.build("population", IndexKind::Auto).unwrap();
//!
//! let predicate = Expr::and(
//!     Expr::ge(Expr::field("population"), Expr::lit(10i64)),
//!     Expr::not(Expr::eq(Expr::field("population"), Expr::lit(20i64))),
//! );
//! let query = Query::new(predicate).select(["zip"]).order_by_position();
//! let result = QueryEngine::new().query(&table, &query, &indexes).unwrap();
//! assert_eq!(result.positions(), &[0]);
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
pub mod context;
pub mod engine;
pub mod executor;
pub mod planner;

pub use ast::{BoundPredicate, CompareOp, Expr, RelatedPredicate};
pub use context::{CombineOrder, EngineOptions};
pub use engine::{Query, QueryEngine, QueryResult};
pub use executor::RowSet;
pub use planner::{Plan, PlanNode};
