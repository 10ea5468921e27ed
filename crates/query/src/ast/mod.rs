//! Predicate trees and their table-bound form.

mod expr;
mod predicate;

pub use expr::{CompareOp, Expr};
pub use predicate::{BoundPredicate, FieldPredicate, NullPredicate, RelatedPredicate};
