//! Query executor module.

mod project;
mod row_set;
mod runner;

pub use project::project;
pub use row_set::RowSet;
pub use runner::PlanRunner;
