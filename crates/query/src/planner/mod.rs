//! Query planner module.

mod plan;
mod query_planner;

pub use plan::{Plan, PlanNode};
pub use query_planner::QueryPlanner;
