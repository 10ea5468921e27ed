//! Engine options.

use core::fmt;

/// How the planner orders the two children of an `And`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CombineOrder {
    /// Evaluate the child with the smaller estimated result first.
    #[default]
    CostBased,
    /// Evaluate children in the order they appear in the predicate tree.
    LeftToRight,
}

impl fmt::Display for CombineOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineOrder::CostBased => f.write_str("cost-based"),
            CombineOrder::LeftToRight => f.write_str("left-to-right"),
        }
    }
}

/// Options that steer planning. Options never change which rows a query
/// returns, only how they are found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    pub combine_order: CombineOrder,
    /// When false every leaf is answered by a scan, even if an index exists.
    pub use_indexes: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            combine_order: CombineOrder::CostBased,
            use_indexes: true,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_combine_order(mut self, order: CombineOrder) -> Self {
        self.combine_order = order;
        self
    }

    pub fn with_indexes(mut self, use_indexes: bool) -> Self {
        self.use_indexes = use_indexes;
        self
    }
}
