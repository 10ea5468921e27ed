//! Chooses between index lookups and scans for each leaf of a bound
//! predicate and orders conjunctions.

use crate::ast::{BoundPredicate, CompareOp, FieldPredicate, NullPredicate, RelatedPredicate};
use crate::context::{CombineOrder, EngineOptions};
use crate::planner::{Plan, PlanNode};
use alloc::boxed::Box;
use atlas_core::{Result, Value};
use atlas_index::{CatalogIndexes, IndexRegistry, KeyRange, SerialIndex};
use tracing::debug;

/// Builds plans for predicates over one table.
pub struct QueryPlanner<'a> {
    indexes: Option<&'a IndexRegistry<'a>>,
    catalog: Option<&'a CatalogIndexes<'a>>,
    options: EngineOptions,
    row_count: usize,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(indexes: &'a IndexRegistry<'a>, options: EngineOptions) -> Self {
        Self {
            indexes: Some(indexes),
            catalog: None,
            options,
            row_count: indexes.table().row_count(),
        }
    }

    /// Creates a planner for the table registered as `table`, using the
    /// indices in `catalog` for it and for every table it is associated with.
    pub fn in_catalog(
        catalog: &'a CatalogIndexes<'a>,
        table: &str,
        options: EngineOptions,
    ) -> Result<Self> {
        let row_count = catalog.catalog().table(table)?.row_count();
        Ok(Self {
            indexes: catalog.registry(table),
            catalog: Some(catalog),
            options,
            row_count,
        })
    }

    /// Creates the planner for the target of an association.
    fn associated(&self, table: &str, row_count: usize) -> Self {
        Self {
            indexes: self.catalog.and_then(|c| c.registry(table)),
            catalog: self.catalog,
            options: self.options,
            row_count,
        }
    }

    /// Plans a predicate bound against the registry's table.
    pub fn plan(&self, predicate: BoundPredicate<'a>) -> Plan<'a> {
        let root = self.plan_node(predicate);
        debug!(
            estimate = root.estimate(),
            uses_index = root.uses_index(),
            combine_order = %self.options.combine_order,
            "planned query"
        );
        Plan::new(root, self.row_count)
    }

    fn index_for(&self, field: &str) -> Option<&'a dyn SerialIndex> {
        if self.options.use_indexes {
            self.indexes.and_then(|r| r.get(field))
        } else {
            None
        }
    }

    fn plan_node(&self, predicate: BoundPredicate<'a>) -> PlanNode<'a> {
        match predicate {
            BoundPredicate::Compare(p) => self.plan_compare(p),
            BoundPredicate::Null(p) => self.plan_null(p),
            BoundPredicate::Const(value) => PlanNode::Const {
                value,
                estimate: if value { self.row_count } else { 0 },
            },
            BoundPredicate::And(left, right) => {
                let left = self.plan_node(*left);
                let right = self.plan_node(*right);
                let estimate = left.estimate().min(right.estimate());
                let swap = self.options.combine_order == CombineOrder::CostBased
                    && right.estimate() < left.estimate();
                debug!(
                    left = left.estimate(),
                    right = right.estimate(),
                    swap,
                    "ordered conjunction"
                );
                let (first, second) = if swap { (right, left) } else { (left, right) };
                PlanNode::And {
                    first: Box::new(first),
                    second: Box::new(second),
                    estimate,
                }
            }
            BoundPredicate::Or(left, right) => {
                let left = self.plan_node(*left);
                let right = self.plan_node(*right);
                let estimate = (left.estimate() + right.estimate()).min(self.row_count);
                PlanNode::Or {
                    left: Box::new(left),
                    right: Box::new(right),
                    estimate,
                }
            }
            BoundPredicate::Not(inner) => {
                debug!(predicate = %inner, "negation scans every row");
                PlanNode::Not {
                    predicate: *inner,
                    estimate: self.row_count,
                }
            }
            BoundPredicate::Related(p) => self.plan_related(p),
        }
    }

    fn plan_related(&self, predicate: RelatedPredicate<'a>) -> PlanNode<'a> {
        let target_rows = predicate.target_rows();
        let inner = self
            .associated(predicate.target(), target_rows)
            .plan_node(predicate.predicate().clone());
        // Each matched target row brings back its share of the links.
        let estimate = match inner.estimate() {
            0 => 0,
            matched => (matched * predicate.links().link_count())
                .div_ceil(target_rows.max(1))
                .min(self.row_count),
        };
        debug!(
            association = predicate.association(),
            target = predicate.target(),
            inner = inner.estimate(),
            estimate,
            "association lookup"
        );
        PlanNode::Related {
            predicate,
            inner: Box::new(inner),
            estimate,
        }
    }

    fn plan_compare(&self, predicate: FieldPredicate<'a>) -> PlanNode<'a> {
        let index = self.index_for(predicate.field());
        match (index, key_range(predicate.op(), predicate.literal())) {
            (Some(index), Some(range)) => {
                let estimate = index.cost(&range);
                debug!(
                    field = predicate.field(),
                    range = %range,
                    kind = %index.kind(),
                    estimate,
                    "index lookup"
                );
                PlanNode::IndexLookup {
                    predicate,
                    index,
                    range,
                    estimate,
                }
            }
            (index, _) => {
                debug!(
                    field = predicate.field(),
                    op = %predicate.op(),
                    indexed = index.is_some(),
                    "column scan"
                );
                PlanNode::ScanLeaf {
                    predicate: BoundPredicate::Compare(predicate),
                    estimate: self.row_count,
                }
            }
        }
    }

    fn plan_null(&self, predicate: NullPredicate<'a>) -> PlanNode<'a> {
        match self.index_for(predicate.field()) {
            Some(index) => {
                let estimate = if predicate.is_negated() {
                    index.len()
                } else {
                    index.null_positions().len()
                };
                debug!(field = predicate.field(), estimate, "null lookup");
                PlanNode::NullLookup {
                    predicate,
                    index,
                    estimate,
                }
            }
            None => {
                debug!(field = predicate.field(), "presence mask scan");
                PlanNode::ScanLeaf {
                    predicate: BoundPredicate::Null(predicate),
                    estimate: self.row_count,
                }
            }
        }
    }
}

/// Maps a comparison onto one contiguous key range. Not-equal and null
/// literals have no such range.
fn key_range(op: CompareOp, literal: &Value) -> Option<KeyRange<Value>> {
    if literal.is_null() {
        return None;
    }
    let key = literal.clone();
    match op {
        CompareOp::Eq => Some(KeyRange::only(key)),
        CompareOp::Lt => Some(KeyRange::upper_bound(key, true)),
        CompareOp::Le => Some(KeyRange::upper_bound(key, false)),
        CompareOp::Gt => Some(KeyRange::lower_bound(key, true)),
        CompareOp::Ge => Some(KeyRange::lower_bound(key, false)),
        CompareOp::Ne => None,
    }
}
