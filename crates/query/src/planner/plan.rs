//! Query plan definitions.

use crate::ast::{BoundPredicate, FieldPredicate, NullPredicate, RelatedPredicate};
use crate::executor::{PlanRunner, RowSet};
use alloc::boxed::Box;
use alloc::string::String;
use atlas_core::{RowPosition, Value};
use atlas_index::{KeyRange, SerialIndex};
use core::fmt;

/// Plan node. Every node carries an estimate of the rows it yields.
#[derive(Clone, Debug)]
pub enum PlanNode<'a> {
    /// Comparison answered by one binary-searched index range.
    IndexLookup {
        predicate: FieldPredicate<'a>,
        index: &'a dyn SerialIndex,
        range: KeyRange<Value>,
        estimate: usize,
    },
    /// Null test answered from an index's null list or its entries.
    NullLookup {
        predicate: NullPredicate<'a>,
        index: &'a dyn SerialIndex,
        estimate: usize,
    },
    /// Leaf predicate evaluated against every row of its column.
    ScanLeaf {
        predicate: BoundPredicate<'a>,
        estimate: usize,
    },
    Const { value: bool, estimate: usize },
    /// Conjunction; `first` runs first and `second` only narrows its result.
    And {
        first: Box<PlanNode<'a>>,
        second: Box<PlanNode<'a>>,
        estimate: usize,
    },
    Or {
        left: Box<PlanNode<'a>>,
        right: Box<PlanNode<'a>>,
        estimate: usize,
    },
    /// Negation, evaluated row by row over the whole table.
    Not {
        predicate: BoundPredicate<'a>,
        estimate: usize,
    },
    /// Test through an association. `inner` runs over the associated table
    /// and its matches are mapped back to the rows pointing at them.
    Related {
        predicate: RelatedPredicate<'a>,
        inner: Box<PlanNode<'a>>,
        estimate: usize,
    },
}

impl<'a> PlanNode<'a> {
    /// Returns the estimated number of rows this node yields.
    pub fn estimate(&self) -> usize {
        match self {
            PlanNode::IndexLookup { estimate, .. }
            | PlanNode::NullLookup { estimate, .. }
            | PlanNode::ScanLeaf { estimate, .. }
            | PlanNode::Const { estimate, .. }
            | PlanNode::And { estimate, .. }
            | PlanNode::Or { estimate, .. }
            | PlanNode::Not { estimate, .. }
            | PlanNode::Related { estimate, .. } => *estimate,
        }
    }

    /// Returns true if this node or one of its children reads an index.
    pub fn uses_index(&self) -> bool {
        match self {
            PlanNode::IndexLookup { .. } | PlanNode::NullLookup { .. } => true,
            PlanNode::ScanLeaf { .. } | PlanNode::Const { .. } | PlanNode::Not { .. } => false,
            PlanNode::And { first, second, .. } => first.uses_index() || second.uses_index(),
            PlanNode::Or { left, right, .. } => left.uses_index() || right.uses_index(),
            PlanNode::Related { inner, .. } => inner.uses_index(),
        }
    }

    /// Evaluates the node's predicate at one row without touching indexes.
    pub fn eval(&self, row: RowPosition) -> bool {
        match self {
            PlanNode::IndexLookup { predicate, .. } => predicate.eval(row),
            PlanNode::NullLookup { predicate, .. } => predicate.eval(row),
            PlanNode::ScanLeaf { predicate, .. } => predicate.eval(row),
            PlanNode::Const { value, .. } => *value,
            PlanNode::And { first, second, .. } => first.eval(row) && second.eval(row),
            PlanNode::Or { left, right, .. } => left.eval(row) || right.eval(row),
            PlanNode::Not { predicate, .. } => !predicate.eval(row),
            PlanNode::Related { predicate, .. } => predicate.eval(row),
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        match self {
            PlanNode::IndexLookup {
                predicate,
                index,
                range,
                estimate,
            } => writeln!(
                f,
                "IndexLookup {} {} via {} (est {})",
                predicate.field(),
                range,
                index.kind(),
                estimate
            ),
            PlanNode::NullLookup {
                predicate,
                index,
                estimate,
            } => writeln!(f, "NullLookup {} via {} (est {})", predicate, index.kind(), estimate),
            PlanNode::ScanLeaf {
                predicate,
                estimate,
            } => writeln!(f, "ScanLeaf {} (est {})", predicate, estimate),
            PlanNode::Const { value, estimate } => {
                writeln!(f, "Const {} (est {})", value, estimate)
            }
            PlanNode::And {
                first,
                second,
                estimate,
            } => {
                writeln!(f, "And (est {})", estimate)?;
                first.fmt_tree(f, depth + 1)?;
                second.fmt_tree(f, depth + 1)
            }
            PlanNode::Or {
                left,
                right,
                estimate,
            } => {
                writeln!(f, "Or (est {})", estimate)?;
                left.fmt_tree(f, depth + 1)?;
                right.fmt_tree(f, depth + 1)
            }
            PlanNode::Not {
                predicate,
                estimate,
            } => writeln!(f, "Not {} (est {})", predicate, estimate),
            PlanNode::Related {
                predicate,
                inner,
                estimate,
            } => {
                writeln!(
                    f,
                    "Related {} -> {} (est {})",
                    predicate.association(),
                    predicate.target(),
                    estimate
                )?;
                inner.fmt_tree(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for PlanNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// An executable plan over one table.
///
/// A plan borrows the table and its index registry, so it cannot outlive
/// either of them. Plans that follow associations also borrow the
/// associated tables and their indexes.
#[derive(Clone, Debug)]
pub struct Plan<'a> {
    root: PlanNode<'a>,
    row_count: usize,
}

impl<'a> Plan<'a> {
    pub(crate) fn new(root: PlanNode<'a>, row_count: usize) -> Self {
        Self { root, row_count }
    }

    pub fn root(&self) -> &PlanNode<'a> {
        &self.root
    }

    /// Returns the estimated number of matching rows.
    pub fn estimate(&self) -> usize {
        self.root.estimate()
    }

    /// Returns true if any part of the plan reads an index.
    pub fn uses_index(&self) -> bool {
        self.root.uses_index()
    }

    /// Renders the plan tree, one node per line.
    pub fn explain(&self) -> String {
        alloc::format!("{}", self.root)
    }

    /// Runs the plan and returns the matching row positions.
    pub fn execute(&self) -> RowSet {
        PlanRunner::new(self.row_count).run(&self.root)
    }
}

impl fmt::Display for Plan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
