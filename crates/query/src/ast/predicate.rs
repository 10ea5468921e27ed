//! Predicates bound to the columns of one table.
//!
//! Binding validates a whole [`Expr`] tree before any row is read: every
//! field must name a column of the table, every comparison must pair one
//! field with one literal, and every literal must convert to its column's
//! type. Tests through an association are bound against the associated
//! table, looked up in a [`Catalog`].

use crate::ast::expr::{CompareOp, Expr};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use alloc::vec;
use atlas_core::{
    compare_f64, AssociationColumn, Bitmap, Catalog, ColumnData, ColumnStore, Error, Result,
    RowPosition, Table, Value,
};
use core::fmt;

/// A comparison between one column and a literal already converted to the
/// column's type. A null literal matches no row.
#[derive(Clone, Debug)]
pub struct FieldPredicate<'a> {
    field: String,
    column: &'a ColumnStore,
    op: CompareOp,
    literal: Value,
}

impl<'a> FieldPredicate<'a> {
    /// Binds `field op literal` against `table`.
    pub fn bind(table: &'a Table, field: &str, op: CompareOp, literal: &Value) -> Result<Self> {
        let column = table.column(field)?;
        let expected = column.data_type();
        let literal = match literal.data_type() {
            None => Value::Null,
            Some(got) => literal.coerce_to(expected).ok_or_else(|| {
                Error::type_mismatch(format!("comparison on column {}", field), expected, got)
            })?,
        };
        Ok(Self {
            field: field.into(),
            column,
            op,
            literal,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn column(&self) -> &'a ColumnStore {
        self.column
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// Returns the literal, converted to the column's type.
    pub fn literal(&self) -> &Value {
        &self.literal
    }

    /// Evaluates the comparison at one row. Null cells never match.
    pub fn eval(&self, row: RowPosition) -> bool {
        if !self.column.is_valid(row) {
            return false;
        }
        let ord = match (self.column.data(), &self.literal) {
            (ColumnData::Boolean(v), Value::Boolean(k)) => v[row].cmp(k),
            (ColumnData::Int32(v), Value::Int32(k)) => v[row].cmp(k),
            (ColumnData::Int64(v), Value::Int64(k)) => v[row].cmp(k),
            (ColumnData::Float64(v), Value::Float64(k)) => compare_f64(v[row], *k),
            (ColumnData::String(v), Value::String(k)) => v[row].as_str().cmp(k.as_str()),
            _ => return false,
        };
        self.op.test(ord)
    }

    /// Evaluates the comparison over every row of the column and returns the
    /// matching positions in ascending order.
    pub fn scan(&self) -> Vec<RowPosition> {
        let validity = self.column.validity();
        let op = self.op;
        match (self.column.data(), &self.literal) {
            (ColumnData::Boolean(v), Value::Boolean(k)) => {
                scan_slice(v, validity, |x| op.test(x.cmp(k)))
            }
            (ColumnData::Int32(v), Value::Int32(k)) => {
                scan_slice(v, validity, |x| op.test(x.cmp(k)))
            }
            (ColumnData::Int64(v), Value::Int64(k)) => {
                scan_slice(v, validity, |x| op.test(x.cmp(k)))
            }
            (ColumnData::Float64(v), Value::Float64(k)) => {
                scan_slice(v, validity, |x| op.test(compare_f64(*x, *k)))
            }
            (ColumnData::String(v), Value::String(k)) => {
                scan_slice(v, validity, |x| op.test(x.as_str().cmp(k.as_str())))
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldPredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.literal)
    }
}

fn scan_slice<T>(values: &[T], validity: &Bitmap, test: impl Fn(&T) -> bool) -> Vec<RowPosition> {
    values
        .iter()
        .enumerate()
        .filter(|(row, v)| validity.get(*row) && test(*v))
        .map(|(row, _)| row)
        .collect()
}

/// An IS NULL / IS NOT NULL test on one column.
#[derive(Clone, Debug)]
pub struct NullPredicate<'a> {
    field: String,
    column: &'a ColumnStore,
    negated: bool,
}

impl<'a> NullPredicate<'a> {
    pub fn bind(table: &'a Table, field: &str, negated: bool) -> Result<Self> {
        Ok(Self {
            field: field.into(),
            column: table.column(field)?,
            negated,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns true for IS NOT NULL.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn eval(&self, row: RowPosition) -> bool {
        self.column.is_null(row) != self.negated
    }

    /// Reads the presence mask and returns the matching positions in
    /// ascending order.
    pub fn scan(&self) -> Vec<RowPosition> {
        let validity = self.column.validity();
        if self.negated {
            validity.iter_set().collect()
        } else {
            validity.iter_unset().collect()
        }
    }
}

impl fmt::Display for NullPredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "{} IS NOT NULL", self.field)
        } else {
            write!(f, "{} IS NULL", self.field)
        }
    }
}

/// A test on the rows reached through an association: a row matches when
/// any of its associated rows satisfies the inner predicate.
#[derive(Clone, Debug)]
pub struct RelatedPredicate<'a> {
    association: String,
    links: &'a AssociationColumn,
    reverse: Option<&'a AssociationColumn>,
    predicate: Box<BoundPredicate<'a>>,
}

impl<'a> RelatedPredicate<'a> {
    fn bind(
        table: &'a Table,
        association: &str,
        inner: &Expr,
        catalog: Option<&'a Catalog>,
    ) -> Result<Self> {
        let (links, target) = resolve_association(table, association, catalog)?;
        if links.target_rows() != target.row_count() {
            return Err(Error::shape_mismatch(
                association,
                target.row_count(),
                links.target_rows(),
            ));
        }
        // Only a reverse column that still mirrors this one can map matches
        // back; subsets drop the pairing.
        let reverse = links
            .reverse_name()
            .and_then(|name| target.get_association(name))
            .filter(|r| {
                r.len() == target.row_count()
                    && r.target_rows() == table.row_count()
                    && r.link_count() == links.link_count()
            });
        let predicate = BoundPredicate::bind_node(inner, target, catalog)?;
        Ok(Self {
            association: association.into(),
            links,
            reverse,
            predicate: Box::new(predicate),
        })
    }

    pub fn association(&self) -> &str {
        &self.association
    }

    /// Returns the name of the associated table.
    pub fn target(&self) -> &str {
        self.links.target()
    }

    pub fn target_rows(&self) -> usize {
        self.links.target_rows()
    }

    pub fn links(&self) -> &'a AssociationColumn {
        self.links
    }

    /// Returns true if matches can be mapped back through a reverse column.
    pub fn has_reverse(&self) -> bool {
        self.reverse.is_some()
    }

    /// Returns the predicate on the associated table.
    pub fn predicate(&self) -> &BoundPredicate<'a> {
        &self.predicate
    }

    pub fn eval(&self, row: RowPosition) -> bool {
        self.links
            .positions(row)
            .iter()
            .any(|&target| self.predicate.eval(target))
    }

    /// Maps matching rows of the associated table back to the rows of this
    /// table that point at any of them, in ascending order.
    pub fn parents(&self, matched: &[RowPosition]) -> Vec<RowPosition> {
        let mut hit = vec![false; self.links.len()];
        match self.reverse {
            Some(reverse) => {
                for &target in matched {
                    for &row in reverse.positions(target) {
                        hit[row] = true;
                    }
                }
            }
            None => {
                let mut wanted = vec![false; self.links.target_rows()];
                for &target in matched {
                    wanted[target] = true;
                }
                for (row, slot) in hit.iter_mut().enumerate() {
                    *slot = self.links.positions(row).iter().any(|&t| wanted[t]);
                }
            }
        }
        hit.iter()
            .enumerate()
            .filter_map(|(row, &h)| h.then_some(row))
            .collect()
    }
}

impl fmt::Display for RelatedPredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ANY {} ({})", self.association, self.predicate)
    }
}

fn resolve_association<'a>(
    table: &'a Table,
    association: &str,
    catalog: Option<&'a Catalog>,
) -> Result<(&'a AssociationColumn, &'a Table)> {
    let links = table.association(association)?;
    let target = catalog
        .ok_or_else(|| Error::table_not_found(links.target()))?
        .table(links.target())?;
    Ok((links, target))
}

/// Reports the first unknown field or association, walking into associated
/// tables.
fn check_schema(expr: &Expr, table: &Table, catalog: Option<&Catalog>) -> Result<()> {
    match expr {
        Expr::FieldRef(name) => table.column(name).map(|_| ()),
        Expr::Literal(_) => Ok(()),
        Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
            check_schema(left, table, catalog)?;
            check_schema(right, table, catalog)
        }
        Expr::Not(inner) | Expr::IsNull(inner) | Expr::IsNotNull(inner) => {
            check_schema(inner, table, catalog)
        }
        Expr::Related {
            association,
            predicate,
        } => {
            let (_, target) = resolve_association(table, association, catalog)?;
            check_schema(predicate, target, catalog)
        }
    }
}

/// A validated predicate tree whose leaves point at table columns.
#[derive(Clone, Debug)]
pub enum BoundPredicate<'a> {
    Compare(FieldPredicate<'a>),
    Null(NullPredicate<'a>),
    Const(bool),
    And(Box<BoundPredicate<'a>>, Box<BoundPredicate<'a>>),
    Or(Box<BoundPredicate<'a>>, Box<BoundPredicate<'a>>),
    Not(Box<BoundPredicate<'a>>),
    Related(RelatedPredicate<'a>),
}

impl<'a> BoundPredicate<'a> {
    /// Validates `expr` against `table` and binds its fields to columns.
    ///
    /// Unknown fields are reported first, as schema errors, wherever they sit
    /// in the tree; type errors follow in left-to-right order. Without a
    /// catalog, associations cannot be followed and report their target
    /// table as not found.
    pub fn bind(expr: &Expr, table: &'a Table) -> Result<Self> {
        Self::bind_in(expr, table, None)
    }

    /// Like [`BoundPredicate::bind`], resolving associated tables in
    /// `catalog`.
    pub fn bind_in(expr: &Expr, table: &'a Table, catalog: Option<&'a Catalog>) -> Result<Self> {
        check_schema(expr, table, catalog)?;
        Self::bind_node(expr, table, catalog)
    }

    fn bind_node(expr: &Expr, table: &'a Table, catalog: Option<&'a Catalog>) -> Result<Self> {
        match expr {
            Expr::FieldRef(name) => Err(Error::invalid_predicate(format!(
                "field reference {} is not a boolean predicate",
                name
            ))),
            Expr::Literal(Value::Boolean(b)) => Ok(BoundPredicate::Const(*b)),
            Expr::Literal(value) => Err(Error::invalid_predicate(format!(
                "literal {} is not a boolean predicate",
                value
            ))),
            Expr::Compare { op, left, right } => match (left.as_ref(), right.as_ref()) {
                (Expr::FieldRef(field), Expr::Literal(value)) => {
                    FieldPredicate::bind(table, field, *op, value).map(BoundPredicate::Compare)
                }
                (Expr::Literal(value), Expr::FieldRef(field)) => {
                    FieldPredicate::bind(table, field, op.mirror(), value)
                        .map(BoundPredicate::Compare)
                }
                _ => Err(Error::invalid_predicate(format!(
                    "comparison {} needs one field and one literal operand",
                    expr
                ))),
            },
            Expr::And(left, right) => Ok(BoundPredicate::And(
                Box::new(Self::bind_node(left, table, catalog)?),
                Box::new(Self::bind_node(right, table, catalog)?),
            )),
            Expr::Or(left, right) => Ok(BoundPredicate::Or(
                Box::new(Self::bind_node(left, table, catalog)?),
                Box::new(Self::bind_node(right, table, catalog)?),
            )),
            Expr::Not(inner) => Ok(BoundPredicate::Not(Box::new(Self::bind_node(
                inner, table, catalog,
            )?))),
            Expr::IsNull(inner) => Self::bind_null(inner, table, false),
            Expr::IsNotNull(inner) => Self::bind_null(inner, table, true),
            Expr::Related {
                association,
                predicate,
            } => RelatedPredicate::bind(table, association, predicate, catalog)
                .map(BoundPredicate::Related),
        }
    }

    fn bind_null(operand: &Expr, table: &'a Table, negated: bool) -> Result<Self> {
        match operand {
            Expr::FieldRef(field) => {
                NullPredicate::bind(table, field, negated).map(BoundPredicate::Null)
            }
            other => Err(Error::invalid_predicate(format!(
                "null test needs a field operand, got {}",
                other
            ))),
        }
    }

    /// Evaluates the predicate at one row with two-valued logic: comparisons
    /// on null cells are false and `Not` flips that to true.
    pub fn eval(&self, row: RowPosition) -> bool {
        match self {
            BoundPredicate::Compare(p) => p.eval(row),
            BoundPredicate::Null(p) => p.eval(row),
            BoundPredicate::Const(b) => *b,
            BoundPredicate::And(l, r) => l.eval(row) && r.eval(row),
            BoundPredicate::Or(l, r) => l.eval(row) || r.eval(row),
            BoundPredicate::Not(inner) => !inner.eval(row),
            BoundPredicate::Related(p) => p.eval(row),
        }
    }
}

impl fmt::Display for BoundPredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundPredicate::Compare(p) => write!(f, "{}", p),
            BoundPredicate::Null(p) => write!(f, "{}", p),
            BoundPredicate::Const(b) => write!(f, "{}", b),
            BoundPredicate::And(l, r) => write!(f, "({} AND {})", l, r),
            BoundPredicate::Or(l, r) => write!(f, "({} OR {})", l, r),
            BoundPredicate::Not(inner) => write!(f, "NOT {}", inner),
            BoundPredicate::Related(p) => write!(f, "{}", p),
        }
    }
}
