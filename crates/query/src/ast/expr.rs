//! Predicate tree definitions.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use atlas_core::Value;
use core::cmp::Ordering;
use core::fmt;

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Returns the operator that gives the same answer with its operands swapped,
    /// so `lit < field` becomes `field > lit`.
    pub fn mirror(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    /// Tests the ordering of `field` relative to `literal`.
    #[inline]
    pub fn test(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }

    /// Returns true if an index can answer this operator with one contiguous
    /// key range.
    pub fn is_range(self) -> bool {
        !matches!(self, CompareOp::Ne)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Predicate tree node.
///
/// `FieldRef` and `Literal` are operands; every other variant is a boolean
/// predicate. A boolean literal is also accepted as a constant predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Reference to a table column by name.
    FieldRef(String),
    /// Literal value.
    Literal(Value),
    /// Comparison between a field and a literal, in either order.
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// True for rows where the field is null.
    IsNull(Box<Expr>),
    /// True for rows where the field is present.
    IsNotNull(Box<Expr>),
    /// True for rows with at least one associated row, through the named
    /// association, that satisfies `predicate`. The inner predicate refers
    /// to fields of the associated table.
    Related {
        association: String,
        predicate: Box<Expr>,
    },
}

impl Expr {
    /// Creates a field reference.
    pub fn field(name: impl Into<String>) -> Self {
        Expr::FieldRef(name.into())
    }

    /// Creates a literal.
    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Creates a comparison.
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an equality comparison.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    /// Creates a not-equal comparison.
    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Ne, left, right)
    }

    /// Creates a less-than comparison.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Lt, left, right)
    }

    /// Creates a less-than-or-equal comparison.
    pub fn le(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Le, left, right)
    }

    /// Creates a greater-than comparison.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Gt, left, right)
    }

    /// Creates a greater-than-or-equal comparison.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Ge, left, right)
    }

    /// Creates a conjunction.
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    /// Creates a disjunction.
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    /// Creates a negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    /// Creates an IS NULL test.
    pub fn is_null(expr: Expr) -> Self {
        Expr::IsNull(Box::new(expr))
    }

    /// Creates an IS NOT NULL test.
    pub fn is_not_null(expr: Expr) -> Self {
        Expr::IsNotNull(Box::new(expr))
    }

    /// Creates a test on the rows reached through `association`.
    pub fn related(association: impl Into<String>, predicate: Expr) -> Self {
        Expr::Related {
            association: association.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Folds `predicates` into a left-deep conjunction. Returns `None` when
    /// the iterator is empty.
    pub fn all(predicates: impl IntoIterator<Item = Expr>) -> Option<Self> {
        predicates.into_iter().reduce(Expr::and)
    }

    /// Folds `predicates` into a left-deep disjunction. Returns `None` when
    /// the iterator is empty.
    pub fn any(predicates: impl IntoIterator<Item = Expr>) -> Option<Self> {
        predicates.into_iter().reduce(Expr::or)
    }

    /// Returns the names of all fields of the queried table referenced by
    /// this tree, in left-to-right order, with repeats. Fields inside a
    /// [`Expr::Related`] belong to the associated table and are skipped.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::FieldRef(name) => out.push(name),
            Expr::Literal(_) | Expr::Related { .. } => {}
            Expr::Compare { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Expr::Not(inner) | Expr::IsNull(inner) | Expr::IsNotNull(inner) => {
                inner.collect_fields(out)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::FieldRef(name) => f.write_str(name),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Compare { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Expr::And(left, right) => write!(f, "({} AND {})", left, right),
            Expr::Or(left, right) => write!(f, "({} OR {})", left, right),
            Expr::Not(inner) => write!(f, "NOT {}", inner),
            Expr::IsNull(inner) => write!(f, "{} IS NULL", inner),
            Expr::IsNotNull(inner) => write!(f, "{} IS NOT NULL", inner),
            Expr::Related {
                association,
                predicate,
            } => write!(f, "ANY {} ({})", association, predicate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_mirror() {
        assert_eq!(CompareOp::Lt.mirror(), CompareOp::Gt);
        assert_eq!(CompareOp::Ge.mirror(), CompareOp::Le);
        assert_eq!(CompareOp::Eq.mirror(), CompareOp::Eq);
        for op in [
            CompareOp::Eq,
            CompareOp::Ne,
            CompareOp::Lt,
            CompareOp::Le,
            CompareOp::Gt,
            CompareOp::Ge,
        ] {
            assert_eq!(op.mirror().mirror(), op);
            for ord in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
                assert_eq!(op.test(ord), op.mirror().test(ord.reverse()));
            }
        }
    }

    #[test]
    fn test_compare_op_test() {
        assert!(CompareOp::Le.test(Ordering::Equal));
        assert!(!CompareOp::Lt.test(Ordering::Equal));
        assert!(CompareOp::Ne.test(Ordering::Greater));
        assert!(!CompareOp::Ne.is_range());
        assert!(CompareOp::Ge.is_range());
    }

    #[test]
    fn test_referenced_fields() {
        let expr = Expr::and(
            Expr::ge(Expr::field("population"), Expr::lit(10i64)),
            Expr::not(Expr::eq(Expr::lit("CA"), Expr::field("state"))),
        );
        assert_eq!(expr.referenced_fields(), vec!["population", "state"]);

        let expr = Expr::and(
            Expr::related("state", Expr::eq(Expr::field("code"), Expr::lit("MN"))),
            Expr::is_not_null(Expr::field("name")),
        );
        assert_eq!(expr.referenced_fields(), vec!["name"]);
    }

    #[test]
    fn test_all_any() {
        assert!(Expr::all(vec![]).is_none());
        let a = Expr::is_null(Expr::field("a"));
        let b = Expr::is_not_null(Expr::field("b"));
        assert_eq!(
            Expr::all(vec![a.clone(), b.clone()]),
            Some(Expr::and(a.clone(), b.clone()))
        );
        assert_eq!(Expr::any(vec![a.clone(), b.clone()]), Some(Expr::or(a, b)));
    }

    #[test]
    fn test_display() {
        let expr = Expr::or(
            Expr::lt(Expr::field("population"), Expr::lit(20i64)),
            Expr::not(Expr::eq(Expr::field("state"), Expr::lit("CA"))),
        );
        assert_eq!(
            expr.to_string(),
            "(population < 20 OR NOT state = \"CA\")"
        );

        let in_state = Expr::related("state", Expr::eq(Expr::field("code"), Expr::lit("SD")));
        let expr = Expr::related("city", in_state);
        assert_eq!(expr.to_string(), "ANY city (ANY state (code = \"SD\"))");
    }
}
