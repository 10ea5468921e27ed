//! Property-based tests for atlas-query using proptest.
//!
//! Random predicate trees over a random nullable table are executed with and
//! without indexes, under both conjunction orders, and checked against a
//! direct row-by-row evaluation.

use atlas_core::{ColumnStore, DataType, ErrorKind, Table, Value};
use atlas_index::{IndexKind, IndexRegistry};
use atlas_query::{CombineOrder, CompareOp, EngineOptions, Expr, QueryEngine};
use proptest::prelude::*;

const WORDS: [&str; 4] = ["alpha", "beta", "delta", "gamma"];

#[derive(Clone, Debug)]
struct Rows {
    n: Vec<Option<i64>>,
    s: Vec<Option<&'static str>>,
}

impl Rows {
    fn len(&self) -> usize {
        self.n.len()
    }

    fn table(&self) -> Table {
        Table::of([
            (
                "n",
                ColumnStore::from_values(DataType::Int64, self.n.iter().map(|&c| Value::from(c)))
                    .unwrap(),
            ),
            (
                "s",
                ColumnStore::from_values(DataType::String, self.s.iter().map(|&c| Value::from(c)))
                    .unwrap(),
            ),
        ])
        .unwrap()
    }

    fn cell(&self, field: &str, row: usize) -> Value {
        match field {
            "n" => Value::from(self.n[row]),
            _ => Value::from(self.s[row]),
        }
    }
}

fn rows() -> impl Strategy<Value = Rows> {
    (0usize..120).prop_flat_map(|len| {
        (
            prop::collection::vec(prop::option::weighted(0.8, -20i64..20), len),
            prop::collection::vec(
                prop::option::weighted(0.8, prop::sample::select(WORDS.to_vec())),
                len,
            ),
        )
            .prop_map(|(n, s)| Rows { n, s })
    })
}

fn op() -> impl Strategy<Value = CompareOp> {
    prop::sample::select(vec![
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Lt,
        CompareOp::Le,
        CompareOp::Gt,
        CompareOp::Ge,
    ])
}

fn literal() -> impl Strategy<Value = (&'static str, Value)> {
    prop_oneof![
        (-22i64..22).prop_map(|v| ("n", Value::Int64(v))),
        (-22i32..22).prop_map(|v| ("n", Value::Int32(v))),
        prop::sample::select(WORDS.to_vec()).prop_map(|w| ("s", Value::from(w))),
        Just(("n", Value::Null)),
    ]
}

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        4 => (op(), literal(), any::<bool>()).prop_map(|(op, (field, value), mirrored)| {
            if mirrored {
                Expr::compare(op.mirror(), Expr::Literal(value), Expr::field(field))
            } else {
                Expr::compare(op, Expr::field(field), Expr::Literal(value))
            }
        }),
        1 => prop::sample::select(vec!["n", "s"]).prop_map(|f| Expr::is_null(Expr::field(f))),
        1 => prop::sample::select(vec!["n", "s"]).prop_map(|f| Expr::is_not_null(Expr::field(f))),
        1 => any::<bool>().prop_map(Expr::lit),
    ]
}

fn predicate() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::or(l, r)),
            inner.prop_map(Expr::not),
        ]
    })
}

/// Row-by-row evaluation straight off the predicate tree.
fn reference(expr: &Expr, rows: &Rows, row: usize) -> bool {
    match expr {
        Expr::Compare { op, left, right } => {
            let (field, literal, op) = match (left.as_ref(), right.as_ref()) {
                (Expr::FieldRef(f), Expr::Literal(v)) => (f, v, *op),
                (Expr::Literal(v), Expr::FieldRef(f)) => (f, v, op.mirror()),
                _ => unreachable!(),
            };
            let cell = rows.cell(field, row);
            let literal = match literal {
                Value::Int32(v) => Value::Int64(i64::from(*v)),
                other => other.clone(),
            };
            !cell.is_null() && !literal.is_null() && op.test(cell.cmp(&literal))
        }
        Expr::IsNull(inner) | Expr::IsNotNull(inner) => {
            let Expr::FieldRef(field) = inner.as_ref() else {
                unreachable!()
            };
            rows.cell(field, row).is_null() == matches!(expr, Expr::IsNull(_))
        }
        Expr::Literal(Value::Boolean(b)) => *b,
        Expr::And(l, r) => reference(l, rows, row) && reference(r, rows, row),
        Expr::Or(l, r) => reference(l, rows, row) || reference(r, rows, row),
        Expr::Not(inner) => !reference(inner, rows, row),
        _ => unreachable!(),
    }
}

fn expected(expr: &Expr, rows: &Rows) -> Vec<usize> {
    (0..rows.len()).filter(|&r| reference(expr, rows, r)).collect()
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

/// Executes `expr` under every option combination; all must agree.
fn run_all(table: &Table, indexes: &IndexRegistry<'_>, expr: &Expr) -> Vec<usize> {
    let mut results = Vec::new();
    for combine_order in [CombineOrder::CostBased, CombineOrder::LeftToRight] {
        for use_indexes in [true, false] {
            let options = EngineOptions::default()
                .with_combine_order(combine_order)
                .with_indexes(use_indexes);
            let result = QueryEngine::with_options(options)
                .execute(table, expr, indexes)
                .unwrap();
            results.push(sorted(result.into_positions()));
        }
    }
    for other in &results[1..] {
        assert_eq!(other, &results[0], "{}", expr);
    }
    results.swap_remove(0)
}

proptest! {
    /// Indexed, scanned and reordered executions all match row-by-row evaluation.
    #[test]
    fn execution_matches_reference(rows in rows(), expr in predicate(), boxed in any::<bool>()) {
        let table = rows.table();
        let mut indexes = IndexRegistry::new(&table);
        let kind = if boxed { IndexKind::Boxed } else { IndexKind::Auto };
        indexes.build_all(&["n", "s"], kind).unwrap();

        prop_assert_eq!(run_all(&table, &indexes, &expr), expected(&expr, &rows));
    }

    /// Results never repeat a row position.
    #[test]
    fn results_are_duplicate_free(rows in rows(), expr in predicate()) {
        let table = rows.table();
        let mut indexes = IndexRegistry::new(&table);
        indexes.build("n", IndexKind::Auto).unwrap();
        let positions = QueryEngine::new()
            .execute(&table, &expr, &indexes)
            .unwrap()
            .into_positions();
        let unique = {
            let mut p = positions.clone();
            p.sort_unstable();
            p.dedup();
            p.len()
        };
        prop_assert_eq!(positions.len(), unique);
    }

    /// NOT NOT p selects the same rows as p.
    #[test]
    fn double_negation(rows in rows(), expr in predicate()) {
        let table = rows.table();
        let mut indexes = IndexRegistry::new(&table);
        indexes.build_all(&["n", "s"], IndexKind::Auto).unwrap();
        let twice = Expr::not(Expr::not(expr.clone()));
        prop_assert_eq!(run_all(&table, &indexes, &twice), run_all(&table, &indexes, &expr));
    }

    /// De Morgan's laws and commutativity hold.
    #[test]
    fn boolean_laws(rows in rows(), a in predicate(), b in predicate()) {
        let table = rows.table();
        let mut indexes = IndexRegistry::new(&table);
        indexes.build_all(&["n", "s"], IndexKind::Auto).unwrap();
        let run = |e: &Expr| run_all(&table, &indexes, e);

        prop_assert_eq!(
            run(&Expr::not(Expr::and(a.clone(), b.clone()))),
            run(&Expr::or(Expr::not(a.clone()), Expr::not(b.clone())))
        );
        prop_assert_eq!(
            run(&Expr::not(Expr::or(a.clone(), b.clone()))),
            run(&Expr::and(Expr::not(a.clone()), Expr::not(b.clone())))
        );
        prop_assert_eq!(
            run(&Expr::and(a.clone(), b.clone())),
            run(&Expr::and(b.clone(), a.clone()))
        );
        prop_assert_eq!(run(&Expr::or(a.clone(), b.clone())), run(&Expr::or(b, a.clone())));
        prop_assert_eq!(run(&Expr::or(a.clone(), a.clone())), run(&a));
    }

    /// Comparisons never match a null cell, whatever the operator.
    #[test]
    fn null_cells_never_compare(rows in rows(), op in op(), key in -22i64..22) {
        let table = rows.table();
        let mut indexes = IndexRegistry::new(&table);
        indexes.build("n", IndexKind::Auto).unwrap();
        let expr = Expr::compare(op, Expr::field("n"), Expr::lit(key));
        for row in run_all(&table, &indexes, &expr) {
            prop_assert!(rows.n[row].is_some());
        }
    }

    /// An unknown field anywhere in the tree fails with a schema error before
    /// anything runs, even next to a malformed node.
    #[test]
    fn unknown_field_is_schema_error(rows in rows(), expr in predicate(), left in any::<bool>()) {
        let table = rows.table();
        let indexes = IndexRegistry::new(&table);
        let missing = Expr::is_null(Expr::field("elevation"));
        let bad = Expr::eq(Expr::field("n"), Expr::lit("not a number"));
        let combined = if left {
            Expr::or(Expr::and(missing, expr), bad)
        } else {
            Expr::and(bad, Expr::or(expr, missing))
        };
        let err = QueryEngine::new().execute(&table, &combined, &indexes).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Schema);
    }
}
