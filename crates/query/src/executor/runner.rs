//! Plan runner - evaluates plan nodes bottom-up into row sets.

use crate::ast::BoundPredicate;
use crate::executor::RowSet;
use crate::planner::PlanNode;
use atlas_index::KeyRange;
use tracing::trace;

/// Executes plan nodes over a table of `row_count` rows.
pub struct PlanRunner {
    row_count: usize,
}

impl PlanRunner {
    pub fn new(row_count: usize) -> Self {
        Self { row_count }
    }

    /// Evaluates `node` and returns the matching row positions.
    pub fn run(&self, node: &PlanNode<'_>) -> RowSet {
        match node {
            PlanNode::IndexLookup {
                predicate,
                index,
                range,
                ..
            } => {
                if range.is_only() {
                    RowSet::from_sorted(index.lookup_equal(predicate.literal()))
                } else {
                    RowSet::from_positions(index.lookup_range(range))
                }
            }
            PlanNode::NullLookup {
                predicate, index, ..
            } => {
                if predicate.is_negated() {
                    RowSet::from_positions(index.lookup_range(&KeyRange::all()))
                } else {
                    RowSet::from_sorted(index.null_positions().to_vec())
                }
            }
            PlanNode::ScanLeaf { predicate, .. } => self.scan(predicate),
            PlanNode::Const { value: true, .. } => RowSet::all(self.row_count),
            PlanNode::Const { value: false, .. } => RowSet::empty(),
            PlanNode::And { first, second, .. } => {
                let mut rows = self.run(first);
                if rows.is_empty() {
                    trace!("conjunction short-circuited on empty first child");
                    return rows;
                }
                if second.uses_index() {
                    let other = self.run(second);
                    rows.intersect(&other)
                } else {
                    // Only the candidates of the first child need checking.
                    rows.retain(|&row| second.eval(row));
                    rows
                }
            }
            PlanNode::Or { left, right, .. } => {
                let rows = self.run(left);
                if rows.len() == self.row_count {
                    return rows;
                }
                let other = self.run(right);
                rows.union(&other)
            }
            PlanNode::Not { predicate, .. } => RowSet::from_sorted(
                (0..self.row_count).filter(|&row| !predicate.eval(row)).collect(),
            ),
            PlanNode::Related {
                predicate, inner, ..
            } => {
                let matched = PlanRunner::new(predicate.target_rows()).run(inner);
                let rows = predicate.parents(matched.as_slice());
                trace!(
                    association = predicate.association(),
                    matched = matched.len(),
                    rows = rows.len(),
                    "mapped associated rows"
                );
                RowSet::from_sorted(rows)
            }
        }
    }

    fn scan(&self, predicate: &BoundPredicate<'_>) -> RowSet {
        let rows = match predicate {
            BoundPredicate::Compare(p) => p.scan(),
            BoundPredicate::Null(p) => p.scan(),
            other => (0..self.row_count).filter(|&row| other.eval(row)).collect(),
        };
        trace!(predicate = %predicate, rows = rows.len(), "scanned");
        RowSet::from_sorted(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BoundPredicate, Expr};
    use crate::context::EngineOptions;
    use crate::planner::QueryPlanner;
    use alloc::vec;
    use alloc::vec::Vec;
    use atlas_core::{Association, Catalog, ColumnStore, RowPosition, Table};
    use atlas_index::{CatalogIndexes, IndexKind, IndexRegistry};

    fn population() -> Table {
        Table::of([("population", ColumnStore::from_i64s(vec![10, 20, 20, 5]))]).unwrap()
    }

    fn run(table: &Table, indexed: bool, expr: &Expr) -> Vec<RowPosition> {
        let mut indexes = IndexRegistry::new(table);
        if indexed {
            indexes.build("population", IndexKind::Auto).unwrap();
        }
        let bound = BoundPredicate::bind(expr, table).unwrap();
        let plan = QueryPlanner::new(&indexes, EngineOptions::default()).plan(bound);
        let mut rows = plan.execute();
        rows.sort();
        rows.into_vec()
    }

    fn ge(v: i64) -> Expr {
        Expr::ge(Expr::field("population"), Expr::lit(v))
    }

    fn lt(v: i64) -> Expr {
        Expr::lt(Expr::field("population"), Expr::lit(v))
    }

    fn eq(v: i64) -> Expr {
        Expr::eq(Expr::field("population"), Expr::lit(v))
    }

    #[test]
    fn test_population_scenarios() {
        let table = population();
        for indexed in [true, false] {
            assert_eq!(run(&table, indexed, &eq(20)), vec![1, 2]);
            assert_eq!(run(&table, indexed, &ge(10)), vec![0, 1, 2]);
            assert_eq!(run(&table, indexed, &Expr::and(ge(10), lt(20))), vec![0]);
            assert_eq!(run(&table, indexed, &Expr::not(eq(20))), vec![0, 3]);
        }
    }

    #[test]
    fn test_or_and_constants() {
        let table = population();
        for indexed in [true, false] {
            assert_eq!(run(&table, indexed, &Expr::or(lt(10), eq(20))), vec![1, 2, 3]);
            assert_eq!(run(&table, indexed, &Expr::or(ge(0), eq(20))), vec![0, 1, 2, 3]);
            assert_eq!(run(&table, indexed, &Expr::and(Expr::lit(true), eq(10))), vec![0]);
            assert!(run(&table, indexed, &Expr::and(eq(10), Expr::lit(false))).is_empty());
        }
    }

    #[test]
    fn test_and_of_two_index_lookups() {
        let table = population();
        let le_20 = Expr::le(Expr::field("population"), Expr::lit(20i64));
        assert_eq!(run(&table, true, &Expr::and(ge(10), le_20)), vec![0, 1, 2]);
        assert!(run(&table, true, &Expr::and(eq(5), eq(10))).is_empty());
    }

    #[test]
    fn test_null_lookups() {
        let table = Table::of([(
            "population",
            ColumnStore::from_values(
                atlas_core::DataType::Int64,
                vec![10i64.into(), atlas_core::Value::Null, 3i64.into()],
            )
            .unwrap(),
        )])
        .unwrap();
        for indexed in [true, false] {
            assert_eq!(run(&table, indexed, &Expr::is_null(Expr::field("population"))), vec![1]);
            assert_eq!(
                run(&table, indexed, &Expr::is_not_null(Expr::field("population"))),
                vec![0, 2]
            );
            assert_eq!(run(&table, indexed, &Expr::not(eq(10))), vec![1, 2]);
        }
    }

    /// Four zips in three counties; the last county has none.
    fn counties() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register("zips", population()).unwrap();
        let counties = Table::of([
            ("name", ColumnStore::from_strings(["Alameda", "Kings", "Inyo"])),
            ("seat", ColumnStore::from_bools(vec![true, false, false])),
        ])
        .unwrap();
        catalog.register("counties", counties).unwrap();
        let links = vec![
            Association::to_one(1),
            Association::to_one(0),
            Association::to_one(1),
            Association::to_one(0),
        ];
        catalog
            .associate("zips", "county", "counties", "zips", links)
            .unwrap();
        catalog
    }

    fn run_in(catalog: &Catalog, indexed: bool, table: &str, expr: &Expr) -> Vec<RowPosition> {
        let mut indexes = CatalogIndexes::new(catalog);
        if indexed {
            indexes.build("zips", "population", IndexKind::Auto).unwrap();
            indexes.build("counties", "name", IndexKind::Auto).unwrap();
        }
        let source = catalog.table(table).unwrap();
        let bound = BoundPredicate::bind_in(expr, source, Some(catalog)).unwrap();
        let planner = QueryPlanner::in_catalog(&indexes, table, EngineOptions::default());
        let mut rows = planner.unwrap().plan(bound).execute();
        rows.sort();
        rows.into_vec()
    }

    fn county(name: &str) -> Expr {
        Expr::related("county", Expr::eq(Expr::field("name"), Expr::lit(name)))
    }

    #[test]
    fn test_related_scenarios() {
        let catalog = counties();
        for indexed in [true, false] {
            assert_eq!(run_in(&catalog, indexed, "zips", &county("Kings")), vec![0, 2]);
            assert!(run_in(&catalog, indexed, "zips", &county("Inyo")).is_empty());
            let kings_20 = Expr::and(eq(20), county("Kings"));
            assert_eq!(run_in(&catalog, indexed, "zips", &kings_20), vec![2]);
            let either = Expr::or(lt(10), county("Alameda"));
            assert_eq!(run_in(&catalog, indexed, "zips", &either), vec![1, 3]);
            let outside = Expr::not(county("Alameda"));
            assert_eq!(run_in(&catalog, indexed, "zips", &outside), vec![0, 2]);

            let any_zip = Expr::related("zips", Expr::lit(true));
            assert_eq!(run_in(&catalog, indexed, "counties", &any_zip), vec![0, 1]);
            let small = Expr::related("zips", lt(10));
            assert_eq!(run_in(&catalog, indexed, "counties", &small), vec![0]);
        }
    }
}
