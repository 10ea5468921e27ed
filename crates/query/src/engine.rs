//! Query engine entry points.

use crate::ast::{BoundPredicate, Expr};
use crate::context::EngineOptions;
use crate::executor::{project, RowSet};
use crate::planner::{Plan, QueryPlanner};
use alloc::string::String;
use alloc::vec::Vec;
use atlas_core::{Catalog, Error, Result, RowPosition, Table};
use atlas_index::{CatalogIndexes, IndexRegistry};
use hashbrown::HashSet;
use tracing::debug;

/// A predicate plus optional projection and ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    predicate: Expr,
    projection: Option<Vec<String>>,
    order_by_position: bool,
}

impl Query {
    pub fn new(predicate: Expr) -> Self {
        Self {
            predicate,
            projection: None,
            order_by_position: false,
        }
    }

    /// Materializes the named columns of the matching rows, in this order.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Returns matching rows in ascending row position order.
    pub fn order_by_position(mut self) -> Self {
        self.order_by_position = true;
        self
    }

    pub fn predicate(&self) -> &Expr {
        &self.predicate
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    pub fn is_ordered(&self) -> bool {
        self.order_by_position
    }
}

impl From<Expr> for Query {
    fn from(predicate: Expr) -> Self {
        Query::new(predicate)
    }
}

/// The rows matched by a query and, when requested, their projected columns.
///
/// Without `order_by_position` the positions are a set; their order depends on
/// the plan and is not part of the result.
#[derive(Clone, Debug)]
pub struct QueryResult {
    rows: RowSet,
    table: Option<Table>,
}

impl QueryResult {
    pub fn positions(&self) -> &[RowPosition] {
        self.rows.as_slice()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if the positions are in ascending order.
    pub fn is_sorted(&self) -> bool {
        self.rows.is_sorted()
    }

    /// Sorts the positions ascending, reordering projected rows to match.
    pub fn sort_by_position(&mut self) {
        if self.rows.is_sorted() {
            return;
        }
        let positions = self.rows.as_slice();
        let mut order: Vec<usize> = (0..positions.len()).collect();
        order.sort_unstable_by_key(|&i| positions[i]);
        self.table = self.table.take().map(|t| t.subset(&order));
        self.rows.sort();
    }

    /// Returns the projected columns, if the query selected any.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn into_table(self) -> Option<Table> {
        self.table
    }

    pub fn into_positions(self) -> Vec<RowPosition> {
        self.rows.into_vec()
    }
}

/// Evaluates predicate trees over a table and its index registry, or over
/// a table of a [`Catalog`] together with the tables it is associated with.
///
/// The engine holds no per-query state; one engine may serve any number of
/// threads at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryEngine {
    options: EngineOptions,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Validates `predicate` against `table` and plans it.
    ///
    /// Fails with a schema error if a field is unknown or `indexes` was built
    /// over another table, and with a type error if the tree is malformed.
    pub fn plan<'a>(
        &self,
        table: &'a Table,
        predicate: &Expr,
        indexes: &'a IndexRegistry<'_>,
    ) -> Result<Plan<'a>> {
        if !indexes.is_for(table) {
            return Err(Error::index_mismatch(
                "index registry was built over a different table",
            ));
        }
        let bound = BoundPredicate::bind(predicate, table)?;
        Ok(QueryPlanner::new(indexes, self.options).plan(bound))
    }

    /// Returns the positions of the rows of `table` that satisfy `predicate`.
    pub fn execute(
        &self,
        table: &Table,
        predicate: &Expr,
        indexes: &IndexRegistry<'_>,
    ) -> Result<QueryResult> {
        self.run(table, predicate, None, false, indexes)
    }

    /// Evaluates `predicate` by scanning, without any index.
    pub fn execute_unindexed(&self, table: &Table, predicate: &Expr) -> Result<QueryResult> {
        let indexes = IndexRegistry::new(table);
        self.execute(table, predicate, &indexes)
    }

    /// Runs a query, applying its projection and ordering.
    ///
    /// Projection columns are checked before any row is read.
    pub fn query(
        &self,
        table: &Table,
        query: &Query,
        indexes: &IndexRegistry<'_>,
    ) -> Result<QueryResult> {
        check_projection(table, query)?;
        self.run(
            table,
            query.predicate(),
            query.projection(),
            query.is_ordered(),
            indexes,
        )
    }

    /// Validates `predicate` against the table registered as `table` in
    /// `catalog` and plans it. Associations are followed into the other
    /// tables of the catalog, using their indices in `indexes`.
    ///
    /// Fails with a schema error if the table, a field or an association is
    /// unknown, or if `indexes` was built over another catalog.
    pub fn plan_in<'a>(
        &self,
        catalog: &'a Catalog,
        table: &str,
        predicate: &Expr,
        indexes: &'a CatalogIndexes<'_>,
    ) -> Result<Plan<'a>> {
        let source = catalog.table(table)?;
        if !indexes.is_for(catalog) {
            return Err(Error::index_mismatch(
                "catalog indices were built over a different catalog",
            ));
        }
        let bound = BoundPredicate::bind_in(predicate, source, Some(catalog))?;
        Ok(QueryPlanner::in_catalog(indexes, table, self.options)?.plan(bound))
    }

    /// Returns the positions of the rows of the catalog table `table` that
    /// satisfy `predicate`.
    pub fn execute_in(
        &self,
        catalog: &Catalog,
        table: &str,
        predicate: &Expr,
        indexes: &CatalogIndexes<'_>,
    ) -> Result<QueryResult> {
        let plan = self.plan_in(catalog, table, predicate, indexes)?;
        self.finish(catalog.table(table)?, &plan, None, false)
    }

    /// Runs a query over the catalog table `table`.
    pub fn query_in(
        &self,
        catalog: &Catalog,
        table: &str,
        query: &Query,
        indexes: &CatalogIndexes<'_>,
    ) -> Result<QueryResult> {
        let source = catalog.table(table)?;
        check_projection(source, query)?;
        let plan = self.plan_in(catalog, table, query.predicate(), indexes)?;
        self.finish(source, &plan, query.projection(), query.is_ordered())
    }

    fn run(
        &self,
        table: &Table,
        predicate: &Expr,
        projection: Option<&[String]>,
        ordered: bool,
        indexes: &IndexRegistry<'_>,
    ) -> Result<QueryResult> {
        let plan = self.plan(table, predicate, indexes)?;
        self.finish(table, &plan, projection, ordered)
    }

    fn finish(
        &self,
        table: &Table,
        plan: &Plan<'_>,
        projection: Option<&[String]>,
        ordered: bool,
    ) -> Result<QueryResult> {
        let mut rows = plan.execute();
        if ordered {
            rows.sort();
        }
        let projected = match projection {
            Some(columns) => Some(project(table, columns, rows.as_slice())?),
            None => None,
        };
        debug!(
            rows = rows.len(),
            estimate = plan.estimate(),
            sorted = rows.is_sorted(),
            projected = projected.is_some(),
            "executed query"
        );
        Ok(QueryResult {
            rows,
            table: projected,
        })
    }
}

fn check_projection(table: &Table, query: &Query) -> Result<()> {
    if let Some(columns) = query.projection() {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in columns {
            table.column(name)?;
            if !seen.insert(name.as_str()) {
                return Err(Error::duplicate_column(name.as_str()));
            }
        }
    }
    Ok(())
}
