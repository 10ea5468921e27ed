//! Tables: ordered collections of equal-length, uniquely named column stores.

use crate::association::AssociationColumn;
use crate::column::ColumnStore;
use crate::error::{Error, Result};
use crate::RowPosition;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// An immutable table of named columns sharing one row count.
#[derive(Clone, Debug)]
pub struct Table {
    /// Column names in declaration order.
    names: Vec<String>,
    /// Column stores, parallel to `names`.
    columns: Vec<ColumnStore>,
    /// Name to ordinal lookup.
    ordinals: HashMap<String, usize>,
    /// Association columns by name, one link per row.
    associations: HashMap<String, AssociationColumn>,
    /// Row count shared by every column.
    row_count: usize,
}

impl Table {
    /// Creates a table from `(name, column)` pairs.
    ///
    /// Fails with a shape error if the columns differ in length, and with a
    /// schema error if two columns share a name.
    pub fn of<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ColumnStore)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut stores = Vec::new();
        let mut ordinals = HashMap::new();
        let mut row_count = None;

        for (name, store) in columns {
            let name = name.into();
            let expected = *row_count.get_or_insert(store.len());
            if store.len() != expected {
                return Err(Error::shape_mismatch(name, expected, store.len()));
            }
            if ordinals.contains_key(&name) {
                return Err(Error::duplicate_column(name));
            }
            ordinals.insert(name.clone(), names.len());
            names.push(name);
            stores.push(store);
        }

        Ok(Self {
            names,
            columns: stores,
            ordinals,
            associations: HashMap::new(),
            row_count: row_count.unwrap_or(0),
        })
    }

    /// Creates a table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            ordinals: HashMap::new(),
            associations: HashMap::new(),
            row_count: 0,
        }
    }

    /// Adds an association column under `name`.
    ///
    /// The column must cover every row, and `name` must not be taken by a
    /// column or another association.
    pub fn with_association(
        mut self,
        name: impl Into<String>,
        column: AssociationColumn,
    ) -> Result<Self> {
        self.add_association(name.into(), column)?;
        Ok(self)
    }

    pub(crate) fn add_association(
        &mut self,
        name: String,
        column: AssociationColumn,
    ) -> Result<()> {
        self.check_name_free(&name)?;
        if column.len() != self.row_count {
            return Err(Error::shape_mismatch(name, self.row_count, column.len()));
        }
        self.associations.insert(name, column);
        Ok(())
    }

    pub(crate) fn check_name_free(&self, name: &str) -> Result<()> {
        if self.ordinals.contains_key(name) || self.associations.contains_key(name) {
            return Err(Error::duplicate_column(name));
        }
        Ok(())
    }

    /// Returns the association named `name`, or a schema error.
    pub fn association(&self, name: &str) -> Result<&AssociationColumn> {
        self.associations
            .get(name)
            .ok_or_else(|| Error::association_not_found(name))
    }

    /// Gets an association by name.
    pub fn get_association(&self, name: &str) -> Option<&AssociationColumn> {
        self.associations.get(name)
    }

    /// Returns the association names, sorted.
    pub fn association_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.associations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the column named `name`, or a schema error.
    pub fn column(&self, name: &str) -> Result<&ColumnStore> {
        self.get_column(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnStore> {
        self.ordinals.get(name).map(|&i| &self.columns[i])
    }

    /// Gets a column ordinal by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.ordinals.get(name).copied()
    }

    /// Gets a column by ordinal position.
    pub fn column_at(&self, ordinal: usize) -> Option<&ColumnStore> {
        self.columns.get(ordinal)
    }

    /// Returns true if the table has a column named `name`.
    pub fn contains_column(&self, name: &str) -> bool {
        self.ordinals.contains_key(name)
    }

    /// Iterates column names in declaration order. The iterator is cheap to
    /// clone, so the sequence can be restarted.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Iterates `(name, column)` pairs in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnStore)> + '_ {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Produces a new table holding the rows at `positions`, in that order,
    /// across every column and association.
    ///
    /// Every position must be below `row_count()`.
    pub fn subset(&self, positions: &[RowPosition]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(positions)).collect(),
            ordinals: self.ordinals.clone(),
            associations: self
                .associations
                .iter()
                .map(|(name, a)| (name.clone(), a.take(positions)))
                .collect(),
            row_count: positions.len(),
        }
    }

    /// Produces a new table with only the named columns, in the given order.
    /// Associations are not carried over.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            columns.push((name, self.column(name)?.clone()));
        }
        if columns.is_empty() {
            return Ok(Table::empty());
        }
        Table::of(columns)
    }
}

/// Builder for creating tables column by column.
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<(String, ColumnStore)>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column. Validation happens in [`TableBuilder::build`].
    pub fn add_column(mut self, name: impl Into<String>, column: ColumnStore) -> Self {
        self.columns.push((name.into(), column));
        self
    }

    /// Validates shape and names and produces the table.
    pub fn build(self) -> Result<Table> {
        Table::of(self.columns)
    }
}
