//! Index selection and the per-table index registry.

use crate::boxed::BoxedIndex;
use crate::primitive::PrimitiveIndex;
use crate::traits::SerialIndex;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use atlas_core::{Catalog, ColumnStore, DataType, Error, Result, Table};
use core::fmt;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use tracing::debug;

/// Representation of a serial index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Primitive arrays for boolean and numeric columns, boxed pairs for strings.
    #[default]
    Auto,
    /// `(Value, RowPosition)` pairs.
    Boxed,
    /// Parallel key and position arrays.
    Primitive,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::Auto => "auto",
            IndexKind::Boxed => "boxed",
            IndexKind::Primitive => "primitive",
        })
    }
}

/// Builds a serial index of the requested kind over `store`.
pub fn build_index(
    column: &str,
    store: &ColumnStore,
    kind: IndexKind,
) -> Result<Box<dyn SerialIndex>> {
    let data_type = store.data_type();
    let kind = match kind {
        IndexKind::Auto if data_type.is_primitive() => IndexKind::Primitive,
        IndexKind::Auto => IndexKind::Boxed,
        other => other,
    };

    let index: Box<dyn SerialIndex> = match (kind, data_type) {
        (IndexKind::Primitive, DataType::Boolean) => {
            Box::new(PrimitiveIndex::<bool>::build(column, store)?)
        }
        (IndexKind::Primitive, DataType::Int32) => {
            Box::new(PrimitiveIndex::<i32>::build(column, store)?)
        }
        (IndexKind::Primitive, DataType::Int64) => {
            Box::new(PrimitiveIndex::<i64>::build(column, store)?)
        }
        (IndexKind::Primitive, DataType::Float64) => {
            Box::new(PrimitiveIndex::<f64>::build(column, store)?)
        }
        (IndexKind::Primitive, DataType::String) => {
            return Err(Error::unsupported_representation(column, data_type, "primitive"));
        }
        _ => Box::new(BoxedIndex::build(column, store)?),
    };

    let stats = index.stats();
    debug!(
        column,
        kind = %index.kind(),
        key_type = %data_type,
        entries = stats.entries,
        nulls = stats.nulls,
        distinct = stats.distinct_keys,
        "built serial index"
    );
    Ok(index)
}

/// The serial indices built over one table, keyed by column name.
///
/// The registry borrows its table, so it cannot outlive it; indices over a
/// table are only ever looked up through this value.
pub struct IndexRegistry<'t> {
    table: &'t Table,
    indexes: HashMap<String, Box<dyn SerialIndex>>,
}

impl<'t> IndexRegistry<'t> {
    /// Creates an empty registry for `table`.
    pub fn new(table: &'t Table) -> Self {
        Self {
            table,
            indexes: HashMap::new(),
        }
    }

    /// Returns the table this registry indexes.
    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// Returns true if this registry was created for `table`.
    pub fn is_for(&self, table: &Table) -> bool {
        core::ptr::eq(self.table, table)
    }

    /// Builds an index over `column`, replacing any previous index on it.
    ///
    /// The old index stays in place if the build fails.
    pub fn build(&mut self, column: &str, kind: IndexKind) -> Result<&dyn SerialIndex> {
        let store = self.table.column(column)?;
        let index = build_index(column, store, kind)?;
        Ok(self.put(index))
    }

    /// Builds indices over several columns with the same kind.
    pub fn build_all<S: AsRef<str>>(&mut self, columns: &[S], kind: IndexKind) -> Result<()> {
        for column in columns {
            self.build(column.as_ref(), kind)?;
        }
        Ok(())
    }

    /// Registers an index built elsewhere, replacing any previous index on its
    /// column. The index must cover exactly this table's column.
    pub fn insert(&mut self, index: Box<dyn SerialIndex>) -> Result<()> {
        let store = self.table.column(index.column())?;
        if index.key_type() != store.data_type() {
            return Err(Error::type_mismatch(
                format!("index on column {}", index.column()),
                store.data_type(),
                index.key_type(),
            ));
        }
        if index.row_count() != self.table.row_count() {
            return Err(Error::index_mismatch(format!(
                "index on column {} covers {} rows, table has {}",
                index.column(),
                index.row_count(),
                self.table.row_count()
            )));
        }
        self.put(index);
        Ok(())
    }

    fn put(&mut self, index: Box<dyn SerialIndex>) -> &dyn SerialIndex {
        let column = String::from(index.column());
        let slot = match self.indexes.entry(column) {
            Entry::Occupied(mut entry) => {
                entry.insert(index);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(index),
        };
        &**slot
    }

    /// Gets the index on `column`.
    pub fn get(&self, column: &str) -> Option<&dyn SerialIndex> {
        self.indexes.get(column).map(|i| i.as_ref())
    }

    /// Returns true if `column` is indexed.
    pub fn contains(&self, column: &str) -> bool {
        self.indexes.contains_key(column)
    }

    /// Drops the index on `column`.
    pub fn remove(&mut self, column: &str) -> Option<Box<dyn SerialIndex>> {
        self.indexes.remove(column)
    }

    /// Returns the indexed column names, sorted.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        columns.sort_unstable();
        columns
    }

    /// Returns the number of indices.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns true if no column is indexed.
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl fmt::Debug for IndexRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("rows", &self.table.row_count())
            .field("columns", &self.columns())
            .finish()
    }
}

/// One [`IndexRegistry`] per table of a catalog, created on first build.
pub struct CatalogIndexes<'c> {
    catalog: &'c Catalog,
    registries: HashMap<String, IndexRegistry<'c>>,
}

impl<'c> CatalogIndexes<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            registries: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Returns true if these indices were created for `catalog`.
    pub fn is_for(&self, catalog: &Catalog) -> bool {
        core::ptr::eq(self.catalog, catalog)
    }

    /// Builds an index over `column` of the table registered as `table`.
    pub fn build(
        &mut self,
        table: &str,
        column: &str,
        kind: IndexKind,
    ) -> Result<&dyn SerialIndex> {
        let source = self.catalog.table(table)?;
        let registry = match self.registries.entry(String::from(table)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                source.column(column)?;
                entry.insert(IndexRegistry::new(source))
            }
        };
        registry.build(column, kind)
    }

    /// Builds indices over several columns of one table.
    pub fn build_all<S: AsRef<str>>(
        &mut self,
        table: &str,
        columns: &[S],
        kind: IndexKind,
    ) -> Result<()> {
        for column in columns {
            self.build(table, column.as_ref(), kind)?;
        }
        Ok(())
    }

    /// Returns the registry of `table`, if any of its columns is indexed.
    pub fn registry(&self, table: &str) -> Option<&IndexRegistry<'c>> {
        self.registries.get(table)
    }
}

impl fmt::Debug for CatalogIndexes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tables: Vec<&str> = self.registries.keys().map(String::as_str).collect();
        tables.sort_unstable();
        f.debug_struct("CatalogIndexes").field("tables", &tables).finish()
    }
}
