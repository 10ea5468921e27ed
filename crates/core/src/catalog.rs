//! Named tables and the associations between them.

use crate::association::{Association, AssociationColumn};
use crate::error::{Error, Result};
use crate::table::Table;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// A set of tables registered by name.
///
/// Associations are always added in pairs: the forward column on the source
/// table and its reverse on the target table.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `table` under `name`.
    pub fn register(&mut self, name: impl Into<String>, table: Table) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(Error::duplicate_table(name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Returns the table registered under `name`, or a schema error.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the registered table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Associates each row of `source` with rows of `target`.
    ///
    /// `links` holds one association per source row. The forward column is
    /// added to `source` as `name` and the reverse column to `target` as
    /// `reverse`. A table may be associated with itself. Nothing changes if
    /// any check fails.
    pub fn associate(
        &mut self,
        source: &str,
        name: &str,
        target: &str,
        reverse: &str,
        links: Vec<Association>,
    ) -> Result<()> {
        let source_table = self.table(source)?;
        let target_table = self.table(target)?;
        source_table.check_name_free(name)?;
        target_table.check_name_free(reverse)?;
        if source == target && name == reverse {
            return Err(Error::duplicate_column(reverse));
        }
        if links.len() != source_table.row_count() {
            return Err(Error::shape_mismatch(
                name,
                source_table.row_count(),
                links.len(),
            ));
        }

        let forward =
            AssociationColumn::new(target, target_table.row_count(), links)?.with_reverse(reverse);
        let backward = forward.reverse(source).with_reverse(name);
        self.table_mut(source)?.add_association(name.into(), forward)?;
        self.table_mut(target)?.add_association(reverse.into(), backward)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::table_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnStore;
    use crate::error::ErrorKind;
    use alloc::vec;

    fn geography() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register(
                "cities",
                Table::of([(
                    "name",
                    ColumnStore::from_strings(["Minneapolis", "Pierre", "Duluth"]),
                )])
                .unwrap(),
            )
            .unwrap();
        catalog
            .register(
                "states",
                Table::of([("name", ColumnStore::from_strings(["Minnesota", "South Dakota"]))])
                    .unwrap(),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = geography();
        assert_eq!(catalog.table_names(), vec!["cities", "states"]);
        assert_eq!(catalog.table("cities").unwrap().row_count(), 3);
        assert_eq!(catalog.table("zips").unwrap_err(), Error::table_not_found("zips"));
        let err = catalog.register("cities", Table::empty()).unwrap_err();
        assert_eq!(err, Error::duplicate_table("cities"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_associate_adds_both_directions() {
        let mut catalog = geography();
        let links = vec![
            Association::to_one(0),
            Association::to_one(1),
            Association::to_one(0),
        ];
        catalog
            .associate("cities", "state", "states", "cities", links)
            .unwrap();

        let state = catalog.table("cities").unwrap().association("state").unwrap();
        assert_eq!(state.target(), "states");
        assert_eq!(state.reverse_name(), Some("cities"));
        assert_eq!(state.positions(1), &[1]);
        let cities = catalog.table("states").unwrap().association("cities").unwrap();
        assert_eq!(cities.target(), "cities");
        assert_eq!(cities.reverse_name(), Some("state"));
        assert_eq!(cities.positions(0), &[0, 2]);
    }

    #[test]
    fn test_associate_checks_before_changing_anything() {
        let mut catalog = geography();
        let err = catalog
            .associate("cities", "state", "counties", "cities", vec![])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);

        let err = catalog
            .associate("cities", "state", "states", "cities", vec![Association::None])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);

        let dangling = vec![Association::None, Association::to_one(2), Association::None];
        let err = catalog
            .associate("cities", "state", "states", "cities", dangling)
            .unwrap_err();
        assert_eq!(err, Error::dangling_association("states", 1, 2, 2));

        let err = catalog
            .associate("cities", "name", "states", "cities", vec![Association::None; 3])
            .unwrap_err();
        assert_eq!(err, Error::duplicate_column("name"));
        assert!(catalog.table("states").unwrap().association_names().is_empty());
    }

    #[test]
    fn test_self_association() {
        let mut catalog = geography();
        let links = vec![Association::to_one(2), Association::None, Association::to_one(0)];
        let err = catalog
            .associate("cities", "near", "cities", "near", links.clone())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);

        catalog
            .associate("cities", "near", "cities", "near_of", links)
            .unwrap();
        let cities = catalog.table("cities").unwrap();
        assert_eq!(cities.association_names(), vec!["near", "near_of"]);
        assert_eq!(cities.association("near_of").unwrap().positions(2), &[0]);
    }
}
