//! Projection of matched rows into a new table.

use alloc::vec::Vec;
use atlas_core::{Result, RowPosition, Table};

/// Builds a table holding the named columns of `table` at `positions`, in
/// the order given.
pub fn project<S: AsRef<str>>(
    table: &Table,
    columns: &[S],
    positions: &[RowPosition],
) -> Result<Table> {
    let projected = columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            table.column(name).map(|store| (name, store.take(positions)))
        })
        .collect::<Result<Vec<_>>>()?;
    Table::of(projected)
}
