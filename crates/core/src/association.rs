//! Associations from the rows of one table to the rows of another.

use crate::error::{Error, Result};
use crate::RowPosition;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// The rows of the associated table that one row points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Association {
    #[default]
    None,
    One(RowPosition),
    Many(Vec<RowPosition>),
}

impl Association {
    /// Creates an association to a single row.
    pub fn to_one(position: RowPosition) -> Self {
        Association::One(position)
    }

    /// Creates an association to every row in `positions`, in that order.
    /// Zero or one position collapses to `None` or `One`.
    pub fn to_many(positions: impl IntoIterator<Item = RowPosition>) -> Self {
        positions
            .into_iter()
            .fold(Association::None, |acc, p| acc.add(p))
    }

    /// Appends one associated row.
    pub fn add(self, position: RowPosition) -> Self {
        match self {
            Association::None => Association::One(position),
            Association::One(first) => Association::Many(vec![first, position]),
            Association::Many(mut positions) => {
                positions.push(position);
                Association::Many(positions)
            }
        }
    }

    /// Returns the associated row positions.
    pub fn positions(&self) -> &[RowPosition] {
        match self {
            Association::None => &[],
            Association::One(p) => core::slice::from_ref(p),
            Association::Many(positions) => positions,
        }
    }

    pub fn len(&self) -> usize {
        self.positions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions().is_empty()
    }
}

impl From<RowPosition> for Association {
    fn from(position: RowPosition) -> Self {
        Association::One(position)
    }
}

impl From<Option<RowPosition>> for Association {
    fn from(position: Option<RowPosition>) -> Self {
        position.map_or(Association::None, Association::One)
    }
}

/// One association per row of its table, each pointing into the rows of the
/// table named by [`AssociationColumn::target`].
#[derive(Clone, Debug, PartialEq)]
pub struct AssociationColumn {
    target: String,
    target_rows: usize,
    links: Vec<Association>,
    link_count: usize,
    /// Name of the column on the target table pointing back at this one.
    reverse: Option<String>,
}

impl AssociationColumn {
    /// Creates an association column into `target`, a table of
    /// `target_rows` rows.
    ///
    /// Fails with a shape error if a link points past the target's rows.
    pub fn new(
        target: impl Into<String>,
        target_rows: usize,
        links: Vec<Association>,
    ) -> Result<Self> {
        let target = target.into();
        for (row, link) in links.iter().enumerate() {
            if let Some(&position) = link.positions().iter().find(|&&p| p >= target_rows) {
                return Err(Error::dangling_association(target, row, position, target_rows));
            }
        }
        let link_count = links.iter().map(Association::len).sum();
        Ok(Self {
            target,
            target_rows,
            links,
            link_count,
            reverse: None,
        })
    }

    /// Names the association on the target table that points back at this
    /// column's table.
    pub fn with_reverse(mut self, name: impl Into<String>) -> Self {
        self.reverse = Some(name.into());
        self
    }

    /// Returns the name of the reverse association, if it is known.
    pub fn reverse_name(&self) -> Option<&str> {
        self.reverse.as_deref()
    }

    /// Returns the name of the associated table.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the row count of the associated table.
    pub fn target_rows(&self) -> usize {
        self.target_rows
    }

    /// Returns the number of rows this column covers.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns the association of one row. Rows past the end have none.
    pub fn get(&self, row: RowPosition) -> &Association {
        const NONE: &Association = &Association::None;
        self.links.get(row).unwrap_or(NONE)
    }

    /// Returns the associated positions of one row.
    #[inline]
    pub fn positions(&self, row: RowPosition) -> &[RowPosition] {
        self.get(row).positions()
    }

    /// Returns the total number of links.
    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Builds the column pointing the other way: for each target row, the
    /// rows of `source` that point at it, in ascending order.
    pub fn reverse(&self, source: impl Into<String>) -> AssociationColumn {
        let mut links = vec![Association::None; self.target_rows];
        for (row, link) in self.links.iter().enumerate() {
            for &position in link.positions() {
                let slot = &mut links[position];
                *slot = core::mem::take(slot).add(row);
            }
        }
        AssociationColumn {
            target: source.into(),
            target_rows: self.links.len(),
            links,
            link_count: self.link_count,
            reverse: None,
        }
    }

    /// Produces the column for the rows at `positions`, in that order. The
    /// target rows are unchanged; the reverse association no longer matches
    /// and is dropped.
    pub fn take(&self, positions: &[RowPosition]) -> AssociationColumn {
        let links: Vec<Association> = positions.iter().map(|&p| self.get(p).clone()).collect();
        AssociationColumn {
            target: self.target.clone(),
            target_rows: self.target_rows,
            link_count: links.iter().map(Association::len).sum(),
            links,
            reverse: None,
        }
    }
}
