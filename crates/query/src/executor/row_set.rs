//! Intermediate query results: a duplicate-free set of row positions.

use alloc::vec::Vec;
use atlas_core::RowPosition;
use hashbrown::HashSet;
use tracing::trace;

/// A set of row positions with no duplicates.
///
/// Positions are kept in the order they were produced. Index range lookups
/// produce key order rather than position order, so the set remembers whether
/// its positions happen to be ascending and picks merge or hash based set
/// operations accordingly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSet {
    positions: Vec<RowPosition>,
    sorted: bool,
}

impl RowSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            sorted: true,
        }
    }

    /// Creates the set of every row position of a table with `row_count` rows.
    pub fn all(row_count: usize) -> Self {
        Self {
            positions: (0..row_count).collect(),
            sorted: true,
        }
    }

    /// Wraps duplicate-free positions already in ascending order.
    pub fn from_sorted(positions: Vec<RowPosition>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Self {
            positions,
            sorted: true,
        }
    }

    /// Wraps duplicate-free positions in any order.
    pub fn from_positions(positions: Vec<RowPosition>) -> Self {
        let sorted = positions.windows(2).all(|w| w[0] < w[1]);
        Self { positions, sorted }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns true if the positions are in ascending order.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn as_slice(&self) -> &[RowPosition] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = RowPosition> + '_ {
        self.positions.iter().copied()
    }

    pub fn into_vec(self) -> Vec<RowPosition> {
        self.positions
    }

    /// Sorts the positions ascending.
    pub fn sort(&mut self) {
        if !self.sorted {
            self.positions.sort_unstable();
            self.sorted = true;
        }
    }

    /// Keeps the positions for which `f` returns true. Order is preserved.
    pub fn retain(&mut self, f: impl FnMut(&RowPosition) -> bool) {
        self.positions.retain(f);
    }

    /// Returns the positions present in both sets, in the order of `self`.
    pub fn intersect(mut self, other: &RowSet) -> RowSet {
        if self.is_empty() || other.is_empty() {
            return RowSet::empty();
        }
        if self.sorted && other.sorted {
            let mut out = Vec::with_capacity(self.len().min(other.len()));
            let (a, b) = (&self.positions, &other.positions);
            let (mut i, mut j) = (0, 0);
            while i < a.len() && j < b.len() {
                match a[i].cmp(&b[j]) {
                    core::cmp::Ordering::Less => i += 1,
                    core::cmp::Ordering::Greater => j += 1,
                    core::cmp::Ordering::Equal => {
                        out.push(a[i]);
                        i += 1;
                        j += 1;
                    }
                }
            }
            trace!(left = a.len(), right = b.len(), out = out.len(), "merge intersect");
            return RowSet::from_sorted(out);
        }
        let lookup: HashSet<RowPosition> = other.positions.iter().copied().collect();
        let before = self.len();
        self.positions.retain(|p| lookup.contains(p));
        trace!(left = before, right = other.len(), out = self.len(), "hash intersect");
        self
    }

    /// Returns the positions present in either set: those of `self` first,
    /// then the new ones of `other`.
    pub fn union(mut self, other: &RowSet) -> RowSet {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other.clone();
        }
        if self.sorted && other.sorted {
            let mut out = Vec::with_capacity(self.len() + other.len());
            let (a, b) = (&self.positions, &other.positions);
            let (mut i, mut j) = (0, 0);
            while i < a.len() && j < b.len() {
                match a[i].cmp(&b[j]) {
                    core::cmp::Ordering::Less => {
                        out.push(a[i]);
                        i += 1;
                    }
                    core::cmp::Ordering::Greater => {
                        out.push(b[j]);
                        j += 1;
                    }
                    core::cmp::Ordering::Equal => {
                        out.push(a[i]);
                        i += 1;
                        j += 1;
                    }
                }
            }
            out.extend_from_slice(&a[i..]);
            out.extend_from_slice(&b[j..]);
            trace!(left = a.len(), right = b.len(), out = out.len(), "merge union");
            return RowSet::from_sorted(out);
        }
        let mut seen: HashSet<RowPosition> = self.positions.iter().copied().collect();
        let before = self.len();
        for &p in &other.positions {
            if seen.insert(p) {
                self.positions.push(p);
            }
        }
        self.sorted = false;
        trace!(left = before, right = other.len(), out = self.len(), "hash union");
        self
    }
}

impl IntoIterator for RowSet {
    type Item = RowPosition;
    type IntoIter = alloc::vec::IntoIter<RowPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.into_iter()
    }
}
