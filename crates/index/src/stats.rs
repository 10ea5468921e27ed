//! Index statistics for Atlas.
//!
//! Serial indices are immutable, so statistics are computed once at build time.

/// Statistics for an index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of non-null entries.
    pub entries: usize,
    /// Number of null rows kept in the side list.
    pub nulls: usize,
    /// Number of distinct non-null keys.
    pub distinct_keys: usize,
}

impl IndexStats {
    /// Computes statistics from the number of entries, nulls, and an iterator
    /// over "key differs from its predecessor" flags of the sorted keys.
    pub(crate) fn from_sorted(
        entries: usize,
        nulls: usize,
        boundaries: impl Iterator<Item = bool>,
    ) -> Self {
        let distinct_keys = if entries == 0 {
            0
        } else {
            1 + boundaries.filter(|&b| b).count()
        };
        Self {
            entries,
            nulls,
            distinct_keys,
        }
    }

    /// Returns the total number of rows covered (entries plus nulls).
    pub fn total_rows(&self) -> usize {
        self.entries + self.nulls
    }

    /// Returns the average number of rows per distinct key, rounded up.
    pub fn rows_per_key(&self) -> usize {
        if self.distinct_keys == 0 {
            0
        } else {
            self.entries.div_ceil(self.distinct_keys)
        }
    }

    /// Returns true if no two entries share a key.
    pub fn is_unique(&self) -> bool {
        self.entries == self.distinct_keys
    }
}
