//! Packed bit vector used as a column's presence mask.

use alloc::vec::Vec;

const WORD_BITS: usize = 64;

/// A fixed-length sequence of bits packed into 64-bit words.
///
/// Bit `i` set means row `i` holds a value; cleared means null.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    words: Vec<u64>,
    len: usize,
}

impl Bitmap {
    /// Creates an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bitmap with room for `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// Creates a bitmap of `len` bits, all set.
    pub fn all_set(len: usize) -> Self {
        let mut words = alloc::vec![u64::MAX; len.div_ceil(WORD_BITS)];
        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        Self { words, len }
    }

    /// Appends one bit.
    pub fn push(&mut self, bit: bool) {
        let offset = self.len % WORD_BITS;
        if offset == 0 {
            self.words.push(0);
        }
        if bit {
            if let Some(last) = self.words.last_mut() {
                *last |= 1u64 << offset;
            }
        }
        self.len += 1;
    }

    /// Returns bit `i`; out-of-range bits read as cleared.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// Returns the number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the bitmap holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of set bits.
    pub fn count_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns the number of cleared bits.
    pub fn count_unset(&self) -> usize {
        self.len - self.count_set()
    }

    /// Iterates the positions of set bits in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.get(i))
    }

    /// Iterates the positions of cleared bits in ascending order.
    pub fn iter_unset(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| !self.get(i))
    }

    /// Builds a new bitmap from the bits at `positions`, in that order.
    pub fn take(&self, positions: &[usize]) -> Bitmap {
        let mut out = Bitmap::with_capacity(positions.len());
        for &p in positions {
            out.push(self.get(p));
        }
        out
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut bitmap = Bitmap::with_capacity(iter.size_hint().0);
        for bit in iter {
            bitmap.push(bit);
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_push_get() {
        let mut bm = Bitmap::new();
        for i in 0..130 {
            bm.push(i % 3 == 0);
        }
        assert_eq!(bm.len(), 130);
        assert!(bm.get(0));
        assert!(!bm.get(1));
        assert!(bm.get(129));
        assert!(!bm.get(500));
        assert_eq!(bm.count_set(), 44);
        assert_eq!(bm.count_unset(), 86);
    }

    #[test]
    fn test_all_set() {
        let bm = Bitmap::all_set(70);
        assert_eq!(bm.count_set(), 70);
        assert!(bm.get(69));
        assert!(!bm.get(70));
        assert_eq!(Bitmap::all_set(0).count_set(), 0);
        assert_eq!(Bitmap::all_set(64).count_set(), 64);
    }

    #[test]
    fn test_iter_and_take() {
        let bm: Bitmap = vec![true, false, true, false].into_iter().collect();
        assert_eq!(bm.iter_set().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(bm.iter_unset().collect::<Vec<_>>(), vec![1, 3]);

        let taken = bm.take(&[3, 2, 2]);
        assert_eq!(taken.len(), 3);
        assert!(!taken.get(0));
        assert!(taken.get(1));
        assert!(taken.get(2));
    }
}
