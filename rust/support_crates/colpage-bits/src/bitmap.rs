//! Read-only validity bitmap view.

use crate::bitpacking::count_set_bits;

/// A read-only view over a packed LSB-first validity bitmap, starting at an
/// arbitrary bit offset.
///
/// Bit `i` of the view is bit `offset + i` of the underlying bytes. A set bit marks
/// a non-null slot. The offset allows a view to address a window inside a larger
/// bitmap without copying it.
#[derive(Debug, Clone, Copy)]
pub struct ValidityBitmap<'a> {
    bits: &'a [u8],
    offset: usize,
}

impl<'a> ValidityBitmap<'a> {
    pub fn new(bits: &'a [u8], offset: usize) -> Self {
        Self { bits, offset }
    }

    /// Bit offset of the first slot within the underlying bytes.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn bits(&self) -> &'a [u8] {
        self.bits
    }

    /// Number of slots addressable through this view.
    #[inline]
    pub fn len(&self) -> usize {
        (self.bits.len() * 8).saturating_sub(self.offset)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if slot `index` is non-null.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        let pos = self.offset + index;
        self.bits[pos / 8] & (1 << (pos % 8)) != 0
    }

    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    /// Number of non-null slots among the first `len` slots.
    pub fn count_valid(&self, len: usize) -> usize {
        count_set_bits(self.bits, self.offset, len)
    }

    /// Returns a view starting `offset` slots into this one.
    pub fn slice(&self, offset: usize) -> ValidityBitmap<'a> {
        ValidityBitmap {
            bits: self.bits,
            offset: self.offset + offset,
        }
    }

    /// Iterates over maximal runs of non-null slots among the first `len` slots,
    /// yielding `(start, end)` ranges.
    pub fn valid_runs(&self, len: usize) -> ValidRuns<'a> {
        ValidRuns {
            bitmap: *self,
            pos: 0,
            len,
        }
    }
}

/// Iterator over runs of consecutive non-null slots, see
/// [`ValidityBitmap::valid_runs`].
pub struct ValidRuns<'a> {
    bitmap: ValidityBitmap<'a>,
    pos: usize,
    len: usize,
}

impl Iterator for ValidRuns<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        while self.pos < self.len && self.bitmap.is_null(self.pos) {
            self.pos += 1;
        }
        if self.pos == self.len {
            return None;
        }
        let start = self.pos;
        while self.pos < self.len && self.bitmap.is_valid(self.pos) {
            self.pos += 1;
        }
        Some((start, self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::ValidityBitmap;

    #[test]
    fn test_offset_addressing() {
        // LSB first: 1,0,1,0,1,1,0,0 | 1,1,1,1,0,0,0,0
        let bits = [0b0011_0101u8, 0b0000_1111];
        let bitmap = ValidityBitmap::new(&bits, 0);
        assert_eq!(bitmap.len(), 16);
        assert!(bitmap.is_valid(0));
        assert!(bitmap.is_null(1));
        assert!(bitmap.is_valid(5));
        assert!(bitmap.is_valid(8));

        let shifted = ValidityBitmap::new(&bits, 6);
        assert_eq!(shifted.len(), 10);
        assert!(shifted.is_null(0));
        assert!(shifted.is_null(1));
        assert!(shifted.is_valid(2));
        assert_eq!(shifted.count_valid(10), 4);
        assert_eq!(bitmap.slice(6).count_valid(10), 4);
    }

    #[test]
    fn test_valid_runs() {
        let bits = [0b0011_0101u8, 0b0000_1111];
        let bitmap = ValidityBitmap::new(&bits, 0);
        let runs: Vec<_> = bitmap.valid_runs(16).collect();
        assert_eq!(runs, vec![(0, 1), (2, 3), (4, 6), (8, 12)]);

        let runs: Vec<_> = bitmap.valid_runs(10).collect();
        assert_eq!(runs, vec![(0, 1), (2, 3), (4, 6), (8, 10)]);

        let empty: [u8; 0] = [];
        assert_eq!(ValidityBitmap::new(&empty, 0).valid_runs(0).count(), 0);
    }
}
