use crate::{record_array::try_zeroed, TableError};

/// One occupancy bit per record slot.
#[derive(Clone)]
pub struct OccupancyBitmap {
    words: Vec<u64>,
    bits: usize,
}

impl OccupancyBitmap {
    /// Allocates a bitmap of `bits` cleared bits.
    pub fn try_new(bits: usize) -> Result<Self, TableError> {
        Ok(Self {
            words: try_zeroed(bits.div_ceil(64))?,
            bits,
        })
    }

    /// Returns the number of bytes used for a bitmap of `bits` bits.
    pub fn bytes_for(bits: usize) -> usize {
        bits.div_ceil(64) * std::mem::size_of::<u64>()
    }

    /// Returns the number of bits.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bits
    }

    /// Returns `true` for a bitmap of zero bits.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns whether a bit is set.
    #[inline(always)]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.bits);
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Sets a bit.
    #[inline(always)]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.bits);
        self.words[index / 64] |= 1 << (index % 64);
    }

    /// Clears a bit.
    #[inline(always)]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.bits);
        self.words[index / 64] &= !(1 << (index % 64));
    }

    /// Clears all bits.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}
