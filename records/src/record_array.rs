use std::ops::Range;

use crate::{RecordLayout, TableError};

/// Allocates a zero filled buffer, reporting allocation failure instead of aborting.
pub(crate) fn try_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>, TableError> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| TableError::AllocationFailed { bytes })?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// A fixed number of key/value record slots in flat, contiguous storage.
///
/// Keys and values live in two separate buffers, but the key and value of a slot always share the
/// same slot index. The number of slots is fixed at creation, so the storage never moves and slot
/// indices stay meaningful for the lifetime of the array.
///
/// A `RecordArray` does not track which slots are in use; that is left to the table using it.
/// Unused slots are kept zeroed.
pub struct RecordArray {
    layout: RecordLayout,
    slots: usize,
    keys: Vec<u8>,
    values: Vec<u8>,
}

impl RecordArray {
    /// Allocates zeroed storage for `slots` records of the given layout.
    pub fn try_new(layout: RecordLayout, slots: usize) -> Result<Self, TableError> {
        let key_bytes = slots
            .checked_mul(layout.key_size())
            .ok_or(TableError::AllocationFailed { bytes: usize::MAX })?;
        let value_bytes = slots
            .checked_mul(layout.value_size())
            .ok_or(TableError::AllocationFailed { bytes: usize::MAX })?;
        Ok(Self {
            layout,
            slots,
            keys: try_zeroed(key_bytes)?,
            values: try_zeroed(value_bytes)?,
        })
    }

    /// Returns the number of bytes needed to store `slots` records of the given layout.
    pub fn bytes_for(layout: RecordLayout, slots: usize) -> usize {
        slots.saturating_mul(layout.record_size())
    }

    /// Returns the layout of the stored records.
    #[inline(always)]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Returns the number of record slots.
    #[inline(always)]
    pub fn slots(&self) -> usize {
        self.slots
    }

    #[inline(always)]
    fn key_range(&self, index: usize) -> Range<usize> {
        let size = self.layout.key_size();
        index * size..(index + 1) * size
    }

    #[inline(always)]
    fn value_range(&self, index: usize) -> Range<usize> {
        let size = self.layout.value_size();
        index * size..(index + 1) * size
    }

    /// Returns the key bytes stored in a slot.
    #[inline(always)]
    pub fn key(&self, index: usize) -> &[u8] {
        &self.keys[self.key_range(index)]
    }

    /// Returns the value bytes stored in a slot.
    #[inline(always)]
    pub fn value(&self, index: usize) -> &[u8] {
        &self.values[self.value_range(index)]
    }

    /// Returns the value bytes stored in a slot for modification.
    #[inline(always)]
    pub fn value_mut(&mut self, index: usize) -> &mut [u8] {
        let range = self.value_range(index);
        &mut self.values[range]
    }

    /// Returns whether the key stored in a slot is byte-wise equal to `key`.
    #[inline(always)]
    pub fn key_eq(&self, index: usize, key: &[u8]) -> bool {
        self.key(index) == key
    }

    /// Overwrites a slot with the given key and value.
    #[inline(always)]
    pub fn write(&mut self, index: usize, key: &[u8], value: &[u8]) {
        let key_range = self.key_range(index);
        self.keys[key_range].copy_from_slice(key);
        self.value_mut(index).copy_from_slice(value);
    }

    /// Exchanges the record in a slot with the record held in the given buffers.
    #[inline(always)]
    pub fn swap_with(&mut self, index: usize, key: &mut [u8], value: &mut [u8]) {
        let key_range = self.key_range(index);
        self.keys[key_range].swap_with_slice(key);
        self.value_mut(index).swap_with_slice(value);
    }

    /// Copies the record in slot `from` to slot `to` and zeroes slot `from`.
    #[inline(always)]
    pub fn move_record(&mut self, from: usize, to: usize) {
        let key_range = self.key_range(from);
        let value_range = self.value_range(from);
        let key_dest = self.key_range(to).start;
        let value_dest = self.value_range(to).start;
        self.keys.copy_within(key_range, key_dest);
        self.values.copy_within(value_range, value_dest);
        self.clear(from);
    }

    /// Zeroes a slot.
    #[inline(always)]
    pub fn clear(&mut self, index: usize) {
        let key_range = self.key_range(index);
        self.keys[key_range].fill(0);
        self.value_mut(index).fill(0);
    }

    /// Zeroes all slots in the given range.
    pub fn clear_range(&mut self, range: Range<usize>) {
        let key_size = self.layout.key_size();
        let value_size = self.layout.value_size();
        self.keys[range.start * key_size..range.end * key_size].fill(0);
        self.values[range.start * value_size..range.end * value_size].fill(0);
    }

    /// Zeroes all slots.
    pub fn clear_all(&mut self) {
        self.keys.fill(0);
        self.values.fill(0);
    }
}
