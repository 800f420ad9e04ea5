use std::fmt;

use bytetab_records::{
    ByteTable, InsertOutcome, RecordArray, RecordLayout, TableError, TableStats,
};
use bytetab_util::{fmt::fmt_hex, hash::fnv1a};

use crate::{RobinHoodConfig, MAX_CAPACITY};

/// Probe distance marking an empty slot.
const EMPTY: u32 = u32::MAX;

/// A Robin Hood hash table storing fixed-width byte records.
///
/// See the [crate level documentation][crate] for an overview.
pub struct RobinHoodTable {
    config: RobinHoodConfig,
    dists: Vec<u32>,
    records: RecordArray,
    len: usize,
    carry_key: Vec<u8>,
    carry_value: Vec<u8>,
}

impl fmt::Debug for RobinHoodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (fmt_hex(key), fmt_hex(value))))
            .finish()
    }
}

impl RobinHoodTable {
    /// Creates an empty table for keys of `key_size` and values of `value_size` bytes using the
    /// default configuration.
    pub fn create(key_size: usize, value_size: usize) -> Result<Self, TableError> {
        Self::with_config(
            RecordLayout::new(key_size, value_size)?,
            RobinHoodConfig::default(),
        )
    }

    /// Creates an empty table with the given layout and configuration.
    pub fn with_config(layout: RecordLayout, config: RobinHoodConfig) -> Result<Self, TableError> {
        let capacity = config.validated_capacity()?;
        Self::with_capacity(layout, config, capacity)
    }

    fn with_capacity(
        layout: RecordLayout,
        config: RobinHoodConfig,
        capacity: usize,
    ) -> Result<Self, TableError> {
        debug_assert!(capacity.is_power_of_two() && capacity <= MAX_CAPACITY);
        let mut dists = Vec::new();
        dists
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocationFailed {
                bytes: capacity * std::mem::size_of::<u32>(),
            })?;
        dists.resize(capacity, EMPTY);
        Ok(Self {
            config,
            dists,
            records: RecordArray::try_new(layout, capacity)?,
            len: 0,
            carry_key: vec![0; layout.key_size()],
            carry_value: vec![0; layout.value_size()],
        })
    }

    /// Returns the layout of the stored records.
    #[inline(always)]
    pub fn layout(&self) -> RecordLayout {
        self.records.layout()
    }

    /// Returns the configuration the table was created with.
    pub fn config(&self) -> &RobinHoodConfig {
        &self.config
    }

    /// Returns the number of slots. This is always a power of two.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.dists.len()
    }

    /// Returns the number of stored records.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no records are stored.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fraction of occupied slots.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Returns the number of bytes used by the table including its slot array.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.capacity() * std::mem::size_of::<u32>()
            + RecordArray::bytes_for(self.layout(), self.capacity())
            + self.carry_key.len()
            + self.carry_value.len()
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    #[inline(always)]
    fn home(&self, key: &[u8]) -> usize {
        fnv1a(key) as usize & self.mask()
    }

    /// Returns the slot index holding `key`.
    fn find(&self, key: &[u8]) -> Option<usize> {
        let mask = self.mask();
        let mut index = self.home(key);
        let mut dist = 0u32;
        loop {
            let resident = self.dists[index];
            // Everything further along the chain is closer to its home slot than `key` would be.
            if resident == EMPTY || dist > resident {
                return None;
            }
            if resident == dist && self.records.key_eq(index, key) {
                return Some(index);
            }
            index = (index + 1) & mask;
            dist += 1;
        }
    }

    /// Returns the value stored for `key`.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn lookup(&self, key: &[u8]) -> Option<&[u8]> {
        self.layout().check_key(key);
        self.find(key).map(|index| self.records.value(index))
    }

    /// Returns the value stored for `key` for modification.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn lookup_mut(&mut self, key: &[u8]) -> Option<&mut [u8]> {
        self.layout().check_key(key);
        self.find(key).map(|index| self.records.value_mut(index))
    }

    /// Returns the key and value stored in the slot at `index`, if it is occupied.
    ///
    /// Slot indices are returned by [`insert`][Self::insert] and stay valid until the table is
    /// modified again.
    pub fn slot(&self, index: usize) -> Option<(&[u8], &[u8])> {
        match self.dists.get(index) {
            Some(&dist) if dist != EMPTY => {
                Some((self.records.key(index), self.records.value(index)))
            }
            _ => None,
        }
    }

    /// Stores a record, overwriting the value if the key is already present.
    ///
    /// Grows the table first if the new record would exceed the load factor. The returned slot
    /// index is where `key` resides after the insertion.
    ///
    /// # Panics
    /// Panics if `key` or `value` do not match the table's layout.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<InsertOutcome<usize>, TableError> {
        self.layout().check_record(key, value);
        if !self.config.fits(self.len + 1, self.capacity()) {
            if let Some(index) = self.find(key) {
                self.records.value_mut(index).copy_from_slice(value);
                return Ok(InsertOutcome::Updated(index));
            }
            self.reserve(1)?;
        }
        Ok(self.insert_no_grow(key, value))
    }

    /// Inserts assuming there is at least one empty slot.
    fn insert_no_grow(&mut self, key: &[u8], value: &[u8]) -> InsertOutcome<usize> {
        debug_assert!(self.len < self.capacity());
        let mask = self.mask();
        let mut index = self.home(key);
        let mut dist = 0u32;

        let placed = loop {
            let resident = self.dists[index];
            if resident == EMPTY {
                self.records.write(index, key, value);
                self.dists[index] = dist;
                self.len += 1;
                return InsertOutcome::Inserted(index);
            }
            if resident == dist && self.records.key_eq(index, key) {
                self.records.value_mut(index).copy_from_slice(value);
                return InsertOutcome::Updated(index);
            }
            if resident < dist {
                self.carry_key.copy_from_slice(key);
                self.carry_value.copy_from_slice(value);
                self.records
                    .swap_with(index, &mut self.carry_key, &mut self.carry_value);
                self.dists[index] = dist;
                dist = resident;
                break index;
            }
            index = (index + 1) & mask;
            dist += 1;
        };

        // Continue inserting the displaced record. It cannot be equal to any other resident key.
        loop {
            index = (index + 1) & mask;
            dist += 1;
            let resident = self.dists[index];
            if resident == EMPTY {
                self.records
                    .write(index, &self.carry_key, &self.carry_value);
                self.dists[index] = dist;
                break;
            }
            if resident < dist {
                self.records
                    .swap_with(index, &mut self.carry_key, &mut self.carry_value);
                self.dists[index] = dist;
                dist = resident;
            }
        }

        self.len += 1;
        InsertOutcome::Inserted(placed)
    }

    /// Removes the record stored for `key`, returning whether there was one.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.layout().check_key(key);
        let Some(mut hole) = self.find(key) else {
            return false;
        };
        let mask = self.mask();

        self.records.clear(hole);
        self.dists[hole] = EMPTY;
        self.len -= 1;

        loop {
            let next = (hole + 1) & mask;
            let dist = self.dists[next];
            if dist == EMPTY || dist == 0 {
                break;
            }
            self.records.move_record(next, hole);
            self.dists[hole] = dist - 1;
            self.dists[next] = EMPTY;
            hole = next;
        }
        true
    }

    /// Doubles the capacity and rehashes all records.
    ///
    /// The new slot array is fully populated before it replaces the current one, so on failure
    /// the table is left unchanged.
    pub fn grow(&mut self) -> Result<(), TableError> {
        let new_capacity = self.capacity() * 2;
        if new_capacity > MAX_CAPACITY {
            return Err(TableError::CapacityExceeded);
        }
        self.rehash(new_capacity)
    }

    /// Grows the table until `additional` more records fit without exceeding the load factor.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TableError> {
        let target = self
            .len
            .checked_add(additional)
            .ok_or(TableError::CapacityExceeded)?;
        let mut new_capacity = self.capacity();
        while !self.config.fits(target, new_capacity) {
            new_capacity *= 2;
            if new_capacity > MAX_CAPACITY {
                log::warn!(
                    "cannot grow robin hood table beyond {MAX_CAPACITY} slots for {target} records"
                );
                return Err(TableError::CapacityExceeded);
            }
        }
        if new_capacity != self.capacity() {
            self.rehash(new_capacity)?;
        }
        Ok(())
    }

    fn rehash(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let mut grown = Self::with_capacity(self.layout(), self.config, new_capacity)?;
        for (key, value) in self.iter() {
            grown.insert_no_grow(key, value);
        }
        log::debug!(
            "grew robin hood table from {} to {} slots ({} records)",
            self.capacity(),
            new_capacity,
            self.len
        );
        *self = grown;
        Ok(())
    }

    /// Removes all records, keeping the current capacity.
    pub fn reset(&mut self) {
        log::trace!("resetting robin hood table with {} records", self.len);
        self.dists.fill(EMPTY);
        self.records.clear_all();
        self.len = 0;
    }

    /// Iterates over all stored records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.dists
            .iter()
            .enumerate()
            .filter(|&(_, &dist)| dist != EMPTY)
            .map(|(index, _)| (self.records.key(index), self.records.value(index)))
    }

    /// Returns the size and memory statistics of the table.
    pub fn stats(&self) -> TableStats {
        TableStats {
            active_capacity: self.capacity(),
            occupied: self.len,
            memory_bytes: self.memory_usage(),
        }
    }

    /// Panics if any internal invariant is violated.
    pub fn check(&self) {
        let capacity = self.capacity();
        assert!(capacity.is_power_of_two());
        assert!(capacity <= MAX_CAPACITY);
        assert!(self.config.fits(self.len, capacity));

        let mask = self.mask();
        let mut occupied = 0;
        for index in 0..capacity {
            let dist = self.dists[index];
            if dist == EMPTY {
                assert!(self.records.key(index).iter().all(|&byte| byte == 0));
                assert!(self.records.value(index).iter().all(|&byte| byte == 0));
                continue;
            }
            occupied += 1;
            let home = self.home(self.records.key(index));
            assert_eq!(
                dist as usize,
                index.wrapping_sub(home) & mask,
                "stored probe distance does not match home slot at {index}"
            );
            if dist > 0 {
                let prev = self.dists[index.wrapping_sub(1) & mask];
                assert!(
                    prev != EMPTY && prev + 1 >= dist,
                    "probe chain broken before slot {index}"
                );
            }
            assert_eq!(self.find(self.records.key(index)), Some(index));
        }
        assert_eq!(occupied, self.len);
    }
}

impl ByteTable for RobinHoodTable {
    type Location = usize;

    fn layout(&self) -> RecordLayout {
        RobinHoodTable::layout(self)
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<InsertOutcome<usize>, TableError> {
        RobinHoodTable::insert(self, key, value)
    }

    fn lookup(&self, key: &[u8]) -> Option<&[u8]> {
        RobinHoodTable::lookup(self, key)
    }

    fn delete(&mut self, key: &[u8]) -> bool {
        RobinHoodTable::delete(self, key)
    }

    fn reset(&mut self) {
        RobinHoodTable::reset(self)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn stats(&self) -> TableStats {
        RobinHoodTable::stats(self)
    }
}
