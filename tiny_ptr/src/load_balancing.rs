use std::fmt;

use bytetab_records::{OccupancyBitmap, RecordArray, RecordLayout, TableError};
use bytetab_util::{fmt::fmt_hex, hash::seeded_hash};

use crate::LoadBalancingConfig;

/// A bucketized hash table whose usable part grows without moving records.
///
/// A key hashes to one of a fixed number of buckets and may be stored in any usable slot of that
/// bucket. Storage for every slot of every bucket is allocated when the table is created, but
/// only the first `active_slots_per_bucket` slots of each bucket are usable. Growing doubles that
/// number, so existing `(bucket, slot)` locations stay valid.
///
/// Slots are laid out slot-major: slot `s` of all buckets comes before slot `s + 1` of any bucket.
/// The usable slots therefore form a prefix of the storage.
pub struct LoadBalancingTable {
    config: LoadBalancingConfig,
    active_slots_per_bucket: usize,
    len: usize,
    occupied: OccupancyBitmap,
    records: RecordArray,
}

impl fmt::Debug for LoadBalancingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(bucket, slot, key, value)| ((bucket, slot), (fmt_hex(key), fmt_hex(value)))),
            )
            .finish()
    }
}

impl LoadBalancingTable {
    /// Creates an empty table, allocating storage for all of its slots.
    pub fn with_config(layout: RecordLayout, config: LoadBalancingConfig) -> Result<Self, TableError> {
        config.validate()?;
        let max_count = config.max_count();
        Ok(Self {
            config,
            active_slots_per_bucket: config.initial_slots_per_bucket,
            len: 0,
            occupied: OccupancyBitmap::try_new(max_count)?,
            records: RecordArray::try_new(layout, max_count)?,
        })
    }

    /// Returns the configuration of this table.
    pub fn config(&self) -> &LoadBalancingConfig {
        &self.config
    }

    /// Returns the layout of the stored records.
    pub fn layout(&self) -> RecordLayout {
        self.records.layout()
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

    /// Returns the number of buckets.
    #[inline(always)]
    pub fn num_buckets(&self) -> usize {
        self.config.num_buckets
    }

    /// Returns the maximum number of slots per bucket.
    #[inline(always)]
    pub fn slots_per_bucket(&self) -> usize {
        self.config.slots_per_bucket
    }

    /// Returns the number of currently usable slots per bucket.
    #[inline(always)]
    pub fn active_slots_per_bucket(&self) -> usize {
        self.active_slots_per_bucket
    }

    /// Returns the number of currently usable slots.
    pub fn active_count(&self) -> usize {
        self.active_slots_per_bucket * self.config.num_buckets
    }

    /// Returns the number of slots the table can grow to.
    pub fn max_count(&self) -> usize {
        self.config.max_count()
    }

    /// Returns the memory used by the usable part of the table in bytes.
    pub fn active_memory_usage(&self) -> usize {
        let active = self.active_count();
        std::mem::size_of::<Self>()
            + RecordArray::bytes_for(self.layout(), active)
            + OccupancyBitmap::bytes_for(active)
    }

    /// Returns the bucket `key` hashes to.
    #[inline(always)]
    pub fn bucket_of(&self, key: &[u8]) -> usize {
        (seeded_hash(self.config.seed, key) % self.config.num_buckets as u64) as usize
    }

    #[inline(always)]
    fn position(&self, bucket: usize, slot: usize) -> usize {
        debug_assert!(bucket < self.config.num_buckets);
        debug_assert!(slot < self.config.slots_per_bucket);
        slot * self.config.num_buckets + bucket
    }

    /// Returns `(bucket, slot)` of the record stored for `key`.
    pub fn find(&self, key: &[u8]) -> Option<(usize, usize)> {
        let bucket = self.bucket_of(key);
        (0..self.active_slots_per_bucket)
            .find(|&slot| {
                let position = self.position(bucket, slot);
                self.occupied.get(position) && self.records.key_eq(position, key)
            })
            .map(|slot| (bucket, slot))
    }

    /// Returns the key and value stored at a location, if it is occupied.
    pub fn get(&self, bucket: usize, slot: usize) -> Option<(&[u8], &[u8])> {
        if bucket >= self.config.num_buckets || slot >= self.active_slots_per_bucket {
            return None;
        }
        let position = self.position(bucket, slot);
        self.occupied
            .get(position)
            .then(|| (self.records.key(position), self.records.value(position)))
    }

    /// Overwrites the value stored for `key` and returns its `(bucket, slot)`.
    ///
    /// Returns `None` without modifying the table if `key` is not present.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Option<(usize, usize)> {
        let (bucket, slot) = self.find(key)?;
        let position = self.position(bucket, slot);
        self.records.value_mut(position).copy_from_slice(value);
        Some((bucket, slot))
    }

    /// Stores a record in the first free usable slot of `bucket` and returns that slot.
    ///
    /// Returns `None` if `bucket` is out of range or has no free usable slot. This does not check
    /// whether `key` is already present.
    pub fn place(&mut self, bucket: usize, key: &[u8], value: &[u8]) -> Option<usize> {
        if bucket >= self.config.num_buckets {
            return None;
        }
        let slot = (0..self.active_slots_per_bucket)
            .find(|&slot| !self.occupied.get(self.position(bucket, slot)))?;
        let position = self.position(bucket, slot);
        self.occupied.set(position);
        self.records.write(position, key, value);
        self.len += 1;
        Some(slot)
    }

    /// Doubles the number of usable slots per bucket, up to the maximum.
    ///
    /// Returns `false` if the table already uses all of its slots.
    pub fn grow_active(&mut self) -> bool {
        let max = self.config.slots_per_bucket;
        if self.active_slots_per_bucket >= max {
            return false;
        }
        let old = self.active_slots_per_bucket;
        self.active_slots_per_bucket = (old * 2).min(max);
        log::debug!(
            "grew load balancing table from {} to {} of {} slots per bucket ({} records)",
            old,
            self.active_slots_per_bucket,
            max,
            self.len
        );
        true
    }

    /// Removes the record at an occupied location, returning whether there was one.
    pub fn remove_at(&mut self, bucket: usize, slot: usize) -> bool {
        if bucket >= self.config.num_buckets || slot >= self.active_slots_per_bucket {
            return false;
        }
        let position = self.position(bucket, slot);
        if !self.occupied.get(position) {
            return false;
        }
        self.occupied.clear(position);
        self.records.clear(position);
        self.len -= 1;
        true
    }

    /// Removes the record stored for `key`, returning whether there was one.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        match self.find(key) {
            Some((bucket, slot)) => self.remove_at(bucket, slot),
            None => false,
        }
    }

    /// Removes all records and shrinks the usable part back to its initial size.
    ///
    /// Storage is kept allocated.
    pub fn reset(&mut self) {
        // Slots beyond the usable prefix are never written, so they are still zeroed.
        let active = self.active_count();
        for position in 0..active {
            self.occupied.clear(position);
        }
        self.records.clear_range(0..active);
        self.active_slots_per_bucket = self.config.initial_slots_per_bucket;
        self.len = 0;
    }

    /// Iterates over `(bucket, slot, key, value)` of all stored records.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &[u8], &[u8])> + '_ {
        (0..self.active_count())
            .filter(|&position| self.occupied.get(position))
            .map(|position| {
                (
                    position % self.config.num_buckets,
                    position / self.config.num_buckets,
                    self.records.key(position),
                    self.records.value(position),
                )
            })
    }

    /// Panics if any internal invariant is violated.
    pub fn check(&self) {
        assert!(self.active_slots_per_bucket >= self.config.initial_slots_per_bucket);
        assert!(self.active_slots_per_bucket <= self.config.slots_per_bucket);
        assert_eq!(self.occupied.len(), self.max_count());
        assert_eq!(self.records.slots(), self.max_count());
        assert_eq!(self.occupied.count_ones(), self.len);
        for position in self.active_count()..self.max_count() {
            assert!(!self.occupied.get(position), "occupied slot outside usable range");
        }
        for position in 0..self.max_count() {
            if !self.occupied.get(position) {
                assert!(self.records.key(position).iter().all(|&byte| byte == 0));
                assert!(self.records.value(position).iter().all(|&byte| byte == 0));
            }
        }
        for (bucket, slot, key, _) in self.iter() {
            assert_eq!(self.bucket_of(key), bucket, "record stored in the wrong bucket");
            assert_eq!(self.find(key), Some((bucket, slot)), "duplicate key in bucket");
        }
    }
}
