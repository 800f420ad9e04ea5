use std::fmt;

use bytetab_records::{ByteTable, InsertOutcome, RecordLayout, TableError, TableStats};

use crate::{DerefTableConfig, LoadBalancingTable};

/// Selects one of the two tables of a [`DerefTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    /// The densely filled table with large buckets.
    Primary,
    /// The sparse overflow table with small buckets.
    Secondary,
}

impl TableId {
    /// Both tables in the order they are tried.
    pub const ALL: [TableId; 2] = [TableId::Primary, TableId::Secondary];
}

/// Compact location of a record in a [`DerefTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TinyPointer {
    table: TableId,
    bucket: u32,
    slot: u16,
}

impl TinyPointer {
    /// Creates a pointer to a slot of a bucket of one of the tables.
    pub fn new(table: TableId, bucket: u32, slot: u16) -> Self {
        Self {
            table,
            bucket,
            slot,
        }
    }

    /// Returns the table the pointer refers to.
    #[inline(always)]
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Returns the bucket index within the table.
    #[inline(always)]
    pub fn bucket(&self) -> usize {
        self.bucket as usize
    }

    /// Returns the slot index within the bucket.
    #[inline(always)]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

impl fmt::Display for TinyPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = match self.table {
            TableId::Primary => 'P',
            TableId::Secondary => 'S',
        };
        write!(f, "{table}:{}:{}", self.bucket, self.slot)
    }
}

/// A hash table for fixed-width byte records that returns [`TinyPointer`]s.
///
/// Insertion tries the key's bucket in the primary table, doubling the primary table's usable
/// slots once if that bucket is full, and then does the same in the secondary table. Records
/// never move, so a pointer returned by [`insert`][Self::insert] can be dereferenced with
/// [`get`][Self::get] in constant time until the record is deleted or the table is reset.
///
/// The keyed operations [`lookup`][Self::lookup] and [`delete`][Self::delete] do not need a
/// pointer and locate the key by rehashing it against both tables.
pub struct DerefTable {
    primary: LoadBalancingTable,
    secondary: LoadBalancingTable,
}

impl fmt::Debug for DerefTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerefTable")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .finish()
    }
}

impl DerefTable {
    /// Creates an empty table for keys of `key_size` and values of `value_size` bytes using the
    /// default configuration.
    pub fn create(key_size: usize, value_size: usize) -> Result<Self, TableError> {
        Self::with_config(
            RecordLayout::new(key_size, value_size)?,
            DerefTableConfig::default(),
        )
    }

    /// Creates an empty table sized for up to `max_capacity` records per table.
    pub fn with_max_capacity(layout: RecordLayout, max_capacity: usize) -> Result<Self, TableError> {
        Self::with_config(layout, DerefTableConfig::for_max_capacity(max_capacity))
    }

    /// Creates an empty table with the given layout and configuration.
    ///
    /// This allocates storage for the maximum capacity of both tables.
    pub fn with_config(layout: RecordLayout, config: DerefTableConfig) -> Result<Self, TableError> {
        Ok(Self {
            primary: LoadBalancingTable::with_config(layout, config.primary)?,
            secondary: LoadBalancingTable::with_config(layout, config.secondary)?,
        })
    }

    /// Returns the layout of the stored records.
    pub fn layout(&self) -> RecordLayout {
        self.primary.layout()
    }

    /// Returns the configuration of both tables.
    pub fn config(&self) -> DerefTableConfig {
        DerefTableConfig {
            primary: *self.primary.config(),
            secondary: *self.secondary.config(),
        }
    }

    /// Returns the primary table.
    pub fn primary(&self) -> &LoadBalancingTable {
        &self.primary
    }

    /// Returns the secondary table.
    pub fn secondary(&self) -> &LoadBalancingTable {
        &self.secondary
    }

    /// Returns one of the two tables.
    pub fn table(&self, table: TableId) -> &LoadBalancingTable {
        match table {
            TableId::Primary => &self.primary,
            TableId::Secondary => &self.secondary,
        }
    }

    fn table_mut(&mut self, table: TableId) -> &mut LoadBalancingTable {
        match table {
            TableId::Primary => &mut self.primary,
            TableId::Secondary => &mut self.secondary,
        }
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    /// Returns `true` when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of currently usable slots of both tables.
    pub fn active_capacity(&self) -> usize {
        self.primary.active_count() + self.secondary.active_count()
    }

    /// Returns the number of slots reserved by both tables.
    pub fn max_capacity(&self) -> usize {
        self.primary.max_count() + self.secondary.max_count()
    }

    /// Returns the memory used by the usable part of both tables in bytes.
    pub fn active_memory_usage(&self) -> usize {
        self.primary.active_memory_usage() + self.secondary.active_memory_usage()
    }

    /// Returns the number of bits a tiny pointer of this table needs.
    pub fn pointer_bits(&self) -> u32 {
        self.config().pointer_bits()
    }

    fn pointer(table: TableId, bucket: usize, slot: usize) -> TinyPointer {
        // Both indices are bounded by the validated table configuration.
        TinyPointer::new(table, bucket as u32, slot as u16)
    }

    /// Returns the pointer to the record stored for `key`, rehashing it against both tables.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn find(&self, key: &[u8]) -> Option<TinyPointer> {
        self.layout().check_key(key);
        TableId::ALL.into_iter().find_map(|table| {
            self.table(table)
                .find(key)
                .map(|(bucket, slot)| Self::pointer(table, bucket, slot))
        })
    }

    /// Stores a record, overwriting the value if the key is already present.
    ///
    /// Fails with [`TableError::CapacityExceeded`] if the key's buckets in both tables are full
    /// and cannot grow any further. No record is stored in that case.
    ///
    /// # Panics
    /// Panics if `key` or `value` do not match the table's layout.
    pub fn insert(
        &mut self,
        key: &[u8],
        value: &[u8],
    ) -> Result<InsertOutcome<TinyPointer>, TableError> {
        self.layout().check_record(key, value);

        for table_id in TableId::ALL {
            if let Some((bucket, slot)) = self.table_mut(table_id).update(key, value) {
                return Ok(InsertOutcome::Updated(Self::pointer(table_id, bucket, slot)));
            }
        }

        for table_id in TableId::ALL {
            let table = self.table_mut(table_id);
            let bucket = table.bucket_of(key);
            let slot = match table.place(bucket, key, value) {
                Some(slot) => Some(slot),
                None if table.grow_active() => table.place(bucket, key, value),
                None => None,
            };
            if let Some(slot) = slot {
                return Ok(InsertOutcome::Inserted(Self::pointer(table_id, bucket, slot)));
            }
        }

        log::warn!(
            "dereference table full: no free slot for key in either table ({} records)",
            self.len()
        );
        Err(TableError::CapacityExceeded)
    }

    /// Returns the key and value stored at the location `ptr` refers to, if it is occupied.
    ///
    /// This takes constant time. It does not verify that the record is the one the pointer was
    /// issued for: after the record was deleted, a later insertion may reuse its slot.
    pub fn get(&self, ptr: TinyPointer) -> Option<(&[u8], &[u8])> {
        self.table(ptr.table()).get(ptr.bucket(), ptr.slot())
    }

    /// Returns the value stored for `key`, rehashing it against both tables.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn lookup(&self, key: &[u8]) -> Option<&[u8]> {
        let ptr = self.find(key)?;
        self.get(ptr).map(|(_, value)| value)
    }

    /// Returns the value stored for `key`, trying the location `ptr` refers to first.
    ///
    /// If the pointer is stale or belongs to another key, this falls back to
    /// [`lookup`][Self::lookup].
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn lookup_at(&self, key: &[u8], ptr: TinyPointer) -> Option<&[u8]> {
        self.layout().check_key(key);
        match self.get(ptr) {
            Some((stored_key, value)) if stored_key == key => Some(value),
            _ => self.lookup(key),
        }
    }

    /// Removes the record stored for `key`, returning whether there was one.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        match self.find(key) {
            Some(ptr) => self.table_mut(ptr.table()).remove_at(ptr.bucket(), ptr.slot()),
            None => false,
        }
    }

    /// Removes the record stored for `key`, trying the location `ptr` refers to first.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    pub fn delete_at(&mut self, key: &[u8], ptr: TinyPointer) -> bool {
        self.layout().check_key(key);
        match self.get(ptr) {
            Some((stored_key, _)) if stored_key == key => self
                .table_mut(ptr.table())
                .remove_at(ptr.bucket(), ptr.slot()),
            _ => self.delete(key),
        }
    }

    /// Removes all records and shrinks both tables back to their initial usable size.
    ///
    /// Reserved storage is kept. All previously returned pointers become invalid.
    pub fn reset(&mut self) {
        log::trace!("resetting dereference table with {} records", self.len());
        self.primary.reset();
        self.secondary.reset();
    }

    /// Iterates over all stored records as `(pointer, key, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (TinyPointer, &[u8], &[u8])> + '_ {
        TableId::ALL.into_iter().flat_map(move |table| {
            self.table(table)
                .iter()
                .map(move |(bucket, slot, key, value)| {
                    (Self::pointer(table, bucket, slot), key, value)
                })
        })
    }

    /// Returns the size and memory statistics of the table.
    pub fn stats(&self) -> TableStats {
        TableStats {
            active_capacity: self.active_capacity(),
            occupied: self.len(),
            memory_bytes: self.active_memory_usage(),
        }
    }

    /// Panics if any internal invariant is violated.
    pub fn check(&self) {
        self.primary.check();
        self.secondary.check();
        for (_, _, key, _) in self.secondary.iter() {
            assert_eq!(self.primary.find(key), None, "key stored in both tables");
        }
    }
}

impl ByteTable for DerefTable {
    type Location = TinyPointer;

    fn layout(&self) -> RecordLayout {
        DerefTable::layout(self)
    }

    fn insert(
        &mut self,
        key: &[u8],
        value: &[u8],
    ) -> Result<InsertOutcome<TinyPointer>, TableError> {
        DerefTable::insert(self, key, value)
    }

    fn lookup(&self, key: &[u8]) -> Option<&[u8]> {
        DerefTable::lookup(self, key)
    }

    fn delete(&mut self, key: &[u8]) -> bool {
        DerefTable::delete(self, key)
    }

    fn reset(&mut self) {
        DerefTable::reset(self)
    }

    fn len(&self) -> usize {
        DerefTable::len(self)
    }

    fn stats(&self) -> TableStats {
        DerefTable::stats(self)
    }
}
