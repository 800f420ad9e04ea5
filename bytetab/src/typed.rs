//! Typed front end for the byte record tables.
use std::{fmt, marker::PhantomData, mem::size_of};

use bytemuck::{bytes_of, pod_read_unaligned, Pod};

use crate::{
    tiny_ptr::{self, DerefTableConfig},
    ByteTable, DerefTable, InsertOutcome, RecordLayout,
    RobinHoodTable, TableError, TableStats, TinyPointer,
};

/// A [`ByteTable`] storing keys of type `K` and values of type `V`.
///
/// Keys and values are stored as their in-memory bytes, so two keys are equal exactly when their
/// bytes are equal. Types with padding cannot be used as they are not [`Pod`].
pub struct TypedTable<K, V, T> {
    table: T,
    _phantom: PhantomData<fn(K) -> V>,
}

/// A typed [`RobinHoodTable`].
pub type RobinHoodMap<K, V> = TypedTable<K, V, RobinHoodTable>;

/// A typed [`DerefTable`].
pub type TinyPointerMap<K, V> = TypedTable<K, V, DerefTable>;

impl<K, V, T: ByteTable> fmt::Debug for TypedTable<K, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedTable")
            .field("layout", &self.table.layout())
            .field("len", &self.table.len())
            .finish()
    }
}

impl<K: Pod, V: Pod, T: ByteTable> TypedTable<K, V, T> {
    /// Returns the record layout matching `K` and `V`.
    pub fn layout() -> Result<RecordLayout, TableError> {
        RecordLayout::new(size_of::<K>(), size_of::<V>())
    }

    /// Wraps an existing table, which must be empty or hold records of type `K` and `V`.
    ///
    /// Fails with [`TableError::InvalidLayout`] if the table's layout does not match the types.
    pub fn from_table(table: T) -> Result<Self, TableError> {
        let layout = table.layout();
        if layout != Self::layout()? {
            return Err(TableError::InvalidLayout {
                key_size: layout.key_size(),
                value_size: layout.value_size(),
            });
        }
        Ok(Self {
            table,
            _phantom: PhantomData,
        })
    }

    /// Returns the wrapped table.
    pub fn inner(&self) -> &T {
        &self.table
    }

    /// Unwraps the table.
    pub fn into_inner(self) -> T {
        self.table
    }

    /// Stores `value` for `key`, overwriting any previous value.
    pub fn insert(&mut self, key: K, value: V) -> Result<InsertOutcome<T::Location>, TableError> {
        self.table.insert(bytes_of(&key), bytes_of(&value))
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.table.lookup(bytes_of(key)).map(pod_read_unaligned)
    }

    /// Returns `true` if a value is stored for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.table.lookup(bytes_of(key)).is_some()
    }

    /// Removes the record stored for `key`, returning whether there was one.
    pub fn remove(&mut self, key: &K) -> bool {
        self.table.delete(bytes_of(key))
    }

    /// Removes all records.
    pub fn reset(&mut self) {
        self.table.reset()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the size and memory statistics of the wrapped table.
    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }
}

impl<K: Pod, V: Pod> TypedTable<K, V, RobinHoodTable> {
    /// Creates an empty map using the default Robin Hood configuration.
    pub fn new() -> Result<Self, TableError> {
        Self::from_table(RobinHoodTable::create(size_of::<K>(), size_of::<V>())?)
    }

    /// Iterates over all stored records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.table
            .iter()
            .map(|(key, value)| (pod_read_unaligned(key), pod_read_unaligned(value)))
    }
}

impl<K: Pod, V: Pod> TypedTable<K, V, DerefTable> {
    /// Creates an empty map using the default tiny pointer configuration.
    pub fn new() -> Result<Self, TableError> {
        Self::with_max_capacity(tiny_ptr::DEFAULT_MAX_CAPACITY)
    }

    /// Creates an empty map sized for up to `max_capacity` records per table.
    pub fn with_max_capacity(max_capacity: usize) -> Result<Self, TableError> {
        Self::from_table(DerefTable::with_config(
            Self::layout()?,
            DerefTableConfig::for_max_capacity(max_capacity),
        )?)
    }

    /// Returns the record `ptr` refers to, if its slot is occupied.
    pub fn get_at(&self, ptr: TinyPointer) -> Option<(K, V)> {
        self.table
            .get(ptr)
            .map(|(key, value)| (pod_read_unaligned(key), pod_read_unaligned(value)))
    }

    /// Returns the value stored for `key`, trying the location `ptr` refers to first.
    pub fn get_with_hint(&self, key: &K, ptr: TinyPointer) -> Option<V> {
        self.table
            .lookup_at(bytes_of(key), ptr)
            .map(pod_read_unaligned)
    }

    /// Removes the record stored for `key`, trying the location `ptr` refers to first.
    pub fn remove_with_hint(&mut self, key: &K, ptr: TinyPointer) -> bool {
        self.table.delete_at(bytes_of(key), ptr)
    }

    /// Iterates over all stored records together with their pointers.
    pub fn iter(&self) -> impl Iterator<Item = (TinyPointer, K, V)> + '_ {
        self.table.iter().map(|(ptr, key, value)| {
            (ptr, pod_read_unaligned(key), pod_read_unaligned(value))
        })
    }
}
