use std::fmt;

use bytetab_util::fmt::ByteAmount;

use crate::{RecordLayout, TableError};

/// Result of a successful insertion.
///
/// Both variants carry the location at which the key is stored after the insertion. What a
/// location is, and how long it stays valid, depends on the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InsertOutcome<L> {
    /// The key was not present and a new record was stored.
    Inserted(L),
    /// The key was present and its value was overwritten.
    Updated(L),
}

impl<L> InsertOutcome<L> {
    /// Returns the location of the inserted or updated record.
    pub fn location(self) -> L {
        match self {
            InsertOutcome::Inserted(location) | InsertOutcome::Updated(location) => location,
        }
    }

    /// Returns `true` if a new record was stored.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// Size and memory statistics of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TableStats {
    /// Number of slots that can currently hold records without growing.
    pub active_capacity: usize,
    /// Number of stored records.
    pub occupied: usize,
    /// Memory used by the active part of the table in bytes.
    pub memory_bytes: usize,
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} slots occupied, {}",
            self.occupied,
            self.active_capacity,
            ByteAmount(self.memory_bytes)
        )
    }
}

/// The operations shared by all type-erased tables.
///
/// Keys and values are passed as byte slices of exactly the widths given by the table's
/// [`RecordLayout`]. Passing a slice of a different width is a bug in the caller and panics.
///
/// Dropping a table releases all of its storage.
pub trait ByteTable {
    /// Location token returned by insertions.
    type Location: Copy + fmt::Debug;

    /// Returns the layout of the stored records.
    fn layout(&self) -> RecordLayout;

    /// Stores a record, overwriting the value if the key is already present.
    ///
    /// # Panics
    /// Panics if `key` or `value` do not match the table's layout.
    fn insert(
        &mut self,
        key: &[u8],
        value: &[u8],
    ) -> Result<InsertOutcome<Self::Location>, TableError>;

    /// Returns the value stored for `key`.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    fn lookup(&self, key: &[u8]) -> Option<&[u8]>;

    /// Removes the record stored for `key`, returning whether there was one.
    ///
    /// # Panics
    /// Panics if `key` does not match the table's layout.
    fn delete(&mut self, key: &[u8]) -> bool;

    /// Removes all records without releasing storage.
    fn reset(&mut self);

    /// Returns the number of stored records.
    fn len(&self) -> usize;

    /// Returns `true` when no records are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns size and memory statistics.
    fn stats(&self) -> TableStats;
}
