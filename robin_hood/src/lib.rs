//! An open addressing hash table for fixed-width byte records using Robin Hood hashing.
//!
//! All records live in a single flat array of slots. Each occupied slot remembers its probe
//! distance, i.e. how far it sits from the slot its key hashes to. Insertion uses linear probing,
//! and whenever the probe passes a resident record that is closer to its home slot than the
//! incoming record, the two swap places and insertion continues with the displaced record. This
//! keeps probe distances along a chain non-decreasing, which lets lookups stop early.
//!
//! Deletion shifts the following records of the chain back by one slot instead of leaving
//! tombstones behind.
//!
//! The table doubles and fully rehashes when an insertion would exceed the configured load
//! factor. Slot indices returned by insertions are therefore only valid until the next mutating
//! operation.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod config;
mod table;

#[cfg(test)]
mod test_table;

pub use bytetab_records::{ByteTable, InsertOutcome, RecordLayout, TableError, TableStats};
pub use config::{RobinHoodConfig, MAX_CAPACITY};
pub use table::RobinHoodTable;
