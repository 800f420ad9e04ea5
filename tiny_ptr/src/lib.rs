//! A dereference table handing out tiny pointers to fixed-width byte records.
//!
//! A tiny pointer names the location of a record by a table selector, a bucket index and a slot
//! within that bucket, instead of a full index into the key space. The [`DerefTable`] stores its
//! records in two bucketized [`LoadBalancingTable`]s: a primary table with few large buckets that
//! is filled to a high load factor, and a sparser secondary table with many small buckets that
//! catches the records whose primary bucket overflowed. The bucket and slot sizes follow from the
//! maximum capacity and a sparsity parameter, see [`DerefTableConfig::for_max_capacity`].
//!
//! Both tables allocate storage for their maximum capacity up front and only grow the number of
//! slots per bucket that may be used. Records never move, so a pointer stays valid until its
//! record is deleted or the table is reset.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod config;
mod deref_table;
mod load_balancing;

#[cfg(test)]
mod test_table;

pub use bytetab_records::{ByteTable, InsertOutcome, RecordLayout, TableError, TableStats};
pub use config::{sparsity, DerefTableConfig, LoadBalancingConfig, DEFAULT_MAX_CAPACITY};
pub use deref_table::{DerefTable, TableId, TinyPointer};
pub use load_balancing::LoadBalancingTable;
