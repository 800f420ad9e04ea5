//! Hash tables for fixed-width byte records.
//!
//! This crate bundles the two table engines together with a typed front end:
//!
//! * [`robin_hood::RobinHoodTable`], an open addressing table that rehashes into a larger array
//!   when it fills up. Slot indices it returns are only valid until the next mutation.
//! * [`tiny_ptr::DerefTable`], a two level bucketized table that never moves records and returns
//!   [`TinyPointer`]s that stay valid until their record is deleted.
//!
//! Both implement [`ByteTable`], which works on byte slices whose widths are fixed by a
//! [`RecordLayout`]. [`TypedTable`] wraps either engine for keys and values that are plain old
//! data.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

pub use bytetab_records as records;
pub use bytetab_robin_hood as robin_hood;
pub use bytetab_tiny_ptr as tiny_ptr;
pub use bytetab_util as util;

pub use records::{ByteTable, InsertOutcome, RecordLayout, TableError, TableStats};
pub use robin_hood::RobinHoodTable;
pub use tiny_ptr::{DerefTable, TinyPointer};

pub mod typed;

pub use typed::{RobinHoodMap, TinyPointerMap, TypedTable};
