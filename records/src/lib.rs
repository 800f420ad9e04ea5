//! Storage substrate shared by the bytetab hash table engines.
//!
//! Everything in here works on opaque fixed-width byte records. A table is created for a given
//! [`RecordLayout`] and afterwards only accepts keys and values of exactly those widths. Keys are
//! compared and hashed byte-wise, so a key that is itself a pointer to out-of-band data is
//! compared by the pointer bytes and not by what it points to.
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

mod bitmap;
mod error;
mod layout;
mod record_array;
mod table;

pub use bitmap::OccupancyBitmap;
pub use error::TableError;
pub use layout::RecordLayout;
pub use record_array::RecordArray;
pub use table::{ByteTable, InsertOutcome, TableStats};
