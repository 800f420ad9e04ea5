use std::fmt;

/// Failure cases for creating or inserting into a table.
///
/// Not finding a key is not an error; lookups return [`None`] and deletions return `false` in
/// that case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableError {
    /// Backing storage could not be allocated.
    ///
    /// When this is returned by a growing operation, the table is unchanged.
    AllocationFailed {
        /// Size of the allocation that failed.
        bytes: usize,
    },
    /// The table cannot hold any further records.
    CapacityExceeded,
    /// The requested record layout cannot be stored.
    InvalidLayout {
        /// The requested key width.
        key_size: usize,
        /// The requested value width.
        value_size: usize,
    },
    /// A configuration parameter is out of range.
    InvalidConfig(&'static str),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} bytes of table storage")
            }
            TableError::CapacityExceeded => write!(f, "table capacity exceeded"),
            TableError::InvalidLayout {
                key_size,
                value_size,
            } => write!(
                f,
                "invalid record layout (key size {key_size}, value size {value_size})"
            ),
            TableError::InvalidConfig(what) => write!(f, "invalid table configuration: {what}"),
        }
    }
}

impl std::error::Error for TableError {}
