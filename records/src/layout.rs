use crate::TableError;

/// Widths of the key and value records stored by a table.
///
/// A layout is fixed when a table is created and never changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    key_size: usize,
    value_size: usize,
}

impl RecordLayout {
    /// Creates a layout for keys of `key_size` bytes and values of `value_size` bytes.
    ///
    /// Keys must be at least one byte wide. Zero sized values are allowed and turn a table into a
    /// set of keys.
    pub fn new(key_size: usize, value_size: usize) -> Result<Self, TableError> {
        if key_size == 0 || key_size.checked_add(value_size).is_none() {
            return Err(TableError::InvalidLayout {
                key_size,
                value_size,
            });
        }
        Ok(Self {
            key_size,
            value_size,
        })
    }

    /// Width of a key in bytes.
    #[inline(always)]
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Width of a value in bytes.
    #[inline(always)]
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Combined width of a key and a value.
    #[inline(always)]
    pub fn record_size(&self) -> usize {
        self.key_size + self.value_size
    }

    /// Panics unless `key` and `value` match this layout.
    #[inline(always)]
    #[track_caller]
    pub fn check_record(&self, key: &[u8], value: &[u8]) {
        self.check_key(key);
        assert_eq!(
            value.len(),
            self.value_size,
            "value has {} bytes but the table stores {} byte values",
            value.len(),
            self.value_size
        );
    }

    /// Panics unless `key` matches this layout.
    #[inline(always)]
    #[track_caller]
    pub fn check_key(&self, key: &[u8]) {
        assert_eq!(
            key.len(),
            self.key_size,
            "key has {} bytes but the table stores {} byte keys",
            key.len(),
            self.key_size
        );
    }
}
