use bytetab_records::TableError;

/// Largest capacity a [`RobinHoodTable`][crate::RobinHoodTable] grows to.
///
/// Probe distances are stored as `u32` and are always smaller than the capacity, so this bound
/// keeps every probe distance representable.
pub const MAX_CAPACITY: usize = 1 << 31;

/// Sizing parameters of a [`RobinHoodTable`][crate::RobinHoodTable].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobinHoodConfig {
    /// Capacity of a newly created or reset table, rounded up to a power of two.
    pub initial_capacity: usize,
    /// The table grows before an insertion would make `len > capacity * max_load_factor`.
    ///
    /// Must be in `(0, 1]`.
    pub max_load_factor: f64,
}

impl Default for RobinHoodConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 8,
            max_load_factor: 0.5,
        }
    }
}

impl RobinHoodConfig {
    /// Checks the parameters and returns the power of two initial capacity.
    pub(crate) fn validated_capacity(&self) -> Result<usize, TableError> {
        if !(self.max_load_factor > 0.0 && self.max_load_factor <= 1.0) {
            return Err(TableError::InvalidConfig(
                "max_load_factor must be in (0, 1]",
            ));
        }
        if self.initial_capacity > MAX_CAPACITY {
            return Err(TableError::InvalidConfig(
                "initial_capacity exceeds the maximum capacity",
            ));
        }
        Ok(self.initial_capacity.max(1).next_power_of_two())
    }

    /// Returns whether `len` records fit into `capacity` slots under the load factor.
    #[inline(always)]
    pub(crate) fn fits(&self, len: usize, capacity: usize) -> bool {
        len as f64 <= capacity as f64 * self.max_load_factor
    }
}
