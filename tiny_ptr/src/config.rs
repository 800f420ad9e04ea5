use bytetab_records::TableError;

/// Maximum capacity used by [`DerefTableConfig::default`].
pub const DEFAULT_MAX_CAPACITY: usize = 1 << 16;

const DEFAULT_PRIMARY_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
const DEFAULT_SECONDARY_SEED: u64 = 0xc2b2_ae3d_27d4_eb4f;

const MIN_PRIMARY_SLOTS_PER_BUCKET: usize = 4;
const MAX_PRIMARY_SLOTS_PER_BUCKET: usize = 1024;
const MIN_SECONDARY_SLOTS_PER_BUCKET: usize = 2;

/// Shape of a single [`LoadBalancingTable`][crate::LoadBalancingTable].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadBalancingConfig {
    /// Number of buckets a key can hash to. Fixed for the lifetime of the table.
    pub num_buckets: usize,
    /// Maximum number of slots per bucket.
    pub slots_per_bucket: usize,
    /// Number of usable slots per bucket after creation and after a reset.
    pub initial_slots_per_bucket: usize,
    /// Seed of the hash function selecting a key's bucket.
    pub seed: u64,
}

impl LoadBalancingConfig {
    /// Creates a configuration that starts with a quarter of each bucket usable.
    pub fn new(num_buckets: usize, slots_per_bucket: usize, seed: u64) -> Self {
        Self {
            num_buckets,
            slots_per_bucket,
            initial_slots_per_bucket: (slots_per_bucket / 4).max(1),
            seed,
        }
    }

    /// Returns the number of slots reserved for the table.
    pub fn max_count(&self) -> usize {
        self.num_buckets * self.slots_per_bucket
    }

    /// Returns the number of bits needed to address a slot of the table.
    pub fn pointer_bits(&self) -> u32 {
        ceil_log2(self.num_buckets) + ceil_log2(self.slots_per_bucket)
    }

    pub(crate) fn validate(&self) -> Result<(), TableError> {
        if self.num_buckets == 0 || self.num_buckets > u32::MAX as usize {
            return Err(TableError::InvalidConfig(
                "num_buckets must be in 1..=u32::MAX",
            ));
        }
        if self.slots_per_bucket == 0 || self.slots_per_bucket > u16::MAX as usize {
            return Err(TableError::InvalidConfig(
                "slots_per_bucket must be in 1..=u16::MAX",
            ));
        }
        if self.initial_slots_per_bucket == 0
            || self.initial_slots_per_bucket > self.slots_per_bucket
        {
            return Err(TableError::InvalidConfig(
                "initial_slots_per_bucket must be in 1..=slots_per_bucket",
            ));
        }
        if self.num_buckets.checked_mul(self.slots_per_bucket).is_none() {
            return Err(TableError::InvalidConfig("table size overflows"));
        }
        Ok(())
    }
}

/// Configuration of both tables of a [`DerefTable`][crate::DerefTable].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerefTableConfig {
    /// The densely filled table with large buckets that is tried first.
    pub primary: LoadBalancingConfig,
    /// The sparse table with small buckets taking primary overflow.
    pub secondary: LoadBalancingConfig,
}

impl Default for DerefTableConfig {
    fn default() -> Self {
        Self::for_max_capacity(DEFAULT_MAX_CAPACITY)
    }
}

/// Returns the sparsity parameter `δ = 1 / log2(log2(max_capacity))`, capped at `1/2`.
pub fn sparsity(max_capacity: usize) -> f64 {
    let log_log = (max_capacity.max(2) as f64).log2().log2();
    1.0 / log_log.max(2.0)
}

fn ceil_log2(n: usize) -> u32 {
    n.max(1).next_power_of_two().trailing_zeros()
}

impl DerefTableConfig {
    /// Derives bucket shapes for tables of up to `max_capacity` records each.
    ///
    /// With sparsity `δ` from [`sparsity`], primary buckets hold `⌈δ⁻² · log2(1/δ)⌉` slots and
    /// secondary buckets hold `⌈log2(log2(max_capacity))⌉` slots. Both tables get enough buckets
    /// to reserve at least `max_capacity` slots.
    pub fn for_max_capacity(max_capacity: usize) -> Self {
        let delta = sparsity(max_capacity);
        let primary_slots = ((delta.powi(-2) * (1.0 / delta).log2()).ceil() as usize)
            .clamp(MIN_PRIMARY_SLOTS_PER_BUCKET, MAX_PRIMARY_SLOTS_PER_BUCKET);
        let secondary_slots = ((max_capacity.max(2) as f64).log2().log2().ceil() as usize)
            .max(MIN_SECONDARY_SLOTS_PER_BUCKET);

        Self {
            primary: LoadBalancingConfig::new(
                max_capacity.div_ceil(primary_slots).max(1),
                primary_slots,
                DEFAULT_PRIMARY_SEED,
            ),
            secondary: LoadBalancingConfig::new(
                max_capacity.div_ceil(secondary_slots).max(1),
                secondary_slots,
                DEFAULT_SECONDARY_SEED,
            ),
        }
    }

    /// Replaces the hash seeds of both tables.
    pub fn with_seeds(mut self, primary: u64, secondary: u64) -> Self {
        self.primary.seed = primary;
        self.secondary.seed = secondary;
        self
    }

    /// Returns the number of bits of a tiny pointer for this configuration.
    ///
    /// This is one bit for the table selector plus the larger of the two tables' bucket and
    /// slot index widths.
    pub fn pointer_bits(&self) -> u32 {
        1 + self.primary.pointer_bits().max(self.secondary.pointer_bits())
    }
}
