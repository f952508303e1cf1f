//! Sizing knobs for [`crate::WorkerPool`] (spec.md §4.6).

/// Topology for a [`crate::WorkerPool`].
#[derive(Debug, Clone, Copy)]
pub struct WorkerPoolConfig {
    /// Number of worker tasks.
    pub pool_size: usize,
    /// Number of shard queues; must be `<= pool_size`. Defaults to
    /// `pool_size` (one shard per worker) when built via
    /// [`WorkerPoolConfig::new`].
    pub shard_count: usize,
    /// Bound on the ingress queue. Each shard queue is sized
    /// `ceil(ingress_capacity / shard_count)`.
    pub ingress_capacity: usize,
}

impl WorkerPoolConfig {
    #[must_use]
    pub fn new(pool_size: usize, ingress_capacity: usize) -> Self {
        Self {
            pool_size,
            shard_count: pool_size,
            ingress_capacity,
        }
    }

    #[must_use]
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Per-shard channel capacity: `ceil(ingress_capacity / shard_count)`,
    /// floored at 1.
    #[must_use]
    pub fn per_shard_capacity(&self) -> usize {
        if self.shard_count == 0 {
            return self.ingress_capacity.max(1);
        }
        self.ingress_capacity.div_ceil(self.shard_count).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_one_shard_per_worker() {
        let config = WorkerPoolConfig::new(4, 100);
        assert_eq!(config.shard_count, 4);
    }

    #[test]
    fn per_shard_capacity_rounds_up() {
        let config = WorkerPoolConfig::new(4, 10).with_shard_count(3);
        assert_eq!(config.per_shard_capacity(), 4);
    }

    #[test]
    fn per_shard_capacity_floors_at_one() {
        let config = WorkerPoolConfig::new(4, 0);
        assert_eq!(config.per_shard_capacity(), 1);
    }
}
