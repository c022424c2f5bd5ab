use crate::{Error, Result};
use core::time::Duration;

/// Configuration for an [`IdAllocator`].
///
/// All values are fixed for the allocator's lifetime; there is no dynamic
/// reconfiguration. Defaults mirror the original deployment.
///
/// [`IdAllocator`]: crate::IdAllocator
#[derive(Clone, Debug)]
pub struct AllocatorConfig {
    /// Namespace for the backing counter (one independent ID stream per key).
    pub key_prefix: String,
    /// Sequence numbers reserved per protocol round trip. Also the capacity
    /// of the ID buffer.
    pub reserve_count: u64,
    /// Number of background reservation threads.
    pub producer_concurrency: usize,
    /// Fixed sleep between failed reservation attempts.
    pub retry_backoff: Duration,
    /// Consecutive failures tolerated per thread before the allocator
    /// fail-stops.
    pub max_retries: u32,
    /// How often `get_id` re-checks readiness before the first reservation
    /// lands.
    pub ready_poll_interval: Duration,
    /// Bounded wait for an ID once the allocator is ready.
    pub pop_timeout: Duration,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            key_prefix: "outgoing".to_owned(),
            reserve_count: 100,
            producer_concurrency: 1,
            retry_backoff: Duration::from_millis(200),
            max_retries: 3,
            ready_poll_interval: Duration::from_millis(200),
            pop_timeout: Duration::from_secs(1),
        }
    }
}

impl AllocatorConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.key_prefix.is_empty() {
            return Err(invalid("key_prefix must be non-empty"));
        }
        if self.reserve_count == 0 {
            return Err(invalid("reserve_count must be positive"));
        }
        if usize::try_from(self.reserve_count).is_err() {
            return Err(invalid("reserve_count exceeds the addressable buffer capacity"));
        }
        if self.producer_concurrency == 0 {
            return Err(invalid("producer_concurrency must be positive"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> Error {
    Error::InvalidConfig {
        reason: reason.to_owned(),
    }
}
