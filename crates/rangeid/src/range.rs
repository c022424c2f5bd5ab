use core::ops::RangeInclusive;

/// Immutable descriptor of one reserved range.
///
/// Produced by a [`RangeProducer`] from a successful reservation and consumed
/// immediately by the allocator. `server_time` is store-authoritative (seconds
/// since the Unix epoch) so that date-prefix assignment is immune to caller
/// clock skew. `max` is the inclusive upper bound of the reserved integers;
/// the store contract guarantees it is monotonically non-decreasing per key
/// and that successive ranges are disjoint.
///
/// [`RangeProducer`]: crate::RangeProducer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeInfo {
    server_time: i64,
    max: u64,
}

impl RangeInfo {
    pub const fn new(server_time: i64, max: u64) -> Self {
        Self { server_time, max }
    }

    /// Seconds since the Unix epoch, as reported by the store's clock.
    pub const fn server_time(&self) -> i64 {
        self.server_time
    }

    /// Inclusive upper bound of the reserved integer range.
    pub const fn max(&self) -> u64 {
        self.max
    }

    /// The sequence numbers covered by a reservation of `count` integers:
    /// exactly `[max - count + 1, max]`.
    pub fn sequences(&self, count: u64) -> RangeInclusive<u64> {
        let start = self.max.saturating_sub(count.saturating_sub(1));
        start..=self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_cover_exactly_the_reserved_range() {
        let info = RangeInfo::new(1_700_000_000, 5);
        let seqs: Vec<u64> = info.sequences(5).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

        let info = RangeInfo::new(1_700_000_000, 200);
        assert_eq!(info.sequences(100), 101..=200);
    }

    #[test]
    fn sequences_single_element_range() {
        let info = RangeInfo::new(0, 7);
        assert_eq!(info.sequences(1), 7..=7);
    }

    #[test]
    fn sequences_saturate_instead_of_underflowing() {
        // A buggy store reporting max < count must not panic the allocator.
        let info = RangeInfo::new(0, 3);
        assert_eq!(info.sequences(10), 0..=3);
    }
}
