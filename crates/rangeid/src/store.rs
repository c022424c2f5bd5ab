use crate::Result;
use core::fmt;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

/// Server-side key derivation: the counter backing reservation key `k` lives
/// under `"counter:" + k`.
pub const COUNTER_KEY_PREFIX: &str = "counter:";

/// One element of a raw reservation reply.
///
/// Stores speak in weakly typed replies; keeping that shape at the boundary
/// means structurally invalid results (wrong arity, non-numeric fields) are
/// representable and can be validated and logged by the producer instead of
/// silently coerced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyValue {
    Int(i64),
    Text(String),
    Nil,
}

impl fmt::Display for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Nil => write!(f, "nil"),
        }
    }
}

/// A clock whose readings are authoritative for date-prefix assignment.
///
/// The store's clock, never the caller's, decides which calendar day an ID
/// belongs to, so caller clock skew cannot split one range across two
/// prefixes.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn current_secs(&self) -> i64;
}

/// Wall-clock [`TimeSource`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH")
            .as_secs() as i64
    }
}

/// The atomic range-reservation primitive.
///
/// `reserve` must execute as a single indivisible operation: increment the
/// integer counter stored under [`COUNTER_KEY_PREFIX`]` + key` by `count` and
/// read the store's current time, together, returning the 2-element ordered
/// reply `[server_time_secs, new_counter_max]`.
///
/// A separate get-counter / get-time / set-counter sequence is not a valid
/// implementation: interleaved callers would observe overlapping ranges. A
/// failed call must not have advanced the counter.
pub trait ReservationStore: Send + Sync {
    fn reserve(&self, key: &str, count: u64) -> Result<Vec<ReplyValue>>;
}

impl<S: ReservationStore + ?Sized> ReservationStore for Arc<S> {
    fn reserve(&self, key: &str, count: u64) -> Result<Vec<ReplyValue>> {
        (**self).reserve(key, count)
    }
}

/// In-process [`ReservationStore`] backed by a mutex-guarded counter map.
///
/// The reference implementation: the lock is the atomic unit, so the
/// counter advance and the timestamp read cannot interleave with another
/// caller. Backs the test suite and the load harness; production deployments
/// substitute a driver for their real counter service.
pub struct MemoryStore {
    counters: Mutex<HashMap<String, u64>>,
    clock: Box<dyn TimeSource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// A store with an injected clock, for deterministic date prefixes.
    pub fn with_clock<T: TimeSource + 'static>(clock: T) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            clock: Box::new(clock),
        }
    }

    /// Current counter value for a reservation key. Zero if never reserved.
    pub fn counter(&self, key: &str) -> Result<u64> {
        Ok(self
            .counters
            .lock()?
            .get(&counter_key(key))
            .copied()
            .unwrap_or(0))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn counter_key(key: &str) -> String {
    format!("{COUNTER_KEY_PREFIX}{key}")
}

impl ReservationStore for MemoryStore {
    fn reserve(&self, key: &str, count: u64) -> Result<Vec<ReplyValue>> {
        let mut counters = self.counters.lock()?;
        let slot = counters.entry(counter_key(key)).or_insert(0);
        *slot += count;
        // Timestamp read under the same lock: one atomic unit.
        Ok(vec![
            ReplyValue::Int(self.clock.current_secs()),
            ReplyValue::Int(*slot as i64),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    struct MockTime {
        secs: i64,
    }

    impl TimeSource for MockTime {
        fn current_secs(&self) -> i64 {
            self.secs
        }
    }

    #[test]
    fn reserve_advances_counter_and_reports_new_max() {
        let store = MemoryStore::with_clock(MockTime { secs: 42 });

        let reply = store.reserve("outgoing", 100).unwrap();
        assert_eq!(reply, vec![ReplyValue::Int(42), ReplyValue::Int(100)]);

        let reply = store.reserve("outgoing", 100).unwrap();
        assert_eq!(reply, vec![ReplyValue::Int(42), ReplyValue::Int(200)]);

        assert_eq!(store.counter("outgoing").unwrap(), 200);
    }

    #[test]
    fn keys_namespace_independent_counters() {
        let store = MemoryStore::with_clock(MockTime { secs: 0 });
        store.reserve("outgoing", 10).unwrap();
        store.reserve("incoming", 3).unwrap();

        assert_eq!(store.counter("outgoing").unwrap(), 10);
        assert_eq!(store.counter("incoming").unwrap(), 3);
        assert_eq!(store.counter("other").unwrap(), 0);
    }

    #[test]
    fn concurrent_reservations_are_disjoint() {
        let store = Arc::new(MemoryStore::with_clock(MockTime { secs: 0 }));
        const THREADS: usize = 8;
        const ROUNDS: usize = 50;
        const COUNT: u64 = 10;

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut maxes = Vec::with_capacity(ROUNDS);
                    for _ in 0..ROUNDS {
                        let reply = store.reserve("outgoing", COUNT).unwrap();
                        let &ReplyValue::Int(max) = &reply[1] else {
                            panic!("non-numeric max in reply");
                        };
                        maxes.push(max);
                    }
                    maxes
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for max in handle.join().unwrap() {
                // Every reply is a distinct multiple of the count: ranges
                // never overlap.
                assert_eq!(max as u64 % COUNT, 0);
                assert!(seen.insert(max), "overlapping range observed: {max}");
            }
        }
        assert_eq!(seen.len(), THREADS * ROUNDS);
        assert_eq!(
            store.counter("outgoing").unwrap(),
            (THREADS * ROUNDS) as u64 * COUNT
        );
    }
}
