use crate::{
    AllocatorConfig, AllocatorState, Error, RangeProducer, Result, format, state::SharedState,
};
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

/// How often a producer blocked on a full buffer re-checks the stop signal.
const PUSH_POLL: Duration = Duration::from_millis(200);

/// Segmented unique-ID allocator.
///
/// [`start`] spawns `producer_concurrency` background reservation threads.
/// Each thread independently reserves ranges from the store through its
/// [`RangeProducer`], expands them into date-prefixed ID strings, and pushes
/// them into a bounded buffer shared with all callers of [`get_id`]. A full
/// buffer blocks the producer side (backpressure); a slow producer surfaces
/// to callers as a bounded wait.
///
/// Reservation failures are retried with a fixed backoff. More than
/// `max_retries` consecutive failures in any one thread stops the whole
/// allocator: a deliberate fail-stop that trades availability for bounded
/// resource use under a sustained store outage. Callers observe this through
/// [`health`] and through `get_id` returning [`Error::Stopped`].
///
/// Ordering: each thread pushes its range in strictly increasing sequence
/// order, but ranges from different threads interleave. Consumers must not
/// assume global order.
///
/// [`start`]: IdAllocator::start
/// [`get_id`]: IdAllocator::get_id
/// [`health`]: IdAllocator::health
pub struct IdAllocator {
    ids: Receiver<String>,
    state: Arc<SharedState>,
    workers: Vec<JoinHandle<()>>,
    ready_poll_interval: Duration,
    pop_timeout: Duration,
}

impl IdAllocator {
    /// Validates `config` and starts the background reservation threads.
    ///
    /// Teardown is the caller's responsibility via [`IdAllocator::shutdown`];
    /// merely dropping the handle stops the threads but does not join them.
    pub fn start<P>(producer: P, config: AllocatorConfig) -> Result<Self>
    where
        P: RangeProducer + 'static,
    {
        config.validate()?;

        let (tx, rx) = bounded(config.reserve_count as usize);
        let state = Arc::new(SharedState::new());
        let producer = Arc::new(producer);

        let workers = (0..config.producer_concurrency)
            .map(|worker| {
                let tx = tx.clone();
                let state = Arc::clone(&state);
                let producer = Arc::clone(&producer);
                let config = config.clone();
                thread::spawn(move || reservation_loop(worker, &*producer, &tx, &state, &config))
            })
            .collect();
        // Only the workers hold senders: once every loop exits, the channel
        // disconnects and consumers see `Stopped` instead of hanging.
        drop(tx);

        Ok(Self {
            ids: rx,
            state,
            workers,
            ready_poll_interval: config.ready_poll_interval,
            pop_timeout: config.pop_timeout,
        })
    }

    /// Pops one generated ID.
    ///
    /// Blocks (polling at `ready_poll_interval`) until the first reservation
    /// has succeeded, then waits up to `pop_timeout` for a buffered ID. Safe
    /// for arbitrarily many concurrent callers; no two callers ever receive
    /// the same buffer slot.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] if no ID arrived within `pop_timeout`.
    ///   Production has stalled but may recover; retrying is fine.
    /// - [`Error::Stopped`] once the allocator has reached its terminal
    ///   state.
    pub fn get_id(&self) -> Result<String> {
        loop {
            match self.state.load() {
                AllocatorState::Starting => thread::sleep(self.ready_poll_interval),
                AllocatorState::Ready => break,
                AllocatorState::Stopped => return Err(Error::Stopped),
            }
        }

        match self.ids.recv_timeout(self.pop_timeout) {
            Ok(id) => Ok(id),
            Err(RecvTimeoutError::Timeout) => Err(Error::Unavailable),
            Err(RecvTimeoutError::Disconnected) => Err(Error::Stopped),
        }
    }

    /// Current lifecycle state, as an observable health signal.
    pub fn health(&self) -> AllocatorState {
        self.state.load()
    }

    /// Stops every reservation thread and joins them.
    ///
    /// Buffered-but-unconsumed IDs are discarded; the reserved-but-unused
    /// tail of the counter range is simply never handed out.
    pub fn shutdown(mut self) {
        self.state.stop();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("reservation worker panicked during shutdown");
            }
        }
    }
}

impl Drop for IdAllocator {
    fn drop(&mut self) {
        // Dropping without `shutdown` still signals the loops; they observe
        // the stop state (or the disconnected buffer) and exit detached.
        self.state.stop();
    }
}

/// One background reservation cycle, run per worker thread until stopped.
fn reservation_loop<P: RangeProducer>(
    worker: usize,
    producer: &P,
    ids: &Sender<String>,
    state: &SharedState,
    config: &AllocatorConfig,
) {
    tracing::trace!(worker, "reservation worker started");
    let mut retries = 0u32;

    while !state.is_stopped() {
        let outcome = producer
            .reserve_range(&config.key_prefix, config.reserve_count)
            .and_then(|range| {
                format::date_prefix(range.server_time())
                    .map(|prefix| (range, prefix))
                    .ok_or_else(|| Error::MalformedReply {
                        payload: format!(
                            "server_time {} is not a representable date",
                            range.server_time()
                        ),
                    })
            });

        let (range, prefix) = match outcome {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(worker, error = %e, "range reservation failed");
                thread::sleep(config.retry_backoff);
                retries += 1;
                if retries > config.max_retries {
                    // Fail-stop: one exhausted worker stops the whole
                    // allocator, not just itself.
                    tracing::error!(worker, retries, "retry budget exhausted, stopping allocator");
                    state.stop();
                    return;
                }
                continue;
            }
        };

        retries = 0;
        state.mark_ready();

        for seq in range.sequences(config.reserve_count) {
            if !push_id(ids, format::format_id(&prefix, seq), state) {
                tracing::trace!(worker, "reservation worker exiting mid-range");
                return;
            }
        }
    }

    tracing::trace!(worker, "reservation worker stopped");
}

/// Blocking push with backpressure.
///
/// A full buffer stalls the caller, never drops or overwrites. The wait is
/// chopped into [`PUSH_POLL`] slices so a blocked producer still observes
/// shutdown. Returns `false` when the allocator stopped or every consumer
/// handle disappeared.
fn push_id(ids: &Sender<String>, id: String, state: &SharedState) -> bool {
    let mut id = id;
    loop {
        match ids.send_timeout(id, PUSH_POLL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => {
                if state.is_stopped() {
                    return false;
                }
                id = returned;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
