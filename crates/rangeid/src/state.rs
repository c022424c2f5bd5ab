use core::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of an [`IdAllocator`].
///
/// `Stopped` is terminal and reachable only through explicit shutdown or an
/// exhausted retry budget; once entered, the allocator never recovers.
///
/// [`IdAllocator`]: crate::IdAllocator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AllocatorState {
    /// Reservation threads are running but none has succeeded yet.
    Starting = 0,
    /// At least one range reservation succeeded; IDs are flowing.
    Ready = 1,
    /// Terminal: shut down, or a reservation thread exhausted its retries.
    Stopped = 2,
}

/// Shared lifecycle container, one atomic word with CAS-guarded transitions.
///
/// Replaces ad-hoc `running`/`ready` booleans: `Starting -> Ready` is a
/// compare-and-swap so it can never resurrect a stopped allocator, and
/// `Stopped` wins every race.
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(AllocatorState::Starting as u8))
    }

    pub(crate) fn load(&self) -> AllocatorState {
        match self.0.load(Ordering::Acquire) {
            0 => AllocatorState::Starting,
            1 => AllocatorState::Ready,
            _ => AllocatorState::Stopped,
        }
    }

    /// `Starting -> Ready`. A no-op once ready or stopped.
    pub(crate) fn mark_ready(&self) {
        let _ = self.0.compare_exchange(
            AllocatorState::Starting as u8,
            AllocatorState::Ready as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Any state `-> Stopped` (terminal).
    pub(crate) fn stop(&self) {
        self.0.store(AllocatorState::Stopped as u8, Ordering::Release);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.load() == AllocatorState::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_starting() {
        let state = SharedState::new();
        assert_eq!(state.load(), AllocatorState::Starting);
        assert!(!state.is_stopped());
    }

    #[test]
    fn mark_ready_transitions_once() {
        let state = SharedState::new();
        state.mark_ready();
        assert_eq!(state.load(), AllocatorState::Ready);
        state.mark_ready();
        assert_eq!(state.load(), AllocatorState::Ready);
    }

    #[test]
    fn stopped_is_terminal() {
        let state = SharedState::new();
        state.stop();
        assert_eq!(state.load(), AllocatorState::Stopped);

        // A late success must not bring a stopped allocator back.
        state.mark_ready();
        assert_eq!(state.load(), AllocatorState::Stopped);
        assert!(state.is_stopped());
    }
}
