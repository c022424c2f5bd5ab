use std::sync::{MutexGuard, PoisonError};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the allocator pipeline.
#[derive(Clone, thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The backing store could not be reached or refused the operation.
    #[error("store unreachable: {context}")]
    StoreUnreachable { context: String },

    /// The store replied, but the reply was structurally invalid (wrong
    /// arity, non-numeric fields, unrepresentable timestamp). The raw
    /// payload is logged at the point of failure and carried here.
    #[error("malformed reservation reply: {payload}")]
    MalformedReply { payload: String },

    /// A caller passed arguments that violate the protocol contract.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The allocator configuration failed validation at startup.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// No ID became available within the bounded consumer wait. An explicit
    /// result, not a failure of the allocator itself; retrying is fine.
    #[error("no id available within the wait budget")]
    Unavailable,

    /// The allocator reached its terminal state, either through explicit
    /// shutdown or an exhausted retry budget. It will not recover without a
    /// restart.
    #[error("allocator is stopped")]
    Stopped,

    /// A shared lock was poisoned by a panicking thread.
    #[error("operation failed due to a poisoned lock")]
    LockPoisoned,
}

// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
