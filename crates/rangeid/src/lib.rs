//! Client-side segmented unique-ID allocator.
//!
//! Instead of a store round trip per ID, an [`IdAllocator`] reserves whole
//! integer ranges from a shared counter in the background, expands each range
//! into date-prefixed ID strings, and hands them to callers through a bounded
//! buffer. Uniqueness is delegated to the [`ReservationStore`] contract: every
//! reservation atomically advances the counter, so ranges never overlap.
//!
//! The moving parts, bottom up:
//!
//! - [`ReservationStore`] — the atomic range-reservation primitive, plus
//!   [`MemoryStore`], an in-process reference implementation.
//! - [`RangeProducer`] / [`StoreRangeProducer`] — one protocol round trip per
//!   call, translating raw replies into a typed [`RangeInfo`].
//! - [`IdAllocator`] — background reservation threads, retry/backoff, and the
//!   blocking `get_id()` surface.

mod alloc;
mod config;
mod error;
mod format;
mod producer;
mod range;
mod state;
mod store;

pub use crate::alloc::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::format::*;
pub use crate::producer::*;
pub use crate::range::*;
pub use crate::state::AllocatorState;
pub use crate::store::*;
