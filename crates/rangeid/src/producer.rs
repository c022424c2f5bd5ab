use crate::{Error, RangeInfo, ReplyValue, ReservationStore, Result, format};

/// Client adapter for the range-reservation protocol.
///
/// One protocol invocation per call; retries are the allocator's
/// responsibility, never this component's. A failed call has no side effects:
/// the store operation is all-or-nothing, so the counter has not advanced.
pub trait RangeProducer: Send + Sync {
    /// Atomically reserves `count` sequence numbers under `key` and returns
    /// the resulting [`RangeInfo`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if `key` is empty or `count` is zero.
    /// - [`Error::StoreUnreachable`] if the store could not be reached.
    /// - [`Error::MalformedReply`] if the protocol result is structurally
    ///   invalid; the offending payload is logged before conversion.
    fn reserve_range(&self, key: &str, count: u64) -> Result<RangeInfo>;
}

/// [`RangeProducer`] over any [`ReservationStore`].
#[derive(Debug)]
pub struct StoreRangeProducer<S> {
    store: S,
}

impl<S> StoreRangeProducer<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ReservationStore> RangeProducer for StoreRangeProducer<S> {
    fn reserve_range(&self, key: &str, count: u64) -> Result<RangeInfo> {
        if key.is_empty() {
            return Err(Error::InvalidRequest {
                reason: "reservation key must be non-empty".to_owned(),
            });
        }
        if count == 0 {
            return Err(Error::InvalidRequest {
                reason: "reservation count must be positive".to_owned(),
            });
        }

        let reply = self.store.reserve(key, count)?;
        let info = parse_reply(&reply).inspect_err(|_| {
            tracing::error!(
                key,
                count,
                payload = %render_payload(&reply),
                "malformed reservation reply"
            );
        })?;
        tracing::debug!(
            key,
            count,
            server_time = info.server_time(),
            max = info.max(),
            "reserved range"
        );
        Ok(info)
    }
}

/// Validates the raw 2-element reply `[server_time_secs, new_counter_max]`.
fn parse_reply(reply: &[ReplyValue]) -> Result<RangeInfo> {
    let [server_time, max] = reply else {
        return Err(malformed(reply));
    };
    let (&ReplyValue::Int(server_time), &ReplyValue::Int(max)) = (server_time, max) else {
        return Err(malformed(reply));
    };
    if max < 0 {
        return Err(malformed(reply));
    }
    // Reject timestamps the formatter cannot turn into a date prefix.
    if format::date_prefix(server_time).is_none() {
        return Err(malformed(reply));
    }
    Ok(RangeInfo::new(server_time, max as u64))
}

fn malformed(reply: &[ReplyValue]) -> Error {
    Error::MalformedReply {
        payload: render_payload(reply),
    }
}

fn render_payload(reply: &[ReplyValue]) -> String {
    let parts: Vec<String> = reply.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
