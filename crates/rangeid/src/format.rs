use chrono::DateTime;

/// Fixed width of the zero-padded sequence component.
pub const SEQUENCE_WIDTH: usize = 9;

/// Formats a store timestamp (seconds since the Unix epoch) as a 6-character
/// UTC date, `YYMMDD`.
///
/// Returns `None` when the timestamp falls outside the range `chrono` can
/// represent as a date.
pub fn date_prefix(server_time: i64) -> Option<String> {
    DateTime::from_timestamp(server_time, 0).map(|dt| dt.format("%y%m%d").to_string())
}

/// Materializes one ID string: `prefix` followed by `sequence` left-padded
/// with `'0'` to [`SEQUENCE_WIDTH`] characters.
///
/// A sequence whose decimal representation is already `SEQUENCE_WIDTH` digits
/// or longer is emitted unpadded. This caps the fixed-width guarantee at
/// roughly 10^9 IDs per key per day; past that, IDs grow longer but remain
/// unique within the day.
pub fn format_id(prefix: &str, sequence: u64) -> String {
    format!("{prefix}{sequence:0width$}", width = SEQUENCE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_prefix_is_utc_yymmdd() {
        // 2023-11-14T22:13:20Z
        assert_eq!(date_prefix(1_700_000_000).as_deref(), Some("231114"));
        // Unix epoch
        assert_eq!(date_prefix(0).as_deref(), Some("700101"));
        // One second before the next UTC day
        assert_eq!(date_prefix(1_699_919_999).as_deref(), Some("231113"));
        assert_eq!(date_prefix(1_699_920_000).as_deref(), Some("231114"));
    }

    #[test]
    fn date_prefix_rejects_unrepresentable_timestamps() {
        assert_eq!(date_prefix(i64::MAX), None);
        assert_eq!(date_prefix(i64::MIN), None);
    }

    #[test]
    fn sequence_is_left_padded_to_nine_digits() {
        assert_eq!(format_id("231114", 7), "231114000000007");
        assert_eq!(format_id("231114", 999_999_999), "231114999999999");
    }

    #[test]
    fn sequence_at_or_past_the_width_is_unpadded() {
        assert_eq!(format_id("231114", 1_234_567_890), "2311141234567890");
    }

    #[test]
    fn overlong_sequence_does_not_collide_with_other_day_prefixes() {
        // 10-digit sequence under one prefix vs a 9-digit padded sequence
        // under the next day's prefix: the strings must still differ.
        let overlong = format_id("231114", 1_234_567_890);
        let padded = format_id("231115", 234_567_890);
        assert_ne!(overlong, padded);
    }
}
