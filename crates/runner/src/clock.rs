#![forbid(unsafe_code)]

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Wall clock in epoch milliseconds, clamped into `0..=i64::MAX` so a skewed
/// clock can never produce a negative `created_at_ms`.
pub(crate) fn now_ms_i64() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let ms = nanos / 1_000_000i128;
    if ms <= 0 {
        0
    } else if ms >= i64::MAX as i128 {
        i64::MAX
    } else {
        ms as i64
    }
}

/// Out-of-range stamps fall back to the epoch; listing must not fail on one bad row.
pub(crate) fn ts_ms_to_rfc3339(ts_ms: i64) -> String {
    let nanos = (ts_ms as i128) * 1_000_000i128;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch_millis_as_rfc3339() {
        assert_eq!(ts_ms_to_rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(ts_ms_to_rfc3339(86_400_000), "1970-01-02T00:00:00Z");
    }

    #[test]
    fn unrepresentable_stamps_fall_back_to_epoch() {
        assert_eq!(ts_ms_to_rfc3339(i64::MAX), "1970-01-01T00:00:00Z");
        assert!(now_ms_i64() > 0);
    }
}
