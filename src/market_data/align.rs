use chrono::{DateTime, Duration, Timelike, Utc};

/// Start of the candle bucket that contains `ts`.
///
/// The timestamp is floored to the hour, then the hour-of-day is floored to a
/// multiple of `interval_hours`. Intervals of 0 or 1 hour both mean hourly
/// buckets.
pub fn align_to_candle_time(ts: DateTime<Utc>, interval_hours: u32) -> DateTime<Utc> {
    let hour = ts.hour();
    let bucket_hour = if interval_hours > 1 {
        (hour / interval_hours) * interval_hours
    } else {
        hour
    };

    let offset_secs =
        i64::from(hour - bucket_hour) * 3600 + i64::from(ts.minute()) * 60 + i64::from(ts.second());

    ts - Duration::seconds(offset_secs) - Duration::nanoseconds(i64::from(ts.nanosecond()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, 28, h, m, s).unwrap()
    }

    #[test]
    fn hourly_floors_minutes_and_seconds() {
        assert_eq!(align_to_candle_time(at(10, 47, 13), 1), at(10, 0, 0));
    }

    #[test]
    fn sub_second_precision_is_dropped() {
        let ts = at(10, 5, 0) + Duration::milliseconds(750);
        assert_eq!(align_to_candle_time(ts, 1), at(10, 0, 0));
    }

    #[test]
    fn four_hour_buckets() {
        assert_eq!(align_to_candle_time(at(10, 47, 0), 4), at(8, 0, 0));
        assert_eq!(align_to_candle_time(at(3, 59, 59), 4), at(0, 0, 0));
        assert_eq!(align_to_candle_time(at(23, 1, 0), 4), at(20, 0, 0));
    }

    #[test]
    fn aligned_input_is_unchanged() {
        assert_eq!(align_to_candle_time(at(12, 0, 0), 4), at(12, 0, 0));
        assert_eq!(align_to_candle_time(at(12, 0, 0), 1), at(12, 0, 0));
    }

    #[test]
    fn zero_interval_behaves_as_hourly() {
        assert_eq!(align_to_candle_time(at(7, 30, 0), 0), at(7, 0, 0));
    }
}
