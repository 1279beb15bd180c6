use chrono::{DateTime, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_3_MIN: i64 = Self::MS_IN_MIN * 3;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_MIN * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_MIN * 15;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_4_H: i64 = Self::MS_IN_H * 4;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const MS_IN_1_M: i64 = Self::MS_IN_D * 30;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
}

/// Bar timestamps are epoch milliseconds; signals carry them as UTC datetimes.
/// Out-of-range values clamp to the epoch rather than failing the run.
pub fn epoch_ms_to_datetime(epoch_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(epoch_ms).unwrap_or(DateTime::UNIX_EPOCH)
}

// Used for log output
pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    epoch_ms_to_datetime(epoch_ms)
        .format(TimeUtils::STANDARD_TIME_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_epoch_millis() {
        let dt = epoch_ms_to_datetime(TimeUtils::MS_IN_D);
        assert_eq!(dt.to_rfc3339(), "1970-01-02T00:00:00+00:00");
        assert_eq!(epoch_ms_to_utc(TimeUtils::MS_IN_H), "1970-01-01 01:00");
    }
}
