use arrow::array::TimestampNanosecondArray;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::Error;

/// Strictly increasing sequence of timestamps; a timestamp resolves to at
/// most one position.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis {
    timestamps: Vec<DateTime<Utc>>,
}

impl TimeAxis {
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self, Error> {
        if timestamps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::TimeAxis(
                "timestamps must be strictly increasing".into(),
            ));
        }
        Ok(Self { timestamps })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn get(&self, position: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(position).copied()
    }

    /// Exact position of `ts`; None when absent. No nearest-time snapping.
    pub fn position_of(&self, ts: DateTime<Utc>) -> Option<usize> {
        self.timestamps.binary_search(&ts).ok()
    }

    /// The axis as a nanosecond timestamp array for result batches. Fails
    /// for timestamps outside the ~1677..=2262 nanosecond-representable
    /// range.
    pub fn to_array(&self) -> Result<TimestampNanosecondArray, Error> {
        let nanos = self
            .timestamps
            .iter()
            .map(|t| {
                t.timestamp_nanos_opt()
                    .ok_or_else(|| Error::TimeAxis(format!("timestamp {t} out of nanosecond range")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nanos.into())
    }

    /// Parse a calendar timestamp string into Utc. Accepts RFC 3339 plus
    /// the common `%Y-%m-%d[T ]%H:%M[:%S]` and bare-date forms.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
        None
    }
}
