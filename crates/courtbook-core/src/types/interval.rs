//! Half-open time intervals and the overlap predicate every conflict check
//! is built on.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Whether the half-open intervals `[a_start, a_end)` and `[b_start, b_end)`
/// share any instant.
///
/// Both intervals must be non-empty; an interval whose end is not strictly
/// after its start is rejected with [`ErrorKind::InvalidInterval`](crate::error::ErrorKind::InvalidInterval).
pub fn overlaps<T>(a_start: T, a_end: T, b_start: T, b_end: T) -> AppResult<bool>
where
    T: PartialOrd + fmt::Debug,
{
    if a_start >= a_end {
        return Err(AppError::invalid_interval(format!(
            "Interval end {a_end:?} must be after start {a_start:?}"
        )));
    }
    if b_start >= b_end {
        return Err(AppError::invalid_interval(format!(
            "Interval end {b_end:?} must be after start {b_start:?}"
        )));
    }
    Ok(a_start < b_end && b_start < a_end)
}

/// A validated, non-empty `[start, end)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = AppError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    /// Create an interval, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::invalid_interval(format!(
                "End time {end} must be after start time {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar day `date` in the given timezone.
    pub fn local_day(date: NaiveDate, tz: FixedOffset) -> AppResult<Self> {
        let start = tz
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
            .ok_or_else(|| AppError::validation(format!("Invalid date: {date}")))?
            .with_timezone(&Utc);
        Self::new(start, start + Duration::days(1))
    }

    /// Inclusive start.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the two intervals share any instant.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the raw `[start, end)` pair overlaps this interval. A
    /// degenerate pair is an error.
    pub fn overlaps_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<bool> {
        overlaps(self.start, self.end, start, end)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    /// The disjunction of range tests used by the first version of the
    /// conflict query: an existing `[b_start, b_end)` conflicts with a new
    /// `[a_start, a_end)` if it starts inside it, ends inside it, is contained
    /// by it, or contains it.
    fn four_clause(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
        (b_start < a_end && b_start >= a_start)
            || (b_end > a_start && b_end <= a_end)
            || (b_start >= a_start && b_end <= a_end)
            || (b_start <= a_start && b_end >= a_end)
    }

    fn valid_pairs(limit: i32) -> Vec<(i32, i32)> {
        (0..limit)
            .flat_map(|s| (s + 1..=limit).map(move |e| (s, e)))
            .collect()
    }

    #[test]
    fn test_matches_four_clause_form_exhaustively() {
        let pairs = valid_pairs(8);
        for &(a_start, a_end) in &pairs {
            for &(b_start, b_end) in &pairs {
                let canonical = overlaps(a_start, a_end, b_start, b_end).unwrap();
                assert_eq!(
                    canonical,
                    four_clause(a_start, a_end, b_start, b_end),
                    "mismatch for [{a_start},{a_end}) vs [{b_start},{b_end})"
                );
            }
        }
    }

    #[test]
    fn test_symmetric() {
        let pairs = valid_pairs(8);
        for &(a_start, a_end) in &pairs {
            for &(b_start, b_end) in &pairs {
                assert_eq!(
                    overlaps(a_start, a_end, b_start, b_end).unwrap(),
                    overlaps(b_start, b_end, a_start, a_end).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        assert!(!overlaps(10, 11, 11, 12).unwrap());
        assert!(!overlaps(11, 12, 10, 11).unwrap());
        assert!(overlaps(10, 12, 11, 13).unwrap());
    }

    #[test]
    fn test_degenerate_rejected() {
        let err = overlaps(5, 5, 1, 9).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInterval);
        let err = overlaps(1, 9, 7, 3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInterval);
    }

    #[test]
    fn test_time_interval_new() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        let end = start + Duration::hours(1);
        let interval = TimeInterval::new(start, end).unwrap();
        assert_eq!(interval.duration(), Duration::hours(1));
        assert_eq!(
            TimeInterval::new(end, start).unwrap_err().kind,
            ErrorKind::InvalidInterval
        );
        assert_eq!(
            TimeInterval::new(start, start).unwrap_err().kind,
            ErrorKind::InvalidInterval
        );
    }

    #[test]
    fn test_local_day_respects_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let day = TimeInterval::local_day(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), tz).unwrap();
        assert_eq!(day.start(), Utc.with_ymd_and_hms(2025, 2, 28, 22, 0, 0).unwrap());
        assert_eq!(day.duration(), Duration::days(1));
    }

    #[test]
    fn test_deserialize_rejects_inverted() {
        let json = r#"{"start":"2025-03-01T19:00:00Z","end":"2025-03-01T18:00:00Z"}"#;
        assert!(serde_json::from_str::<TimeInterval>(json).is_err());
    }
}
