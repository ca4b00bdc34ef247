//! Slot enumeration over a court's day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

use courtbook_core::config::BookingConfig;
use courtbook_core::result::AppResult;
use courtbook_core::types::availability::TimeSlot;
use courtbook_core::types::interval::TimeInterval;

/// Iterator over the fixed-width slots of one facility-local day.
///
/// Pure projection over the busy intervals it was built with; cloning it
/// restarts enumeration from the current position.
#[derive(Debug, Clone)]
pub struct DaySlots {
    next_start: DateTime<Utc>,
    close: DateTime<Utc>,
    width: Duration,
    tz: FixedOffset,
    busy: Vec<TimeInterval>,
}

impl DaySlots {
    /// Slots from `opening_hour` to `closing_hour` on `date`. A slot that
    /// would run past closing is not produced.
    pub fn new(date: NaiveDate, config: &BookingConfig, busy: Vec<TimeInterval>) -> AppResult<Self> {
        let tz = config.timezone()?;
        let midnight = TimeInterval::local_day(date, tz)?.start();
        Ok(Self {
            next_start: midnight + Duration::hours(i64::from(config.opening_hour)),
            close: midnight + Duration::hours(i64::from(config.closing_hour)),
            width: Duration::minutes(i64::from(config.slot_minutes.max(1))),
            tz,
            busy,
        })
    }

    fn label(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{} - {}",
            start.with_timezone(&self.tz).format("%H:%M"),
            end.with_timezone(&self.tz).format("%H:%M")
        )
    }
}

impl Iterator for DaySlots {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        let start = self.next_start;
        let end = start + self.width;
        if end > self.close {
            return None;
        }
        self.next_start = end;

        let is_available = !self
            .busy
            .iter()
            .any(|b| b.start() < end && start < b.end());
        Some(TimeSlot {
            start_time: start,
            end_time: end,
            is_available,
            label: self.label(start, end),
        })
    }
}
