//! Calendar-day windows in a fixed reference timezone.
//!
//! Games are scored per real-world day in one canonical region, so every
//! day bucket must use the same timezone conversion; bucketing on raw UTC
//! dates would shift late-evening scores into the next day. The zone and
//! the clock are both passed in so windows are testable.

use std::collections::HashMap;

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Window computation errors.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("days must be at least 1, got {0}")]
    InvalidDays(i64),
}

/// UTC bounds of one reference-timezone calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRange {
    pub utc_start: DateTime<Utc>,
    pub utc_end: DateTime<Utc>,
    /// The calendar day in the reference timezone.
    pub day: NaiveDate,
}

/// UTC bounds plus labels for a run of recent calendar days.
#[derive(Debug, Clone)]
pub struct RecentWindows {
    pub utc_start: DateTime<Utc>,
    pub utc_end: DateTime<Utc>,
    /// Calendar days oldest first.
    pub days: Vec<NaiveDate>,
    /// Day to zero-based position, oldest = 0.
    pub index: HashMap<NaiveDate, usize>,
}

/// UTC instant of local midnight opening `day` in `tz`.
///
/// An ambiguous midnight (fall-back transition) resolves to the earlier
/// instant; a skipped midnight (spring-forward) resolves to the first
/// valid instant of the day.
fn local_midnight(tz: Tz, day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + chrono::Duration::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
                LocalResult::None => Utc.from_utc_datetime(&naive),
            }
        }
    }
}

/// The reference-timezone calendar day containing a UTC instant.
pub fn local_day(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// UTC range for the reference-timezone calendar day containing `date`,
/// or the day containing `now` when no date is given. A given `date` is
/// a timezone-naive calendar date, not a UTC instant.
pub fn day_range(tz: Tz, now: DateTime<Utc>, date: Option<NaiveDate>) -> DayRange {
    let day = date.unwrap_or_else(|| local_day(tz, now));
    DayRange {
        utc_start: local_midnight(tz, day),
        utc_end: local_midnight(tz, day + Days::new(1)),
        day,
    }
}

/// UTC range covering the most recent `days` reference-timezone calendar
/// days inclusive of today, with ordered day labels and their indexes.
pub fn recent_windows(tz: Tz, now: DateTime<Utc>, days: i64) -> Result<RecentWindows, WindowError> {
    if days < 1 {
        return Err(WindowError::InvalidDays(days));
    }

    let today = local_day(tz, now);
    let start_day = today - Days::new(days as u64 - 1);

    let mut day_list = Vec::with_capacity(days as usize);
    let mut index = HashMap::with_capacity(days as usize);
    for i in 0..days {
        let d = start_day + Days::new(i as u64);
        day_list.push(d);
        index.insert(d, i as usize);
    }

    Ok(RecentWindows {
        utc_start: local_midnight(tz, start_day),
        utc_end: local_midnight(tz, today + Days::new(1)),
        days: day_list,
        index,
    })
}
