//! Traffic-day windows and intra-day positions.
//!
//! A traffic day runs from 01:00:00 UTC to 01:00:00 UTC of the next calendar
//! day. All calendar arithmetic goes through `chrono`.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::domain::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::core::numeric::simplify;
use crate::error::{TrafficError, TrafficResult};

/// Shift of the traffic-day boundary from UTC midnight.
pub const DAY_OFFSET_HOURS: i64 = 1;

/// Source of the current instant, in Unix seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// The traffic day containing a reference instant, plus the caller's "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    pub time_start_day: i64,
    pub time_end_day: i64,
    pub time_now: i64,
}

impl DayWindow {
    /// `true` when `ts` lies within the window, both boundaries included.
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.time_start_day && ts <= self.time_end_day
    }

    pub fn length(&self) -> i64 {
        self.time_end_day - self.time_start_day
    }
}

fn out_of_range(ts: i64) -> TrafficError {
    TrafficError::invalid(format!("timestamp {} is out of range", ts))
}

fn to_datetime(ts: i64) -> TrafficResult<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| out_of_range(ts))
}

/// Start of the traffic day containing `ts`.
///
/// # Examples
///
/// ```
/// use traffic_speed::time::traffic_day_start;
///
/// // 1970-01-01 00:30 UTC still belongs to the day that started 1969-12-31 01:00.
/// assert_eq!(traffic_day_start(1800).unwrap(), 3600 - 86400);
/// assert_eq!(traffic_day_start(3600).unwrap(), 3600);
/// ```
pub fn traffic_day_start(ts: i64) -> TrafficResult<i64> {
    let offset = TimeDelta::hours(DAY_OFFSET_HOURS);
    let shifted = to_datetime(ts)?
        .checked_sub_signed(offset)
        .ok_or_else(|| out_of_range(ts))?;
    let midnight = shifted
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| out_of_range(ts))?
        .and_utc();

    midnight
        .checked_add_signed(offset)
        .map(|start| start.timestamp())
        .ok_or_else(|| out_of_range(ts))
}

/// The same wall-clock instant one calendar day earlier.
pub fn day_before(ts: i64) -> TrafficResult<i64> {
    to_datetime(ts)?
        .checked_sub_signed(TimeDelta::days(1))
        .map(|dt| dt.timestamp())
        .ok_or_else(|| out_of_range(ts))
}

/// Resolves the traffic day of `reference` (or of `now` when absent).
pub fn resolve_window(reference: Option<i64>, now: i64) -> TrafficResult<DayWindow> {
    let time_start_day = traffic_day_start(reference.unwrap_or(now))?;

    Ok(DayWindow {
        time_start_day,
        time_end_day: time_start_day + SECONDS_PER_DAY,
        time_now: now,
    })
}

/// Normalized position of `ts` within its traffic day, in `[0, 1]`, rounded to 4 decimals.
pub fn graph_x(ts: i64) -> TrafficResult<f64> {
    let time_start_day = traffic_day_start(ts)?;
    let position = (ts - time_start_day) as f64 / SECONDS_PER_DAY as f64;

    Ok(simplify(position.clamp(0.0, 1.0), 4))
}

/// Hours between two instants.
pub fn hours_between(from: i64, to: i64) -> f64 {
    (to - from) as f64 / SECONDS_PER_HOUR as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1970-01-06 01:00:00 UTC
    const START_DAY: i64 = 5 * SECONDS_PER_DAY + SECONDS_PER_HOUR;

    #[test]
    fn test_window_boundaries() {
        let window = resolve_window(Some(START_DAY + 5 * SECONDS_PER_HOUR), 42).unwrap();

        assert_eq!(window.time_start_day, START_DAY);
        assert_eq!(window.time_end_day, START_DAY + SECONDS_PER_DAY);
        assert_eq!(window.time_now, 42);
        assert_eq!(window.length(), SECONDS_PER_DAY);
    }

    #[test]
    fn test_window_defaults_to_now() {
        let now = START_DAY + SECONDS_PER_HOUR;
        let window = resolve_window(None, now).unwrap();

        assert_eq!(window.time_start_day, START_DAY);
        assert_eq!(window.time_now, now);
    }

    #[test]
    fn test_window_before_offset_belongs_to_previous_day() {
        let window = resolve_window(Some(START_DAY - 1), 0).unwrap();
        assert_eq!(window.time_start_day, START_DAY - SECONDS_PER_DAY);

        let window = resolve_window(Some(START_DAY), 0).unwrap();
        assert_eq!(window.time_start_day, START_DAY);
    }

    #[test]
    fn test_window_rejects_out_of_range() {
        assert!(matches!(
            resolve_window(Some(i64::MAX), 0),
            Err(TrafficError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_graph_x() {
        assert_eq!(graph_x(START_DAY).unwrap(), 0.0);
        assert_eq!(graph_x(START_DAY + 12 * SECONDS_PER_HOUR).unwrap(), 0.5);
        assert_eq!(graph_x(START_DAY + SECONDS_PER_DAY - 15 * 60).unwrap(), 0.9896);
        assert_eq!(graph_x(START_DAY + SECONDS_PER_DAY - 1).unwrap(), 1.0);
        assert_eq!(graph_x(START_DAY + SECONDS_PER_HOUR).unwrap(), 0.0417);
    }

    #[test]
    fn test_day_before() {
        assert_eq!(day_before(START_DAY).unwrap(), START_DAY - SECONDS_PER_DAY);
    }

    #[test]
    fn test_clocks() {
        assert_eq!(FixedClock(7).now(), 7);
        assert!(SystemClock.now() > 1_600_000_000);
    }
}
