//! Package expiry applied to integration segments.

use crate::algorithms::graph::ExpiringSpeed;
use crate::algorithms::integrate::{SegmentContext, SegmentTransform};
use crate::core::domain::TrafficPackage;
use crate::error::TrafficResult;

/// Removes the speed of ended packages from segments that lie after "now".
///
/// Only packages ending after `now` take part; earlier ones are already out
/// of the measured rate. A segment ending at `t > now` loses the speed of
/// every package whose end date is strictly before `t`, and the result never
/// drops below zero. Segments up to "now" pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageExpiry {
    now: i64,
    expiring: Vec<ExpiringSpeed>,
}

impl PackageExpiry {
    /// # Errors
    ///
    /// `InvalidArgument` when any package has no valid speed.
    pub fn new(packages: &[TrafficPackage], now: i64) -> TrafficResult<Self> {
        let mut expiring = packages
            .iter()
            .map(ExpiringSpeed::from_package)
            .collect::<TrafficResult<Vec<_>>>()?;
        expiring.retain(|e| e.end_ts > now);

        Ok(Self { now, expiring })
    }

    /// End dates of the packages still running at "now".
    pub fn end_dates(&self) -> impl Iterator<Item = i64> + '_ {
        self.expiring.iter().map(|e| e.end_ts)
    }

    /// Total speed of packages that ended strictly before `ts`.
    pub fn ended_before(&self, ts: i64) -> f64 {
        self.expiring
            .iter()
            .filter(|e| e.end_ts < ts)
            .map(|e| e.speed)
            .sum()
    }
}

impl SegmentTransform for PackageExpiry {
    fn transform(&self, segment: &SegmentContext<'_>) -> f64 {
        if segment.time_stamp <= self.now {
            return segment.traf_speed;
        }
        (segment.traf_speed - self.ended_before(segment.time_stamp)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{Dot, PackageKind};

    fn package(end_date: i64, count: f64, duration: f64) -> TrafficPackage {
        TrafficPackage { end_date, count, duration, kind: PackageKind::Purchase }
    }

    fn segment(dot: &Dot, time_stamp: i64, traf_speed: f64) -> SegmentContext<'_> {
        SegmentContext {
            time_stamp,
            traf_speed,
            daily_ratio: 1.0,
            dot,
            limit: f64::INFINITY,
            dot_period: 1.0,
        }
    }

    #[test]
    fn test_only_future_segments_change() {
        let dot = Dot::at(0);
        let expiry = PackageExpiry::new(&[package(1500, 100.0, 10.0)], 1000).unwrap();

        assert_eq!(expiry.transform(&segment(&dot, 1000, 50.0)), 50.0);
        assert_eq!(expiry.transform(&segment(&dot, 1500, 50.0)), 50.0);
        assert_eq!(expiry.transform(&segment(&dot, 1501, 50.0)), 40.0);
        assert_eq!(expiry.transform(&segment(&dot, 1501, 5.0)), 0.0);
    }

    #[test]
    fn test_packages_over_before_now_are_ignored() {
        let dot = Dot::at(0);
        let expiry = PackageExpiry::new(&[package(100, 100.0, 10.0), package(1000, 50.0, 1.0)], 1000).unwrap();

        assert_eq!(expiry.end_dates().count(), 0);
        assert_eq!(expiry.ended_before(5000), 0.0);
        assert_eq!(expiry.transform(&segment(&dot, 5000, 50.0)), 50.0);
    }

    #[test]
    fn test_strictly_before() {
        let expiry = PackageExpiry::new(&[package(2000, 60.0, 2.0), package(3000, 10.0, 1.0)], 0).unwrap();

        assert_eq!(expiry.ended_before(2000), 0.0);
        assert_eq!(expiry.ended_before(2001), 30.0);
        assert_eq!(expiry.ended_before(3001), 40.0);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        assert!(PackageExpiry::new(&[package(0, 1.0, 0.0)], 0).is_err());
    }
}
