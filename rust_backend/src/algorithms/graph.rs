//! Chart points for a traffic day.

use log::debug;

use crate::algorithms::rate::sum_traffic;
use crate::algorithms::reconstruct::add_missing_dots;
use crate::core::domain::{Dot, GraphPoint, TrafficPackage};
use crate::core::numeric::simplify;
use crate::curve::RatioCurve;
use crate::error::TrafficResult;
use crate::time::{graph_x, DayWindow};

/// Speed a package stops contributing at `end_ts`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiringSpeed {
    pub end_ts: i64,
    pub speed: f64,
}

impl ExpiringSpeed {
    pub fn from_package(package: &TrafficPackage) -> TrafficResult<Self> {
        Ok(Self {
            end_ts: package.end_date,
            speed: package.speed()?,
        })
    }
}

/// Samples `dots` at every reconstructed point of `window` up to `window.time_now`.
///
/// Points after "now" are left out; see [`projected_graph_data`] for a
/// forward-looking series.
pub fn graph_data<C>(dots: &[Dot], window: &DayWindow, curve: &C) -> TrafficResult<Vec<GraphPoint>>
where
    C: RatioCurve + ?Sized,
{
    sample_window(dots, window, curve, None)
}

/// Samples the whole of `window`, including points after "now".
///
/// Packages that end strictly between "now" and the end of the day add a
/// point at their end instant; future points have the speed of every package
/// already ended subtracted before the limit is applied.
pub fn projected_graph_data<C>(
    dots: &[Dot],
    window: &DayWindow,
    curve: &C,
    packages: &[TrafficPackage],
) -> TrafficResult<Vec<GraphPoint>>
where
    C: RatioCurve + ?Sized,
{
    let mut expiring = Vec::new();
    for package in packages {
        if package.end_date > window.time_now && package.end_date < window.time_end_day {
            expiring.push(ExpiringSpeed::from_package(package)?);
        }
    }

    sample_window(dots, window, curve, Some(expiring.as_slice()))
}

fn sample_window<C>(
    dots: &[Dot],
    window: &DayWindow,
    curve: &C,
    projection: Option<&[ExpiringSpeed]>,
) -> TrafficResult<Vec<GraphPoint>>
where
    C: RatioCurve + ?Sized,
{
    if dots.is_empty() {
        return Ok(Vec::new());
    }

    let mut required = vec![window.time_start_day, window.time_end_day, window.time_now];
    if let Some(expiring) = projection {
        required.extend(expiring.iter().map(|e| e.end_ts));
    }

    let all_dots = add_missing_dots(dots, &required)?;
    let mut points = Vec::new();

    for dot in all_dots.iter().filter(|dot| window.contains(dot.ts)) {
        let is_future = dot.ts > window.time_now;
        let subtract = match projection {
            None if is_future => continue,
            Some(expiring) if is_future => expiring
                .iter()
                .filter(|e| e.end_ts <= dot.ts)
                .map(|e| e.speed)
                .sum(),
            _ => 0.0,
        };

        let x = if dot.ts == window.time_end_day {
            1.0
        } else {
            graph_x(dot.ts)?
        };
        let limit = dot.effective_limit();
        let traffic = (sum_traffic(dot, curve.ratio(x)) - subtract).max(0.0);

        points.push(GraphPoint {
            x,
            y: simplify(traffic.min(limit), 3),
            ts: dot.ts,
            is_trimmed: traffic > limit,
            is_future,
        });
    }

    debug!(
        "Sampled {} graph points in [{}, {}]",
        points.len(),
        window.time_start_day,
        window.time_end_day
    );

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{PackageKind, SECONDS_PER_DAY, SECONDS_PER_HOUR};
    use crate::curve::ConstantCurve;
    use crate::time::resolve_window;

    const DAY: i64 = 5 * SECONDS_PER_DAY + SECONDS_PER_HOUR;

    #[test]
    fn test_empty_dots() {
        let window = resolve_window(None, DAY).unwrap();
        assert!(graph_data(&[], &window, &ConstantCurve(1.0)).unwrap().is_empty());
    }

    #[test]
    fn test_points_stop_at_now() {
        let now = DAY + SECONDS_PER_HOUR;
        let window = resolve_window(None, now).unwrap();
        let dots = vec![Dot { seo: 100.0, market: 6.0, limit: 1000.0, ..Dot::at(DAY) }];

        let points = graph_data(&dots, &window, &ConstantCurve(0.5)).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0], GraphPoint { x: 0.0, y: 56.0, ts: DAY, is_trimmed: false, is_future: false });
        assert_eq!(points[1].ts, now);
        assert_eq!(points[1].x, 0.0417);
        assert_eq!(points[1].y, 56.0);
    }

    #[test]
    fn test_trimmed_points_are_clamped() {
        let window = resolve_window(None, DAY + 2 * SECONDS_PER_HOUR).unwrap();
        let dots = vec![Dot { seo: 100.0, limit: 30.0, ..Dot::at(DAY) }];

        let points = graph_data(&dots, &window, &ConstantCurve(0.5)).unwrap();

        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.y == 30.0 && p.is_trimmed));
    }

    #[test]
    fn test_whole_past_day_ends_at_one() {
        let now = DAY + SECONDS_PER_HOUR;
        let window = resolve_window(Some(DAY - SECONDS_PER_DAY + 60), now).unwrap();
        let dots = vec![
            Dot { market: 1000.0, ..Dot::at(DAY - SECONDS_PER_DAY) },
            Dot { market: 1000.0, ..Dot::at(DAY) },
        ];

        let points = graph_data(&dots, &window, &ConstantCurve(1.0)).unwrap();

        assert_eq!(points.len(), 25);
        for (index, point) in points.iter().enumerate() {
            assert_eq!(point.ts, DAY - SECONDS_PER_DAY + index as i64 * SECONDS_PER_HOUR);
            assert_eq!(point.x, simplify(index as f64 / 24.0, 4));
            assert_eq!(point.y, 1000.0);
        }
    }

    #[test]
    fn test_projection_subtracts_ended_packages() {
        let now = DAY + SECONDS_PER_HOUR;
        let window = resolve_window(None, now).unwrap();
        let dots = vec![Dot { market: 1000.0, ..Dot::at(DAY) }];
        let packages = vec![
            TrafficPackage {
                end_date: DAY + 2 * SECONDS_PER_HOUR + 1800,
                count: 100.0,
                duration: 10.0,
                kind: PackageKind::Purchase,
            },
            // Already over, not part of the projection.
            TrafficPackage {
                end_date: DAY + 60,
                count: 500.0,
                duration: 1.0,
                kind: PackageKind::Purchase,
            },
        ];

        let points = projected_graph_data(&dots, &window, &ConstantCurve(1.0), &packages).unwrap();

        // DAY, now, one filler, the package end, 21 fillers after it, end of day.
        assert_eq!(points.len(), 26);
        assert!(!points[1].is_future);
        assert_eq!(points[2].ts, DAY + 2 * SECONDS_PER_HOUR);
        assert_eq!(points[2].y, 1000.0);
        assert_eq!(points[3].ts, DAY + 2 * SECONDS_PER_HOUR + 1800);
        assert_eq!(points[3].y, 990.0);
        assert!(points[3].is_future);
        assert_eq!(points.last().unwrap().x, 1.0);
        assert_eq!(points.last().unwrap().y, 990.0);
    }
}
