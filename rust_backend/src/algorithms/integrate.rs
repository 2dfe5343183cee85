//! Numeric integration of the modulated rate over an interval.
//!
//! The reconstructed series is walked pair by pair. Each segment `(prev, cur)`
//! contributes `speed * hours`, where the speed is `prev`'s raw rate under the
//! diurnal ratio at `cur.ts`, capped by `cur`'s limit.

use log::debug;

use crate::algorithms::rate::sum_traffic;
use crate::algorithms::reconstruct::add_missing_dots;
use crate::core::domain::Dot;
use crate::core::numeric::simplify;
use crate::curve::RatioCurve;
use crate::error::{TrafficError, TrafficResult};
use crate::time::{graph_x, hours_between};

/// What a [`SegmentTransform`] gets to see for one integration segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentContext<'a> {
    /// End of the segment.
    pub time_stamp: i64,
    /// Rate after the limit was applied.
    pub traf_speed: f64,
    pub daily_ratio: f64,
    /// The dot in force during the segment.
    pub dot: &'a Dot,
    pub limit: f64,
    /// Segment length in hours.
    pub dot_period: f64,
}

/// Replaces the rate of each integration segment.
pub trait SegmentTransform {
    fn transform(&self, segment: &SegmentContext<'_>) -> f64;
}

impl<F> SegmentTransform for F
where
    F: Fn(&SegmentContext<'_>) -> f64,
{
    fn transform(&self, segment: &SegmentContext<'_>) -> f64 {
        self(segment)
    }
}

/// Integrates the rate of `dots` over `[start, end]`, rounded to 2 decimals.
///
/// `now` is injected into the reconstruction so that a segment never spans
/// the present instant.
///
/// # Errors
///
/// `InvalidArgument` when `start > end`.
pub fn data_sum<C>(
    dots: &[Dot],
    start: i64,
    end: i64,
    now: i64,
    curve: &C,
    transform: Option<&dyn SegmentTransform>,
) -> TrafficResult<f64>
where
    C: RatioCurve + ?Sized,
{
    data_sum_with_instants(dots, start, end, &[now], curve, transform)
}

/// Like [`data_sum`], with every instant of `breaks` placed in the
/// reconstruction, so a segment never spans one of them.
///
/// Used when a [`SegmentTransform`] changes behaviour at known instants,
/// such as package end dates.
pub fn data_sum_with_instants<C>(
    dots: &[Dot],
    start: i64,
    end: i64,
    breaks: &[i64],
    curve: &C,
    transform: Option<&dyn SegmentTransform>,
) -> TrafficResult<f64>
where
    C: RatioCurve + ?Sized,
{
    if start > end {
        return Err(TrafficError::invalid(format!(
            "interval start {} is after its end {}",
            start, end
        )));
    }
    if dots.is_empty() {
        return Ok(0.0);
    }

    let mut required = Vec::with_capacity(breaks.len() + 1);
    required.push(end);
    required.extend_from_slice(breaks);

    let all_dots = add_missing_dots(dots, &required)?;
    let mut total = 0.0;
    let mut segments = 0usize;

    for pair in all_dots.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.ts < start || cur.ts > end {
            continue;
        }

        let dot_period = hours_between(prev.ts.max(start), cur.ts);
        if dot_period <= 0.0 {
            continue;
        }

        let daily_ratio = curve.ratio(graph_x(cur.ts)?);
        let limit = cur.effective_limit();
        let traf_speed = sum_traffic(prev, daily_ratio).min(limit);
        let speed = match transform {
            Some(transform) => transform.transform(&SegmentContext {
                time_stamp: cur.ts,
                traf_speed,
                daily_ratio,
                dot: prev,
                limit,
                dot_period,
            }),
            None => traf_speed,
        };

        total += speed * dot_period;
        segments += 1;
    }

    debug!(
        "Integrated {} segments over [{}, {}]: {}",
        segments, start, end, total
    );

    Ok(simplify(total, 2))
}
