//! Day-over-day trend maps.

use log::debug;

use crate::algorithms::compare::{compare_numbers, CompareThresholds};
use crate::algorithms::rate::traffic_speed;
use crate::core::domain::{ChannelRates, Dot, Site, TrendMap};
use crate::curve::RatioCurve;
use crate::error::TrafficResult;
use crate::services::aggregate::sites_speed_at;
use crate::time::day_before;

/// Compares `current` against `previous` channel by channel.
pub fn trend_map(
    current: &ChannelRates,
    previous: &ChannelRates,
    thresholds: &CompareThresholds,
) -> TrafficResult<TrendMap> {
    TrendMap::try_from_fn(|channel| {
        compare_numbers(current.get(channel), previous.get(channel), thresholds)
    })
}

/// Trend of one site's rate at `now` against the same instant a day earlier.
pub fn traffic_change<C>(
    dots: &[Dot],
    now: i64,
    curve: &C,
    thresholds: &CompareThresholds,
) -> TrafficResult<TrendMap>
where
    C: RatioCurve + ?Sized,
{
    let current = traffic_speed(dots, now, curve)?.rates;
    let previous = traffic_speed(dots, day_before(now)?, curve)?.rates;

    debug!("Traffic change: total {} vs {}", current.total, previous.total);

    trend_map(&current, &previous, thresholds)
}

/// Trend of the summed rate of all `sites`, without package projection.
pub fn all_sites_change<C>(
    sites: &[Site],
    now: i64,
    curve: &C,
    thresholds: &CompareThresholds,
) -> TrafficResult<TrendMap>
where
    C: RatioCurve + ?Sized,
{
    let current = sites_speed_at(sites, now, curve)?;
    let previous = sites_speed_at(sites, day_before(now)?, curve)?;

    debug!(
        "All sites change over {} sites: total {} vs {}",
        sites.len(),
        current.total,
        previous.total
    );

    trend_map(&current, &previous, thresholds)
}
