//! Multi-site hourly series.

use log::debug;

use crate::algorithms::rate::traffic_speed;
use crate::algorithms::reconstruct::MIN_GRAPH_INTERVAL;
use crate::core::domain::{AggregatePoint, Channel, ChannelRates, PackageKind, Site};
use crate::curve::RatioCurve;
use crate::error::TrafficResult;
use crate::time::{graph_x, DayWindow};

/// Package speeds of one site, grouped by the channel they feed.
struct SitePackages {
    purchase: Vec<(i64, f64)>,
    swap: Vec<(i64, f64)>,
}

impl SitePackages {
    fn from_site(site: &Site) -> TrafficResult<Self> {
        let mut packages = Self { purchase: Vec::new(), swap: Vec::new() };
        for package in &site.traffic {
            let entry = (package.end_date, package.speed()?);
            match package.kind {
                PackageKind::Purchase => packages.purchase.push(entry),
                PackageKind::Swap => packages.swap.push(entry),
            }
        }
        Ok(packages)
    }

    fn ended_before(entries: &[(i64, f64)], ts: i64) -> f64 {
        entries.iter().filter(|(end, _)| *end < ts).map(|(_, speed)| speed).sum()
    }

    /// Removes ended packages from their channel and from the total.
    fn subtract_ended(&self, speed: &mut ChannelRates, ts: i64) {
        let purchase = Self::ended_before(&self.purchase, ts);
        let swap = Self::ended_before(&self.swap, ts);

        speed.purchase = (speed.purchase - purchase).max(0.0);
        speed.swap = (speed.swap - swap).max(0.0);
        speed.total = (speed.total - purchase - swap).max(0.0);
    }
}

/// Channel-wise sum of every site's rate at `ts`.
pub fn sites_speed_at<C>(sites: &[Site], ts: i64, curve: &C) -> TrafficResult<ChannelRates>
where
    C: RatioCurve + ?Sized,
{
    let mut total = ChannelRates::default();
    for site in sites {
        total += traffic_speed(&site.site_speed, ts, curve)?.rates;
    }
    Ok(total)
}

/// Instants sampled for a day: every hour from start to end inclusive, plus
/// `reference` when it falls strictly inside an hour.
pub fn hourly_instants(window: &DayWindow, reference: i64) -> Vec<i64> {
    let mut instants = Vec::with_capacity(26);
    let mut ts = window.time_start_day;
    while ts <= window.time_end_day {
        instants.push(ts);
        if reference > ts && reference < ts + MIN_GRAPH_INTERVAL {
            instants.push(reference);
        }
        ts += MIN_GRAPH_INTERVAL;
    }
    instants
}

/// Summed hourly series of all `sites` over `window`.
///
/// `reference` is the instant the window was resolved from. Points after
/// `window.time_now` are projections: each site drops the speed of its
/// packages that ended strictly before the point.
pub fn all_sites_traffic<C>(
    sites: &[Site],
    window: &DayWindow,
    reference: i64,
    curve: &C,
) -> TrafficResult<Vec<AggregatePoint>>
where
    C: RatioCurve + ?Sized,
{
    let packages = sites
        .iter()
        .map(SitePackages::from_site)
        .collect::<TrafficResult<Vec<_>>>()?;

    let instants = hourly_instants(window, reference);
    let mut points = Vec::with_capacity(instants.len());

    for ts in instants {
        let is_future = ts > window.time_now;
        let mut speed = ChannelRates::default();

        for (site, site_packages) in sites.iter().zip(&packages) {
            let mut site_speed = traffic_speed(&site.site_speed, ts, curve)?.rates;
            if is_future {
                site_packages.subtract_ended(&mut site_speed, ts);
            }
            speed += site_speed;
        }

        let x = if ts == window.time_end_day { 1.0 } else { graph_x(ts)? };
        points.push(AggregatePoint {
            x,
            y: speed.get(Channel::Total),
            ts,
            speed,
            is_future,
        });
    }

    debug!("Aggregated {} sites into {} points", sites.len(), points.len());

    Ok(points)
}
