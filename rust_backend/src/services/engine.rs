//! The traffic engine facade.
//!
//! [`TrafficEngine`] bundles a ratio curve, a clock and an [`EngineConfig`].
//! Every method reads the clock at most once, so all instants within one call
//! agree on "now".

use log::{debug, info};

use crate::algorithms::{self, SegmentTransform};
use crate::config::EngineConfig;
use crate::core::domain::{
    validate_dots, AggregatePoint, Dot, GraphPoint, LimitCrossing, Period, RateSample, Site,
    TrafficPackage, Trend, TrendMap,
};
use crate::curve::{HourlyCurve, RatioCurve};
use crate::error::TrafficResult;
use crate::services::aggregate;
use crate::services::projection::PackageExpiry;
use crate::services::trends;
use crate::time::{self, day_before, resolve_window, Clock, DayWindow, SystemClock};

/// Stateless evaluator of dot series against a curve and a clock.
///
/// # Examples
///
/// ```
/// use traffic_speed::config::EngineConfig;
/// use traffic_speed::core::domain::Dot;
/// use traffic_speed::curve::ConstantCurve;
/// use traffic_speed::services::TrafficEngine;
/// use traffic_speed::time::FixedClock;
///
/// let start = 5 * 86_400 + 3_600;
/// let engine = TrafficEngine::new(ConstantCurve(1.0), FixedClock(start + 3_600), EngineConfig::default());
///
/// let dots = vec![Dot { market: 1000.0, ..Dot::at(start - 86_400) }];
/// assert_eq!(engine.today_sum(&dots).unwrap(), 1000.0);
/// ```
#[derive(Debug, Clone)]
pub struct TrafficEngine<C = HourlyCurve, K = SystemClock> {
    curve: C,
    clock: K,
    config: EngineConfig,
}

impl TrafficEngine {
    /// The diurnal curve, the system clock and default settings.
    pub fn with_defaults() -> Self {
        Self::new(HourlyCurve::diurnal(), SystemClock, EngineConfig::default())
    }
}

impl Default for TrafficEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<C, K> TrafficEngine<C, K>
where
    C: RatioCurve,
    K: Clock,
{
    pub fn new(curve: C, clock: K, config: EngineConfig) -> Self {
        info!(
            "Traffic engine ready (scanner {:?}, compare thresholds {}/{})",
            config.scanner.step,
            config.compare.absolute_threshold,
            config.compare.relative_threshold
        );
        Self { curve, clock, config }
    }

    pub fn curve(&self) -> &C {
        &self.curve
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Traffic day of `reference` (or of now), plus now.
    pub fn time_stamps(&self, reference: Option<i64>) -> TrafficResult<DayWindow> {
        resolve_window(reference, self.clock.now())
    }

    pub fn graph_x(&self, ts: i64) -> TrafficResult<f64> {
        time::graph_x(ts)
    }

    fn period_reference(period: Period, now: i64) -> TrafficResult<i64> {
        match period {
            Period::Today => Ok(now),
            Period::Yesterday => day_before(now),
        }
    }

    /// Rate now, or at the same instant yesterday.
    pub fn traffic_speed(&self, dots: &[Dot], period: Period) -> TrafficResult<RateSample> {
        let at_ts = Self::period_reference(period, self.clock.now())?;
        self.traffic_speed_at(dots, at_ts)
    }

    pub fn traffic_speed_at(&self, dots: &[Dot], at_ts: i64) -> TrafficResult<RateSample> {
        validate_dots(dots)?;
        algorithms::traffic_speed(dots, at_ts, &self.curve)
    }

    /// Total traffic over `[start, end]`, optionally reshaping each segment.
    pub fn data_sum(
        &self,
        dots: &[Dot],
        start: i64,
        end: i64,
        transform: Option<&dyn SegmentTransform>,
    ) -> TrafficResult<f64> {
        validate_dots(dots)?;
        algorithms::data_sum(dots, start, end, self.clock.now(), &self.curve, transform)
    }

    /// Traffic since the start of today's traffic day.
    pub fn today_sum(&self, dots: &[Dot]) -> TrafficResult<f64> {
        validate_dots(dots)?;
        let window = self.time_stamps(None)?;
        algorithms::data_sum(
            dots,
            window.time_start_day,
            window.time_now,
            window.time_now,
            &self.curve,
            None,
        )
    }

    /// Traffic over the whole previous traffic day.
    pub fn yesterday_sum(&self, dots: &[Dot]) -> TrafficResult<f64> {
        validate_dots(dots)?;
        let now = self.clock.now();
        let window = resolve_window(Some(day_before(now)?), now)?;
        algorithms::data_sum(
            dots,
            window.time_start_day,
            window.time_end_day,
            now,
            &self.curve,
            None,
        )
    }

    /// Expected traffic for the whole of today, with packages dropping out
    /// of the projection once they end.
    pub fn projected_today_sum(&self, dots: &[Dot], packages: &[TrafficPackage]) -> TrafficResult<f64> {
        validate_dots(dots)?;
        let window = self.time_stamps(None)?;
        let expiry = PackageExpiry::new(packages, window.time_now)?;
        let mut breaks = vec![window.time_now];
        breaks.extend(expiry.end_dates().filter(|ts| *ts < window.time_end_day));

        algorithms::data_sum_with_instants(
            dots,
            window.time_start_day,
            window.time_end_day,
            &breaks,
            &self.curve,
            Some(&expiry),
        )
    }

    /// Chart points of today or yesterday, up to now.
    pub fn graph_data(&self, dots: &[Dot], period: Period) -> TrafficResult<Vec<GraphPoint>> {
        validate_dots(dots)?;
        let now = self.clock.now();
        let window = resolve_window(Some(Self::period_reference(period, now)?), now)?;
        algorithms::graph_data(dots, &window, &self.curve)
    }

    /// Chart points of the whole of today, projecting past now.
    pub fn projected_graph_data(
        &self,
        dots: &[Dot],
        packages: &[TrafficPackage],
    ) -> TrafficResult<Vec<GraphPoint>> {
        validate_dots(dots)?;
        let window = self.time_stamps(None)?;
        algorithms::projected_graph_data(dots, &window, &self.curve, packages)
    }

    pub fn future_limits(&self, last_dot: &Dot) -> TrafficResult<Vec<LimitCrossing>> {
        last_dot.validate()?;
        algorithms::future_limits(last_dot, &self.curve, &self.config.scanner)
    }

    /// Fuzzy comparison with the configured thresholds.
    pub fn compare(&self, main: f64, secondary: f64) -> TrafficResult<Trend> {
        algorithms::compare_numbers(main, secondary, &self.config.compare)
    }

    pub fn traffic_change(&self, dots: &[Dot]) -> TrafficResult<TrendMap> {
        validate_dots(dots)?;
        trends::traffic_change(dots, self.clock.now(), &self.curve, &self.config.compare)
    }

    /// Hourly series of all sites over today or yesterday.
    pub fn all_sites_traffic(&self, sites: &[Site], period: Period) -> TrafficResult<Vec<AggregatePoint>> {
        validate_sites(sites)?;
        let now = self.clock.now();
        let reference = Self::period_reference(period, now)?;
        let window = resolve_window(Some(reference), now)?;
        aggregate::all_sites_traffic(sites, &window, reference, &self.curve)
    }

    pub fn all_sites_change(&self, sites: &[Site]) -> TrafficResult<TrendMap> {
        validate_sites(sites)?;
        trends::all_sites_change(sites, self.clock.now(), &self.curve, &self.config.compare)
    }

    /// Drops dots followed by another within the configured interval.
    pub fn clean_traffic(&self, dots: &[Dot]) -> Vec<Dot> {
        let cleaned = algorithms::clean_traffic(dots, self.config.cleaning.min_interval_between_dots);
        debug!("Cleaned {} dots down to {}", dots.len(), cleaned.len());
        cleaned
    }
}

fn validate_sites(sites: &[Site]) -> TrafficResult<()> {
    sites.iter().try_for_each(|site| validate_dots(&site.site_speed))
}
