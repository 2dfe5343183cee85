//! Python bindings for the traffic engine.
//!
//! Dots, sites and packages cross the boundary as JSON strings in the wire
//! format (`ts`, `seo`, `ref`, `siteSpeed`, `endDate`, ...); results come back
//! as JSON strings or plain numbers. Every function accepts an optional `now`
//! (Unix seconds) that pins the clock for the call.
//!
//! # Python API
//!
//! All functions are available in the `traffic_speed` Python module after
//! installation with the `python` feature enabled.
//!
//! ```text
//! >>> import traffic_speed, json
//! >>> dots = json.dumps([{"ts": 1700000000, "market": 1000, "limit": 100000}])
//! >>> traffic_speed.get_today_sum(dots)
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde::Serialize;

use crate::algorithms::compare::{compare_numbers, CompareThresholds};
use crate::config::EngineConfig;
use crate::core::domain::{Dot, Period, TrafficPackage};
use crate::curve::HourlyCurve;
use crate::error::TrafficError;
use crate::io::loaders::{DotLoader, SiteLoader};
use crate::services::TrafficEngine;
use crate::time::{self, Clock, SystemClock};

/// The system clock unless the caller pinned "now".
#[derive(Debug, Clone, Copy)]
pub struct CallerClock(Option<i64>);

impl Clock for CallerClock {
    fn now(&self) -> i64 {
        self.0.unwrap_or_else(|| SystemClock.now())
    }
}

fn engine(now: Option<i64>) -> TrafficEngine<HourlyCurve, CallerClock> {
    TrafficEngine::new(HourlyCurve::diurnal(), CallerClock(now), EngineConfig::default())
}

fn engine_err(e: TrafficError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn load_err(e: anyhow::Error) -> PyErr {
    PyValueError::new_err(format!("{:#}", e))
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(format!("Failed to serialize result: {}", e)))
}

fn parse_period(period: &str) -> PyResult<Period> {
    period.parse().map_err(engine_err)
}

fn parse_packages(packages_json: &str) -> PyResult<Vec<TrafficPackage>> {
    serde_json::from_str(packages_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid traffic packages: {}", e)))
}

/// Traffic day of `reference` (or of now) as JSON `{timeStartDay, timeEndDay, timeNow}`.
#[pyfunction]
#[pyo3(signature = (reference=None, now=None))]
pub fn get_time_stamps(reference: Option<i64>, now: Option<i64>) -> PyResult<String> {
    to_json(&engine(now).time_stamps(reference).map_err(engine_err)?)
}

/// Normalized position of `ts` within its traffic day.
#[pyfunction]
pub fn calc_graph_x(ts: i64) -> PyResult<f64> {
    time::graph_x(ts).map_err(engine_err)
}

/// Per-channel rate as JSON.
///
/// Args:
///     dots_json: JSON array of dots
///     period: "today" or "yesterday"
///     timestamp: evaluate at this instant instead
#[pyfunction]
#[pyo3(signature = (dots_json, period="today", timestamp=None, now=None))]
pub fn get_traffic_speed(
    dots_json: &str,
    period: &str,
    timestamp: Option<i64>,
    now: Option<i64>,
) -> PyResult<String> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    let engine = engine(now);
    let sample = match timestamp {
        Some(ts) => engine.traffic_speed_at(&dots, ts),
        None => engine.traffic_speed(&dots, parse_period(period)?),
    }
    .map_err(engine_err)?;
    to_json(&sample)
}

#[pyfunction]
#[pyo3(signature = (dots_json, start, end, now=None))]
pub fn get_data_sum(dots_json: &str, start: i64, end: i64, now: Option<i64>) -> PyResult<f64> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    engine(now).data_sum(&dots, start, end, None).map_err(engine_err)
}

#[pyfunction]
#[pyo3(signature = (dots_json, now=None))]
pub fn get_today_sum(dots_json: &str, now: Option<i64>) -> PyResult<f64> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    engine(now).today_sum(&dots).map_err(engine_err)
}

#[pyfunction]
#[pyo3(signature = (dots_json, now=None))]
pub fn get_yesterday_sum(dots_json: &str, now: Option<i64>) -> PyResult<f64> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    engine(now).yesterday_sum(&dots).map_err(engine_err)
}

#[pyfunction]
#[pyo3(signature = (dots_json, packages_json, now=None))]
pub fn get_projected_today_sum(dots_json: &str, packages_json: &str, now: Option<i64>) -> PyResult<f64> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    let packages = parse_packages(packages_json)?;
    engine(now).projected_today_sum(&dots, &packages).map_err(engine_err)
}

/// Chart points as a JSON array.
#[pyfunction]
#[pyo3(signature = (dots_json, period="today", now=None))]
pub fn get_graph_data(dots_json: &str, period: &str, now: Option<i64>) -> PyResult<String> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    let points = engine(now).graph_data(&dots, parse_period(period)?).map_err(engine_err)?;
    to_json(&points)
}

#[pyfunction]
#[pyo3(signature = (dots_json, packages_json, now=None))]
pub fn get_projected_graph_data(dots_json: &str, packages_json: &str, now: Option<i64>) -> PyResult<String> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    let packages = parse_packages(packages_json)?;
    let points = engine(now).projected_graph_data(&dots, &packages).map_err(engine_err)?;
    to_json(&points)
}

/// Limit crossings of a single dot (a JSON object) until the end of its day.
#[pyfunction]
pub fn get_future_limits(dot_json: &str) -> PyResult<String> {
    let dot: Dot = serde_json::from_str(dot_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid dot: {}", e)))?;
    let crossings = engine(None).future_limits(&dot).map_err(engine_err)?;
    to_json(&crossings)
}

/// Fuzzy comparison: -1, 0 or 1.
#[pyfunction]
#[pyo3(signature = (main, secondary, absolute_threshold=5.0, relative_threshold=0.05))]
pub fn number_compare(main: f64, secondary: f64, absolute_threshold: f64, relative_threshold: f64) -> PyResult<i8> {
    let thresholds = CompareThresholds { absolute_threshold, relative_threshold };
    compare_numbers(main, secondary, &thresholds)
        .map(i8::from)
        .map_err(engine_err)
}

#[pyfunction]
#[pyo3(signature = (dots_json, now=None))]
pub fn get_traffic_change(dots_json: &str, now: Option<i64>) -> PyResult<String> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    to_json(&engine(now).traffic_change(&dots).map_err(engine_err)?)
}

/// Hourly multi-site series as a JSON array.
#[pyfunction]
#[pyo3(signature = (sites_json, period="today", now=None))]
pub fn get_all_sites_traffic(sites_json: &str, period: &str, now: Option<i64>) -> PyResult<String> {
    let sites = SiteLoader::load_from_str(sites_json).map_err(load_err)?;
    let points = engine(now)
        .all_sites_traffic(&sites, parse_period(period)?)
        .map_err(engine_err)?;
    to_json(&points)
}

#[pyfunction]
#[pyo3(signature = (sites_json, now=None))]
pub fn get_all_sites_change(sites_json: &str, now: Option<i64>) -> PyResult<String> {
    let sites = SiteLoader::load_from_str(sites_json).map_err(load_err)?;
    to_json(&engine(now).all_sites_change(&sites).map_err(engine_err)?)
}

#[pyfunction]
pub fn clean_traffic(dots_json: &str) -> PyResult<String> {
    let dots = DotLoader::load_from_str(dots_json).map_err(load_err)?;
    to_json(&engine(None).clean_traffic(&dots))
}

/// Register every engine function on the Python module.
pub fn register_functions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(get_time_stamps, m)?)?;
    m.add_function(wrap_pyfunction!(calc_graph_x, m)?)?;
    m.add_function(wrap_pyfunction!(get_traffic_speed, m)?)?;
    m.add_function(wrap_pyfunction!(get_data_sum, m)?)?;
    m.add_function(wrap_pyfunction!(get_today_sum, m)?)?;
    m.add_function(wrap_pyfunction!(get_yesterday_sum, m)?)?;
    m.add_function(wrap_pyfunction!(get_projected_today_sum, m)?)?;
    m.add_function(wrap_pyfunction!(get_graph_data, m)?)?;
    m.add_function(wrap_pyfunction!(get_projected_graph_data, m)?)?;
    m.add_function(wrap_pyfunction!(get_future_limits, m)?)?;
    m.add_function(wrap_pyfunction!(number_compare, m)?)?;
    m.add_function(wrap_pyfunction!(get_traffic_change, m)?)?;
    m.add_function(wrap_pyfunction!(get_all_sites_traffic, m)?)?;
    m.add_function(wrap_pyfunction!(get_all_sites_change, m)?)?;
    m.add_function(wrap_pyfunction!(clean_traffic, m)?)?;
    Ok(())
}
