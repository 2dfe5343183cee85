//! Diurnal multi-channel traffic-rate engine.
//!
//! Turns sparse "dot" records (rate configurations that take effect at an
//! instant) into instantaneous per-channel rates, interval totals, chart
//! points, future limit crossings and day-over-day trends.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod curve;
pub mod error;
pub mod io;
pub mod services;
pub mod time;

#[cfg(feature = "python")]
pub mod python;

pub use config::EngineConfig;
pub use error::{TrafficError, TrafficResult};
pub use services::TrafficEngine;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Traffic speed engine for Python.
#[cfg(feature = "python")]
#[pymodule]
fn traffic_speed(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register_functions(m)?;
    Ok(())
}
