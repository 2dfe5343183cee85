//! Service layer for orchestration.
//!
//! This module sits between the pure algorithms and the callers (library
//! users and the Python bindings). Services resolve windows from the clock,
//! validate inputs, and combine per-site results.

pub mod aggregate;
pub mod engine;
pub mod projection;
pub mod trends;

pub use aggregate::{all_sites_traffic, hourly_instants, sites_speed_at};
pub use engine::TrafficEngine;
pub use projection::PackageExpiry;
pub use trends::{all_sites_change, traffic_change, trend_map};
