//! Traffic-rate algorithms.
//!
//! Pure functions over dot slices. Every function that needs the diurnal ratio
//! takes a [`RatioCurve`](crate::curve::RatioCurve); every function that needs
//! the current instant takes it as an argument.
//!
//! # Components
//!
//! - [`reconstruct`]: gap-free dot sequences and dot cleaning
//! - [`rate`]: instantaneous per-channel rates with limit trimming
//! - [`integrate`]: interval totals
//! - [`graph`]: chart points for a traffic day
//! - [`limits`]: future limit crossings
//! - [`compare`]: fuzzy trend comparison
//!
//! # Example
//!
//! ```
//! use traffic_speed::algorithms::traffic_speed;
//! use traffic_speed::core::domain::Dot;
//! use traffic_speed::curve::ConstantCurve;
//!
//! let dots = vec![Dot { seo: 100.0, market: 5.0, ..Dot::at(0) }];
//! let sample = traffic_speed(&dots, 60, &ConstantCurve(0.5)).unwrap();
//! assert_eq!(sample.rates.total, 55.0);
//! ```

pub mod compare;
pub mod graph;
pub mod integrate;
pub mod limits;
pub mod rate;
pub mod reconstruct;

pub use compare::{compare_numbers, CompareThresholds};
pub use graph::{graph_data, projected_graph_data, ExpiringSpeed};
pub use integrate::{data_sum, data_sum_with_instants, SegmentContext, SegmentTransform};
pub use limits::{future_limits, ScannerConfig, StepMode};
pub use rate::{governing_dot, rate_for_dot, sum_traffic, sum_traffic_without_retention, traffic_speed};
pub use reconstruct::{add_missing_dots, clean_traffic, sort_dots, MIN_GRAPH_INTERVAL, MIN_INTERVAL_BETWEEN_DOTS};
