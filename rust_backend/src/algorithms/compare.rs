//! Fuzzy tri-state comparison of two rates.

use serde::{Deserialize, Serialize};

use crate::core::domain::Trend;
use crate::error::{TrafficError, TrafficResult};

/// Tolerances under which two values count as equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareThresholds {
    /// Differences up to this many units are ignored.
    pub absolute_threshold: f64,
    /// Differences up to this fraction of the larger value are ignored.
    pub relative_threshold: f64,
}

impl Default for CompareThresholds {
    fn default() -> Self {
        Self {
            absolute_threshold: 5.0,
            relative_threshold: 0.05,
        }
    }
}

/// Compares `main` against `secondary`.
///
/// The difference is `Flat` when it is within
/// `max(absolute_threshold, max(main, secondary) * relative_threshold)`.
///
/// # Examples
///
/// ```
/// use traffic_speed::algorithms::compare::{compare_numbers, CompareThresholds};
/// use traffic_speed::core::domain::Trend;
///
/// let thresholds = CompareThresholds::default();
/// assert_eq!(compare_numbers(20.0, 0.0, &thresholds).unwrap(), Trend::Up);
/// assert_eq!(compare_numbers(0.0, 1.0, &thresholds).unwrap(), Trend::Flat);
/// ```
pub fn compare_numbers(main: f64, secondary: f64, thresholds: &CompareThresholds) -> TrafficResult<Trend> {
    let arguments = [
        ("first argument", main),
        ("second argument", secondary),
        ("absolute threshold", thresholds.absolute_threshold),
        ("relative threshold", thresholds.relative_threshold),
    ];
    for (name, value) in arguments {
        if !value.is_finite() {
            return Err(TrafficError::invalid(format!("{} is not a finite number: {}", name, value)));
        }
    }

    let delta = main - secondary;
    let tolerance = thresholds
        .absolute_threshold
        .max(main.max(secondary) * thresholds.relative_threshold);

    Ok(if delta.abs() <= tolerance {
        Trend::Flat
    } else if delta > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    })
}
