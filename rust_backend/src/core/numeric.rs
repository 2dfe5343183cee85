//! Rounding helpers shared by the evaluators.

/// Rounds `value` to `digits` decimal places.
///
/// # Examples
///
/// ```
/// use traffic_speed::core::numeric::simplify;
///
/// assert_eq!(simplify(2.77777, 2), 2.78);
/// assert_eq!(simplify(0.041666, 4), 0.0417);
/// ```
pub fn simplify(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
