//! Diurnal ratio curves.
//!
//! A ratio curve maps the normalized position within a traffic day (`0` at
//! 01:00 UTC, `1` at the next 01:00 UTC) to the multiplier applied to the
//! modulated channels (`seo`, `smm`, `mail`).

use crate::error::{TrafficError, TrafficResult};

/// Upper bound of every shipped curve, used by the future-limit scanner to
/// rule out trimming without scanning.
pub const MAX_RATIO: f64 = 2.0;

/// Hourly knots of the standard traffic shape, starting at 01:00 UTC.
const DIURNAL_KNOTS: [f64; 25] = [
    0.10, 0.12, 0.20, 0.35, 0.55, 0.80, 1.05, 1.25, 1.40, 1.50, 1.55, 1.55, 1.50, 1.45, 1.45,
    1.50, 1.60, 1.70, 1.65, 1.50, 1.25, 0.90, 0.55, 0.30, 0.10,
];

/// Maps a normalized intra-day position to a non-negative multiplier.
pub trait RatioCurve {
    /// Multiplier at position `x`, with `x` in `[0, 1]`.
    fn ratio(&self, x: f64) -> f64;

    /// A value the curve never exceeds.
    fn upper_bound(&self) -> f64 {
        MAX_RATIO
    }
}

/// Closures report [`MAX_RATIO`] as their upper bound. A closure that can
/// go above it must be wrapped in a [`BoundedCurve`], otherwise the
/// future-limit scanner may skip a crossing.
impl<F> RatioCurve for F
where
    F: Fn(f64) -> f64,
{
    fn ratio(&self, x: f64) -> f64 {
        self(x)
    }
}

/// A closure curve with an explicit upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedCurve<F> {
    curve: F,
    bound: f64,
}

impl<F> BoundedCurve<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(curve: F, bound: f64) -> Self {
        Self { curve, bound }
    }
}

impl<F> RatioCurve for BoundedCurve<F>
where
    F: Fn(f64) -> f64,
{
    fn ratio(&self, x: f64) -> f64 {
        (self.curve)(x)
    }

    fn upper_bound(&self) -> f64 {
        self.bound
    }
}

/// The same multiplier at every position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantCurve(pub f64);

impl RatioCurve for ConstantCurve {
    fn ratio(&self, _x: f64) -> f64 {
        self.0
    }

    fn upper_bound(&self) -> f64 {
        self.0
    }
}

/// Piecewise-linear curve through evenly spaced knots.
///
/// With 25 knots, knot `k` sits at hour `k` of the traffic day.
///
/// # Examples
///
/// ```
/// use traffic_speed::curve::{HourlyCurve, RatioCurve};
///
/// let curve = HourlyCurve::new(vec![0.0, 2.0]).unwrap();
/// assert_eq!(curve.ratio(0.25), 0.5);
/// assert_eq!(curve.upper_bound(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCurve {
    knots: Vec<f64>,
    peak: f64,
}

impl HourlyCurve {
    /// Builds a curve from at least two finite, non-negative knots.
    pub fn new(knots: Vec<f64>) -> TrafficResult<Self> {
        if knots.len() < 2 {
            return Err(TrafficError::invalid(format!(
                "a ratio curve needs at least 2 knots, got {}",
                knots.len()
            )));
        }
        if let Some(bad) = knots.iter().find(|k| !k.is_finite() || **k < 0.0) {
            return Err(TrafficError::invalid(format!(
                "ratio curve knots must be finite and non-negative, got {}",
                bad
            )));
        }

        let peak = knots.iter().copied().fold(0.0, f64::max);
        Ok(Self { knots, peak })
    }

    /// The standard diurnal traffic shape: a night trough, a morning ramp
    /// and an evening peak.
    pub fn diurnal() -> Self {
        let knots = DIURNAL_KNOTS.to_vec();
        let peak = knots.iter().copied().fold(0.0, f64::max);
        Self { knots, peak }
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }
}

impl Default for HourlyCurve {
    fn default() -> Self {
        Self::diurnal()
    }
}

impl RatioCurve for HourlyCurve {
    fn ratio(&self, x: f64) -> f64 {
        let segments = (self.knots.len() - 1) as f64;
        let position = x.clamp(0.0, 1.0) * segments;
        let index = (position.floor() as usize).min(self.knots.len() - 2);
        let fraction = position - index as f64;
        let (from, to) = (self.knots[index], self.knots[index + 1]);

        from + (to - from) * fraction
    }

    fn upper_bound(&self) -> f64 {
        self.peak.max(MAX_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diurnal_knots() {
        let curve = HourlyCurve::diurnal();

        assert_eq!(curve.ratio(0.0), 0.10);
        assert_eq!(curve.ratio(1.0), 0.10);
        assert!((curve.ratio(1.0 / 24.0) - 0.12).abs() < 1e-12);
        assert!(curve.knots().iter().all(|k| *k <= MAX_RATIO));
        assert_eq!(curve.upper_bound(), MAX_RATIO);
    }

    #[test]
    fn test_interpolation_between_knots() {
        let curve = HourlyCurve::new(vec![1.0, 3.0, 1.0]).unwrap();

        assert_eq!(curve.ratio(0.25), 2.0);
        assert_eq!(curve.ratio(0.5), 3.0);
        assert_eq!(curve.ratio(0.75), 2.0);
        assert_eq!(curve.ratio(-1.0), 1.0);
        assert_eq!(curve.ratio(2.0), 1.0);
        assert_eq!(curve.upper_bound(), 3.0);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert!(HourlyCurve::new(vec![1.0]).is_err());
        assert!(HourlyCurve::new(vec![1.0, -0.5]).is_err());
        assert!(HourlyCurve::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_closure_and_constant_curves() {
        let ramp = |x: f64| 2.0 * x;
        assert_eq!(ramp.ratio(0.5), 1.0);
        assert_eq!(ramp.upper_bound(), MAX_RATIO);

        let flat = ConstantCurve(0.12);
        assert_eq!(flat.ratio(0.9), 0.12);
        assert_eq!(flat.upper_bound(), 0.12);
    }
}
