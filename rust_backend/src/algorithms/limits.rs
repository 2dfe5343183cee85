//! Forward simulation of limit crossings for the rest of a traffic day.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithms::rate::sum_traffic;
use crate::core::domain::{Dot, LimitCrossing, SECONDS_PER_DAY};
use crate::curve::RatioCurve;
use crate::error::TrafficResult;
use crate::time::{graph_x, traffic_day_start};

/// How the scanner advances between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// Whole minutes proportional to the distance from the limit, at least one.
    #[default]
    Adaptive,
    /// Always `step_secs`.
    Fixed,
}

/// Scanner settings, the `[scanner]` section of the engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub step: StepMode,
    /// Step of the fixed mode, in seconds.
    pub step_secs: i64,
    /// Minutes advanced per unit of relative distance from the limit.
    pub adaptive_gain: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            step: StepMode::Adaptive,
            step_secs: 60,
            adaptive_gain: 30.0,
        }
    }
}

impl ScannerConfig {
    pub fn fixed(step_secs: i64) -> Self {
        Self {
            step: StepMode::Fixed,
            step_secs,
            ..Self::default()
        }
    }

    fn next_step(&self, speed: f64, limit: f64) -> i64 {
        match self.step {
            StepMode::Fixed => self.step_secs.max(1),
            StepMode::Adaptive => {
                let minutes = (self.adaptive_gain * (speed - limit).abs() / limit).floor();
                // Also catches NaN. The cast saturates on huge steps.
                let minutes = if minutes >= 1.0 { minutes as i64 } else { 1 };
                minutes.saturating_mul(60)
            }
        }
    }
}

/// Instants between `last_dot.ts` and the end of its traffic day at which the
/// modulated rate of `last_dot` starts or stops exceeding its limit.
///
/// Returns nothing when the dot is unlimited or cannot exceed its limit even
/// at the curve's upper bound. The first evaluation happens at `last_dot.ts`,
/// so a dot already over its limit yields a leading `is_trimmed: true`.
pub fn future_limits<C>(
    last_dot: &Dot,
    curve: &C,
    config: &ScannerConfig,
) -> TrafficResult<Vec<LimitCrossing>>
where
    C: RatioCurve + ?Sized,
{
    let limit = last_dot.effective_limit();
    if !limit.is_finite() || sum_traffic(last_dot, curve.upper_bound()) <= limit {
        return Ok(Vec::new());
    }

    let time_end_day = traffic_day_start(last_dot.ts)? + SECONDS_PER_DAY;
    let mut time = last_dot.ts;
    let mut is_trimmed = false;
    let mut crossings = Vec::new();
    let mut evaluations = 0usize;

    loop {
        let speed = sum_traffic(last_dot, curve.ratio(graph_x(time)?));
        if (speed > limit) != is_trimmed {
            is_trimmed = !is_trimmed;
            crossings.push(LimitCrossing { ts: time, is_trimmed });
        }
        evaluations += 1;

        time = time.saturating_add(config.next_step(speed, limit));
        if time >= time_end_day {
            break;
        }
    }

    debug!(
        "Scanned {} instants from {} to {}, found {} limit crossings",
        evaluations,
        last_dot.ts,
        time_end_day,
        crossings.len()
    );

    Ok(crossings)
}
