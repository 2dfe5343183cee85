//! Instantaneous multi-channel rate evaluation.

use log::debug;

use crate::core::domain::{ChannelRates, Dot, RateSample};
use crate::curve::RatioCurve;
use crate::error::TrafficResult;
use crate::time::graph_x;

/// Raw combined rate of `dot` under diurnal multiplier `ratio`, unrounded and uncapped.
///
/// # Examples
///
/// ```
/// use traffic_speed::algorithms::rate::sum_traffic;
/// use traffic_speed::core::domain::Dot;
///
/// let dot = Dot { seo: 1000.0, smm: 1000.0, mail: 1000.0, market: 1.0, referral: 2.0, retention: 3.0, ..Dot::at(0) };
/// assert_eq!(sum_traffic(&dot, 1.234), 1234.0 * 3.0 + 6.0);
/// ```
pub fn sum_traffic(dot: &Dot, ratio: f64) -> f64 {
    dot.modulated() * ratio + dot.constant()
}

/// [`sum_traffic`] without the retention channel.
pub fn sum_traffic_without_retention(dot: &Dot, ratio: f64) -> f64 {
    sum_traffic(dot, ratio) - dot.retention
}

/// The dot in force at `at_ts`: the latest dot not after it, or the first dot
/// when `at_ts` precedes the whole series. `dots` must be sorted by `ts`.
pub fn governing_dot(dots: &[Dot], at_ts: i64) -> Option<&Dot> {
    let effective = dots.partition_point(|dot| dot.ts <= at_ts);
    if effective == 0 {
        let first = dots.first();
        if let Some(first) = first {
            debug!(
                "No dot effective at {}, falling back to the first dot at {}",
                at_ts, first.ts
            );
        }
        first
    } else {
        dots.get(effective - 1)
    }
}

/// Rounds each channel of `dot` under `ratio` and caps the total at the dot's limit.
///
/// When the rounded total exceeds the limit every channel is scaled by
/// `limit / total` and rounded again, and the total is forced to the limit.
pub fn rate_for_dot(dot: &Dot, ratio: f64) -> RateSample {
    let mut rates = ChannelRates {
        seo: (dot.seo * ratio).round(),
        smm: (dot.smm * ratio).round(),
        mail: (dot.mail * ratio).round(),
        purchase: dot.market.round(),
        swap: dot.referral.round(),
        retention: dot.retention.round(),
        ..ChannelRates::default()
    };
    let limit = dot.effective_limit();
    let mut total = channel_sum(&rates);
    let mut is_trimmed = false;

    if total > 0.0 && total > limit {
        let scale = limit / total;
        rates.seo = (rates.seo * scale).round();
        rates.smm = (rates.smm * scale).round();
        rates.mail = (rates.mail * scale).round();
        rates.purchase = (rates.purchase * scale).round();
        rates.swap = (rates.swap * scale).round();
        rates.retention = (rates.retention * scale).round();
        total = limit;
        is_trimmed = true;
    }

    rates.generic = rates.seo + rates.smm + rates.mail;
    rates.total = total;

    RateSample { rates, is_trimmed }
}

fn channel_sum(rates: &ChannelRates) -> f64 {
    rates.seo + rates.smm + rates.mail + rates.purchase + rates.swap + rates.retention
}

/// Evaluates the rate of a dot series at `at_ts`.
///
/// Empty series evaluate to an all-zero, untrimmed sample.
pub fn traffic_speed<C>(dots: &[Dot], at_ts: i64, curve: &C) -> TrafficResult<RateSample>
where
    C: RatioCurve + ?Sized,
{
    let mut sorted = dots.to_vec();
    sorted.sort_by_key(|dot| dot.ts);

    let Some(dot) = governing_dot(&sorted, at_ts) else {
        return Ok(RateSample::default());
    };
    let ratio = curve.ratio(graph_x(at_ts)?);

    Ok(rate_for_dot(dot, ratio))
}
