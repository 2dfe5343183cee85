//! Reconstruction of gap-free dot sequences.
//!
//! Callers store only the instants at which a site's traffic configuration
//! changed. Evaluators need more than that: a point at every instant they are
//! asked about and no stretch longer than an hour without a point, because
//! the diurnal ratio is sampled once per segment. [`add_missing_dots`] builds
//! that sequence by inserting phantom copies of the previous dot.

use log::{debug, warn};

use crate::core::domain::{Dot, SECONDS_PER_HOUR};
use crate::error::{TrafficError, TrafficResult};

/// Maximum distance between consecutive reconstructed points.
pub const MIN_GRAPH_INTERVAL: i64 = SECONDS_PER_HOUR;

/// Dots closer than this to the next dot are dropped by [`clean_traffic`].
pub const MIN_INTERVAL_BETWEEN_DOTS: i64 = 10;

/// Sorts dots by `ts`, keeping only the later input dot when two share a timestamp.
pub fn sort_dots(dots: &[Dot]) -> Vec<Dot> {
    let mut sorted = dots.to_vec();
    sorted.sort_by_key(|dot| dot.ts);

    let mut unique: Vec<Dot> = Vec::with_capacity(sorted.len());
    for dot in sorted {
        match unique.last_mut() {
            Some(last) if last.ts == dot.ts => *last = dot,
            _ => unique.push(dot),
        }
    }

    unique
}

/// Returns a sorted sequence containing every dot, a point at every required
/// instant and no gap wider than [`MIN_GRAPH_INTERVAL`].
///
/// A required instant that coincides with a dot is satisfied by that dot. A
/// required instant before the first dot becomes an all-zero phantom, since
/// no configuration was effective yet.
///
/// # Errors
///
/// `InvalidArgument` when `dots` is empty but instants are requested.
///
/// # Examples
///
/// ```
/// use traffic_speed::algorithms::reconstruct::add_missing_dots;
/// use traffic_speed::core::domain::Dot;
///
/// let dots = vec![Dot { market: 10.0, ..Dot::at(0) }, Dot::at(7200)];
/// let all = add_missing_dots(&dots, &[1800]).unwrap();
///
/// let ts: Vec<i64> = all.iter().map(|d| d.ts).collect();
/// assert_eq!(ts, vec![0, 1800, 5400, 7200]);
/// assert!(all[1].phantom);
/// assert_eq!(all[1].market, 10.0);
/// ```
pub fn add_missing_dots(dots: &[Dot], required: &[i64]) -> TrafficResult<Vec<Dot>> {
    if dots.is_empty() {
        if required.is_empty() {
            return Ok(Vec::new());
        }
        return Err(TrafficError::invalid(
            "cannot place required instants in an empty dot series",
        ));
    }

    let sorted = sort_dots(dots);
    let mut pending = required.to_vec();
    pending.sort_unstable();
    pending.dedup();

    let mut with_required: Vec<Dot> = Vec::with_capacity(sorted.len() + pending.len());
    let mut pending = pending.into_iter().peekable();
    let mut previous: Option<&Dot> = None;

    for dot in &sorted {
        while let Some(ts) = pending.next_if(|ts| *ts <= dot.ts) {
            if ts == dot.ts {
                continue;
            }
            match previous {
                Some(prev) => with_required.push(prev.phantom_at(ts)),
                None => {
                    warn!(
                        "Required instant {} precedes the first dot at {}, using a zero dot",
                        ts, dot.ts
                    );
                    with_required.push(Dot::at(ts).phantom_at(ts));
                }
            }
        }
        with_required.push(dot.clone());
        previous = Some(dot);
    }

    // Everything after the last dot carries the last dot's values.
    if let Some(last) = previous {
        with_required.extend(pending.map(|ts| last.phantom_at(ts)));
    }

    let filled = fill_gaps(with_required);

    debug!(
        "Reconstructed {} dots into {} points ({} required instants)",
        sorted.len(),
        filled.len(),
        required.len()
    );

    Ok(filled)
}

/// Inserts phantom points so that no two consecutive points are more than
/// [`MIN_GRAPH_INTERVAL`] apart.
fn fill_gaps(points: Vec<Dot>) -> Vec<Dot> {
    let mut filled: Vec<Dot> = Vec::with_capacity(points.len());

    for point in points {
        while let Some(last) = filled.last() {
            if point.ts - last.ts <= MIN_GRAPH_INTERVAL {
                break;
            }
            let phantom = last.phantom_at(last.ts + MIN_GRAPH_INTERVAL);
            filled.push(phantom);
        }
        filled.push(point);
    }

    filled
}

/// Collapses bursts of dots: walking from the newest dot backwards, a dot is
/// dropped when the next kept dot follows within `min_interval` seconds.
///
/// # Examples
///
/// ```
/// use traffic_speed::algorithms::reconstruct::clean_traffic;
/// use traffic_speed::core::domain::Dot;
///
/// let dots = vec![Dot::at(1), Dot::at(2), Dot::at(200)];
/// let cleaned = clean_traffic(&dots, 10);
/// assert_eq!(cleaned.iter().map(|d| d.ts).collect::<Vec<_>>(), vec![2, 200]);
/// ```
pub fn clean_traffic(dots: &[Dot], min_interval: i64) -> Vec<Dot> {
    let mut sorted = dots.to_vec();
    sorted.sort_by_key(|dot| dot.ts);

    let mut kept: Vec<Dot> = Vec::with_capacity(sorted.len());
    for dot in sorted.into_iter().rev() {
        let keep = match kept.last() {
            None => true,
            Some(next) => next.ts - dot.ts > min_interval,
        };
        if keep {
            kept.push(dot);
        }
    }
    kept.reverse();

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamps(dots: &[Dot]) -> Vec<i64> {
        dots.iter().map(|d| d.ts).collect()
    }

    #[test]
    fn test_empty_inputs() {
        assert!(add_missing_dots(&[], &[]).unwrap().is_empty());
        assert!(matches!(
            add_missing_dots(&[], &[10]),
            Err(TrafficError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sorts_unordered_input() {
        let dots = vec![Dot::at(300), Dot::at(100), Dot::at(200)];
        let all = add_missing_dots(&dots, &[]).unwrap();

        assert_eq!(timestamps(&all), vec![100, 200, 300]);
        assert!(all.iter().all(|d| !d.phantom));
    }

    #[test]
    fn test_required_instant_on_existing_dot_is_skipped() {
        let dots = vec![Dot { seo: 5.0, ..Dot::at(100) }, Dot::at(200)];
        let all = add_missing_dots(&dots, &[200, 100]).unwrap();

        assert_eq!(timestamps(&all), vec![100, 200]);
        assert!(all.iter().all(|d| !d.phantom));
    }

    #[test]
    fn test_duplicate_dots_keep_later_input() {
        let dots = vec![
            Dot { market: 1.0, ..Dot::at(100) },
            Dot { market: 2.0, ..Dot::at(100) },
        ];
        let all = add_missing_dots(&dots, &[]).unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].market, 2.0);
    }

    #[test]
    fn test_required_instants_copy_previous_dot() {
        let dots = vec![
            Dot { market: 1.0, ..Dot::at(100) },
            Dot { market: 2.0, ..Dot::at(400) },
        ];
        let all = add_missing_dots(&dots, &[250, 500, 500]).unwrap();

        assert_eq!(timestamps(&all), vec![100, 250, 400, 500]);
        assert_eq!(all[1].market, 1.0);
        assert!(all[1].phantom);
        assert_eq!(all[3].market, 2.0);
        assert!(all[3].phantom);
    }

    #[test]
    fn test_required_instant_before_first_dot_is_zero() {
        let dots = vec![Dot { market: 7.0, ..Dot::at(1000) }];
        let all = add_missing_dots(&dots, &[500]).unwrap();

        assert_eq!(timestamps(&all), vec![500, 1000]);
        assert_eq!(all[0].market, 0.0);
        assert!(all[0].phantom);
    }

    #[test]
    fn test_gaps_are_capped_at_one_hour() {
        let dots = vec![
            Dot { smm: 3.0, ..Dot::at(0) },
            Dot::at(3 * MIN_GRAPH_INTERVAL + 600),
        ];
        let all = add_missing_dots(&dots, &[]).unwrap();

        assert_eq!(
            timestamps(&all),
            vec![0, 3600, 7200, 10800, 3 * MIN_GRAPH_INTERVAL + 600]
        );
        assert!(all[1..4].iter().all(|d| d.phantom && d.smm == 3.0));
        assert!(all.windows(2).all(|w| w[1].ts - w[0].ts <= MIN_GRAPH_INTERVAL));
    }

    #[test]
    fn test_gap_after_trailing_required_instant() {
        let dots = vec![Dot { mail: 1.0, ..Dot::at(0) }];
        let all = add_missing_dots(&dots, &[2 * MIN_GRAPH_INTERVAL]).unwrap();

        assert_eq!(timestamps(&all), vec![0, 3600, 7200]);
        assert!(all.iter().all(|d| d.mail == 1.0));
    }

    #[test]
    fn test_clean_traffic() {
        let dots = vec![
            Dot { market: 1.0, ..Dot::at(1) },
            Dot { market: 2.0, ..Dot::at(2) },
            Dot { market: 3.0, ..Dot::at(2) },
            Dot { market: 4.0, ..Dot::at(200) },
        ];
        let cleaned = clean_traffic(&dots, MIN_INTERVAL_BETWEEN_DOTS);

        assert_eq!(timestamps(&cleaned), vec![2, 200]);
        assert_eq!(cleaned[0].market, 3.0);
        assert_eq!(cleaned[1].market, 4.0);
    }

    #[test]
    fn test_clean_traffic_keeps_spread_dots() {
        let dots = vec![Dot::at(100), Dot::at(200), Dot::at(300)];
        assert_eq!(timestamps(&clean_traffic(&dots, 10)), vec![100, 200, 300]);
        assert!(clean_traffic(&[], 10).is_empty());
    }
}
