//! Domain models for traffic dots, rate samples and sites.
//!
//! This module provides the core data structures of the engine: the sparse
//! "dot" records callers supply, the evaluated per-channel rate samples, the
//! chart and crossing points produced from them, and the site/package records
//! used by the multi-site aggregation.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::error::{TrafficError, TrafficResult};

/// One hour, also the maximum distance between two reconstructed points.
pub const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Length of a traffic day.
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Accepts a JSON number or `null` (treated as zero) for a channel value.
fn deserialize_nullable_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// A traffic-rate configuration effective from `ts` until the next dot.
///
/// `seo`, `smm` and `mail` are multiplied by the diurnal ratio; `market`,
/// `ref` and `retention` contribute a constant rate. A `limit` of zero means
/// the combined rate is not capped.
///
/// # Examples
///
/// ```
/// use traffic_speed::core::domain::Dot;
///
/// let dot = Dot { market: 1000.0, limit: 100.0, ..Dot::at(3600) };
/// assert_eq!(dot.effective_limit(), 100.0);
/// assert_eq!(Dot::at(0).effective_limit(), f64::INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dot {
    pub ts: i64,
    #[serde(default, deserialize_with = "deserialize_nullable_number")]
    pub seo: f64,
    #[serde(default, deserialize_with = "deserialize_nullable_number")]
    pub smm: f64,
    #[serde(default, deserialize_with = "deserialize_nullable_number")]
    pub mail: f64,
    #[serde(default, deserialize_with = "deserialize_nullable_number")]
    pub market: f64,
    #[serde(default, rename = "ref", deserialize_with = "deserialize_nullable_number")]
    pub referral: f64,
    #[serde(default, deserialize_with = "deserialize_nullable_number")]
    pub retention: f64,
    #[serde(default, deserialize_with = "deserialize_nullable_number")]
    pub limit: f64,
    /// Set on points synthesized during reconstruction.
    #[serde(skip)]
    pub phantom: bool,
}

impl Dot {
    /// An all-zero, unlimited dot at `ts`.
    pub fn at(ts: i64) -> Self {
        Self {
            ts,
            ..Self::default()
        }
    }

    /// A phantom copy of this dot's values at another instant.
    pub fn phantom_at(&self, ts: i64) -> Self {
        Self {
            ts,
            phantom: true,
            ..self.clone()
        }
    }

    /// The cap on the combined rate, `+inf` when no limit is configured.
    pub fn effective_limit(&self) -> f64 {
        if self.limit > 0.0 {
            self.limit
        } else {
            f64::INFINITY
        }
    }

    /// Sum of the channels that follow the diurnal ratio.
    pub fn modulated(&self) -> f64 {
        self.seo + self.smm + self.mail
    }

    /// Sum of the channels that ignore the diurnal ratio.
    pub fn constant(&self) -> f64 {
        self.market + self.referral + self.retention
    }

    /// Checks that every channel value and the limit are finite and non-negative.
    pub fn validate(&self) -> TrafficResult<()> {
        let fields = [
            ("seo", self.seo),
            ("smm", self.smm),
            ("mail", self.mail),
            ("market", self.market),
            ("ref", self.referral),
            ("retention", self.retention),
            ("limit", self.limit),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(TrafficError::invalid(format!(
                    "dot at ts={} has invalid {}: {}",
                    self.ts, name, value
                )));
            }
        }

        Ok(())
    }
}

/// Validates every dot of a series.
pub fn validate_dots(dots: &[Dot]) -> TrafficResult<()> {
    dots.iter().try_for_each(Dot::validate)
}

/// A traffic channel, as reported in rate samples and trend maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Generic,
    Total,
    Seo,
    Smm,
    Mail,
    Purchase,
    Swap,
    Retention,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::Generic,
        Channel::Total,
        Channel::Seo,
        Channel::Smm,
        Channel::Mail,
        Channel::Purchase,
        Channel::Swap,
        Channel::Retention,
    ];
}

/// Per-channel rates (visits per hour).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelRates {
    pub generic: f64,
    pub total: f64,
    pub seo: f64,
    pub smm: f64,
    pub mail: f64,
    pub purchase: f64,
    pub swap: f64,
    pub retention: f64,
}

impl ChannelRates {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Generic => self.generic,
            Channel::Total => self.total,
            Channel::Seo => self.seo,
            Channel::Smm => self.smm,
            Channel::Mail => self.mail,
            Channel::Purchase => self.purchase,
            Channel::Swap => self.swap,
            Channel::Retention => self.retention,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::Generic => &mut self.generic,
            Channel::Total => &mut self.total,
            Channel::Seo => &mut self.seo,
            Channel::Smm => &mut self.smm,
            Channel::Mail => &mut self.mail,
            Channel::Purchase => &mut self.purchase,
            Channel::Swap => &mut self.swap,
            Channel::Retention => &mut self.retention,
        }
    }
}

impl Add for ChannelRates {
    type Output = ChannelRates;

    fn add(mut self, rhs: ChannelRates) -> ChannelRates {
        self += rhs;
        self
    }
}

impl AddAssign for ChannelRates {
    fn add_assign(&mut self, rhs: ChannelRates) {
        for channel in Channel::ALL {
            *self.get_mut(channel) += rhs.get(channel);
        }
    }
}

/// The evaluated rate at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateSample {
    #[serde(flatten)]
    pub rates: ChannelRates,
    #[serde(rename = "isTrimmed")]
    pub is_trimmed: bool,
}

/// A chart point of the today/yesterday graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPoint {
    pub x: f64,
    pub y: f64,
    pub ts: i64,
    pub is_trimmed: bool,
    pub is_future: bool,
}

/// An instant at which the modulated rate enters or leaves the trimmed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitCrossing {
    pub ts: i64,
    pub is_trimmed: bool,
}

/// A point of the multi-site series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePoint {
    pub x: f64,
    pub y: f64,
    pub ts: i64,
    pub speed: ChannelRates,
    pub is_future: bool,
}

/// Which traffic day a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Today,
    Yesterday,
}

impl FromStr for Period {
    type Err = TrafficError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Period::Today),
            "yesterday" => Ok(Period::Yesterday),
            other => Err(TrafficError::invalid(format!(
                "unknown period '{}', expected 'today' or 'yesterday'",
                other
            ))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::Yesterday => write!(f, "yesterday"),
        }
    }
}

/// Direction of a fuzzy comparison, serialized as `-1`, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Trend {
    Down,
    Flat,
    Up,
}

impl From<Trend> for i8 {
    fn from(trend: Trend) -> i8 {
        match trend {
            Trend::Down => -1,
            Trend::Flat => 0,
            Trend::Up => 1,
        }
    }
}

impl TryFrom<i8> for Trend {
    type Error = TrafficError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Trend::Down),
            0 => Ok(Trend::Flat),
            1 => Ok(Trend::Up),
            other => Err(TrafficError::invalid(format!("trend out of range: {}", other))),
        }
    }
}

/// One trend per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendMap {
    pub generic: Trend,
    pub total: Trend,
    pub seo: Trend,
    pub smm: Trend,
    pub mail: Trend,
    pub purchase: Trend,
    pub swap: Trend,
    pub retention: Trend,
}

impl TrendMap {
    /// Builds a map by evaluating `f` for every channel.
    pub fn try_from_fn<F>(mut f: F) -> TrafficResult<Self>
    where
        F: FnMut(Channel) -> TrafficResult<Trend>,
    {
        Ok(Self {
            generic: f(Channel::Generic)?,
            total: f(Channel::Total)?,
            seo: f(Channel::Seo)?,
            smm: f(Channel::Smm)?,
            mail: f(Channel::Mail)?,
            purchase: f(Channel::Purchase)?,
            swap: f(Channel::Swap)?,
            retention: f(Channel::Retention)?,
        })
    }

    pub fn get(&self, channel: Channel) -> Trend {
        match channel {
            Channel::Generic => self.generic,
            Channel::Total => self.total,
            Channel::Seo => self.seo,
            Channel::Smm => self.smm,
            Channel::Mail => self.mail,
            Channel::Purchase => self.purchase,
            Channel::Swap => self.swap,
            Channel::Retention => self.retention,
        }
    }
}

/// The channel a traffic package feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    #[default]
    Purchase,
    Swap,
}

impl PackageKind {
    pub fn channel(&self) -> Channel {
        match self {
            PackageKind::Purchase => Channel::Purchase,
            PackageKind::Swap => Channel::Swap,
        }
    }
}

/// A purchased block of `count` visits spread over `duration` hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPackage {
    pub end_date: i64,
    pub count: f64,
    pub duration: f64,
    #[serde(default)]
    pub kind: PackageKind,
}

impl TrafficPackage {
    /// Hourly rate the package contributes while active: `round(count / duration)`.
    pub fn speed(&self) -> TrafficResult<f64> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(TrafficError::invalid(format!(
                "traffic package ending at {} has non-positive duration {}",
                self.end_date, self.duration
            )));
        }
        if !self.count.is_finite() {
            return Err(TrafficError::invalid(format!(
                "traffic package ending at {} has invalid count {}",
                self.end_date, self.count
            )));
        }

        Ok((self.count / self.duration).round())
    }
}

/// A tracked entity with its own dot series and purchased packages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    #[serde(rename = "siteSpeed", default)]
    pub site_speed: Vec<Dot>,
    #[serde(default)]
    pub traffic: Vec<TrafficPackage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_limits_and_sums() {
        let dot = Dot {
            seo: 1.0,
            smm: 2.0,
            mail: 3.0,
            market: 4.0,
            referral: 5.0,
            retention: 6.0,
            limit: 0.0,
            ..Dot::at(10)
        };

        assert_eq!(dot.modulated(), 6.0);
        assert_eq!(dot.constant(), 15.0);
        assert!(dot.effective_limit().is_infinite());

        let phantom = dot.phantom_at(20);
        assert!(phantom.phantom);
        assert_eq!(phantom.ts, 20);
        assert_eq!(phantom.market, 4.0);
    }

    #[test]
    fn test_dot_validation_rejects_bad_values() {
        assert!(Dot::at(0).validate().is_ok());
        assert!(Dot { seo: f64::NAN, ..Dot::at(0) }.validate().is_err());
        assert!(Dot { limit: -1.0, ..Dot::at(0) }.validate().is_err());
        assert!(validate_dots(&[Dot::at(0), Dot { market: f64::INFINITY, ..Dot::at(1) }]).is_err());
    }

    #[test]
    fn test_dot_deserializes_wire_names() {
        let dot: Dot = serde_json::from_str(
            r#"{"ts": 100, "seo": 1, "ref": 7, "limit": null, "retention": 2}"#,
        )
        .unwrap();

        assert_eq!(dot.ts, 100);
        assert_eq!(dot.referral, 7.0);
        assert_eq!(dot.limit, 0.0);
        assert_eq!(dot.smm, 0.0);
        assert!(!dot.phantom);
    }

    #[test]
    fn test_rate_sample_serializes_flat() {
        let sample = RateSample {
            rates: ChannelRates {
                total: 5.0,
                purchase: 5.0,
                ..ChannelRates::default()
            },
            is_trimmed: true,
        };
        let json = serde_json::to_value(sample).unwrap();

        assert_eq!(json["total"], 5.0);
        assert_eq!(json["isTrimmed"], true);
        assert!(json.get("rates").is_none());
    }

    #[test]
    fn test_channel_rates_add() {
        let a = ChannelRates { seo: 1.0, total: 1.0, ..ChannelRates::default() };
        let b = ChannelRates { seo: 2.0, swap: 3.0, total: 5.0, ..ChannelRates::default() };
        let sum = a + b;

        assert_eq!(sum.seo, 3.0);
        assert_eq!(sum.swap, 3.0);
        assert_eq!(sum.total, 6.0);
    }

    #[test]
    fn test_trend_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Trend::Down).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Trend>("1").unwrap(), Trend::Up);
        assert!(serde_json::from_str::<Trend>("2").is_err());
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("today".parse::<Period>().unwrap(), Period::Today);
        assert_eq!("yesterday".parse::<Period>().unwrap(), Period::Yesterday);
        assert!(matches!(
            "tomorrow".parse::<Period>(),
            Err(TrafficError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_package_speed() {
        let package = TrafficPackage { end_date: 0, count: 100.0, duration: 10.0, kind: PackageKind::Purchase };
        assert_eq!(package.speed().unwrap(), 10.0);

        let rounded = TrafficPackage { count: 100.0, duration: 3.0, ..package.clone() };
        assert_eq!(rounded.speed().unwrap(), 33.0);

        let broken = TrafficPackage { duration: 0.0, ..package };
        assert!(matches!(broken.speed(), Err(TrafficError::InvalidArgument(_))));
    }

    #[test]
    fn test_site_deserializes_wire_names() {
        let site: Site = serde_json::from_str(
            r#"{"id": 2, "siteSpeed": [{"ts": 1, "market": 5}], "traffic": [{"endDate": 7200, "count": 100, "duration": 10}]}"#,
        )
        .unwrap();

        assert_eq!(site.site_speed.len(), 1);
        assert_eq!(site.traffic[0].end_date, 7200);
        assert_eq!(site.traffic[0].kind, PackageKind::Purchase);
    }
}
