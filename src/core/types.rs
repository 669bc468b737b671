use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WaveError, WaveResult};

/// Absolute times are plain f64 unix epoch seconds throughout the crate.
#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}

/// Four-part channel key uniquely identifying a recording stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl ChannelId {
    pub fn new(
        network: impl Into<String>,
        station: impl Into<String>,
        location: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            network: network.into(),
            station: station.into(),
            location: location.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

/// Sample dtype tag. Carried through every operation, including ones that
/// produce zero samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dtype {
    #[default]
    F32,
    F64,
    I32,
}

/// Inclusive request range in epoch seconds, validated `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> WaveResult<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(WaveError::InvalidData(format!(
                "invalid time window: start={start}, end={end}"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Inclusive-boundary intersection test against another range.
    #[must_use]
    pub fn intersects(self, start: f64, end: f64) -> bool {
        start <= self.end && end >= self.start
    }

    #[must_use]
    pub fn contains(self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// A trim boundary: either a relative offset from the series edge or an
/// absolute timestamp. Disambiguated by variant, never by magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimPoint {
    /// Seconds relative to the series start (left trim) or end (right trim).
    Offset(f64),
    /// Absolute epoch seconds.
    Absolute(f64),
}

impl TrimPoint {
    /// Absolute trim point from a calendar timestamp.
    #[must_use]
    pub fn at(time: DateTime<Utc>) -> Self {
        Self::Absolute(datetime_to_unix_seconds(time))
    }
}

/// Snap tolerance in seconds, absorbing float drift across adjacent sample
/// boundaries (epoch-magnitude timestamps carry roughly 1e-7 s of rounding
/// error in f64).
const SNAP_TOLERANCE_SECONDS: f64 = 1e-7;

/// Converts a signed time offset into a signed whole-sample count.
///
/// The raw count `seconds * rate` is first snapped to the nearest integer
/// when it sits within tolerance of one. `nearest` then rounds half away
/// from zero; otherwise the count truncates toward negative infinity, so a
/// non-nearest trim snaps inward to the sample-aligned window contained in
/// the request (call sites negate to get inward drop counts).
#[must_use]
pub fn sample_delta(seconds: f64, rate: f64, nearest: bool) -> i64 {
    let raw = seconds * rate;
    let snapped = raw.round();
    let settled = if (raw - snapped).abs() <= SNAP_TOLERANCE_SECONDS * rate {
        snapped
    } else {
        raw
    };
    if nearest {
        settled.round() as i64
    } else {
        settled.floor() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeWindow, sample_delta};

    #[test]
    fn nearest_delta_rounds_half_away_from_zero() {
        assert_eq!(sample_delta(0.5, 1.0, true), 1);
        assert_eq!(sample_delta(-0.5, 1.0, true), -1);
        assert_eq!(sample_delta(2.1, 1.0, true), 2);
        assert_eq!(sample_delta(0.005, 200.0, true), 1);
    }

    #[test]
    fn non_nearest_delta_floors() {
        assert_eq!(sample_delta(0.11111, 50.0, false), 5);
        assert_eq!(sample_delta(-0.11111, 50.0, false), -6);
        assert_eq!(sample_delta(5.1, 200.0, false), 1020);
    }

    #[test]
    fn drifted_boundary_snaps_to_whole_sample() {
        let almost_six = 6.0 - 5.0e-8;
        assert_eq!(sample_delta(almost_six, 1.0, false), 6);
        assert_eq!(sample_delta(almost_six, 1.0, true), 6);
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(TimeWindow::new(10.0, 5.0).is_err());
        assert!(TimeWindow::new(5.0, 5.0).is_ok());
    }

    #[test]
    fn window_intersection_is_inclusive() {
        let w = TimeWindow::new(10.0, 20.0).expect("valid window");
        assert!(w.intersects(20.0, 30.0));
        assert!(w.intersects(0.0, 10.0));
        assert!(!w.intersects(20.1, 30.0));
    }
}
