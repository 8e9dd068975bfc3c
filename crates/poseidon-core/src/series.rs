//! Time-ordered sea-level samples
//!
//! A [`TimeSeries`] is immutable once constructed. Timestamps are strictly
//! increasing but need not be uniformly spaced; spectral and filtering stages
//! assume the dominant spacing reported by [`TimeSeries::sampling_interval`].

use crate::error::{Error, Result};
use crate::stats;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A single sea-level observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation instant
    pub timestamp: DateTime<Utc>,
    /// Sea level (metres, or whatever unit the caller ingests)
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered sequence of samples with unique, increasing timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Build a series, rejecting duplicate or out-of-order timestamps.
    ///
    /// Values are not checked here; stages fail with
    /// [`Error::NumericalFailure`] when they meet a non-finite value.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if let Some(i) = samples
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(Error::MalformedSeries(format!(
                "timestamp at index {} ({}) does not follow {}",
                i + 1,
                samples[i + 1].timestamp,
                samples[i].timestamp
            )));
        }
        Ok(Self { samples })
    }

    /// Build a uniformly spaced series starting at `start`
    pub fn from_values(start: DateTime<Utc>, interval: Duration, values: &[f64]) -> Result<Self> {
        if interval <= Duration::zero() {
            return Err(Error::MalformedSeries(format!(
                "sampling interval must be positive, got {interval}"
            )));
        }
        let mut samples = Vec::with_capacity(values.len());
        let mut timestamp = start;
        for (i, &value) in values.iter().enumerate() {
            if i > 0 {
                timestamp = timestamp.checked_add_signed(interval).ok_or_else(|| {
                    Error::MalformedSeries(format!(
                        "timestamp of sample {i} overflows: {start} + {i} x {interval}"
                    ))
                })?;
            }
            samples.push(Sample::new(timestamp, value));
        }
        Ok(Self { samples })
    }

    /// Series with the same timestamps and new values
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.samples.len() {
            return Err(Error::size_mismatch(
                self.samples.len(),
                values.len(),
                "derived series",
            ));
        }
        let samples = self
            .samples
            .iter()
            .zip(values)
            .map(|(s, value)| Sample::new(s.timestamp, value))
            .collect();
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Whether `instant` lies within `[start, end]`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => start <= instant && instant <= end,
            _ => false,
        }
    }

    /// Dominant sampling interval: the median of consecutive gaps
    pub fn sampling_interval(&self) -> Option<Duration> {
        if self.samples.len() < 2 {
            return None;
        }
        let gaps: Vec<f64> = self
            .samples
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64)
            .collect();
        let median = stats::median(&gaps)?;
        Some(Duration::milliseconds(median.round() as i64))
    }

    /// Dominant sampling interval in hours
    pub fn sampling_interval_hours(&self) -> Option<f64> {
        self.sampling_interval()
            .map(|d| d.num_milliseconds() as f64 / MILLIS_PER_HOUR)
    }

    /// Hours elapsed since the first sample, per sample
    pub fn elapsed_hours(&self) -> Vec<f64> {
        let Some(start) = self.start() else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|s| hours_between(start, s.timestamp))
            .collect()
    }

    /// Span between first and last sample in hours
    pub fn duration_hours(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => hours_between(start, end),
            _ => 0.0,
        }
    }

    /// Whether both series carry exactly the same timestamps
    pub fn is_aligned_with(&self, other: &TimeSeries) -> bool {
        self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(&other.samples)
                .all(|(a, b)| a.timestamp == b.timestamp)
    }
}

/// Signed hours from `from` to `to`
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

impl TryFrom<Vec<Sample>> for TimeSeries {
    type Error = Error;

    fn try_from(samples: Vec<Sample>) -> Result<Self> {
        TimeSeries::new(samples)
    }
}

impl From<TimeSeries> for Vec<Sample> {
    fn from(series: TimeSeries) -> Self {
        series.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let samples = vec![
            Sample::new(t0(), 1.0),
            Sample::new(t0() + Duration::minutes(10), 1.1),
            Sample::new(t0() + Duration::minutes(5), 1.2),
        ];
        let err = TimeSeries::new(samples).unwrap_err();
        assert!(matches!(err, Error::MalformedSeries(_)));
    }

    #[test]
    fn test_rejects_duplicate_timestamps() {
        let samples = vec![Sample::new(t0(), 1.0), Sample::new(t0(), 1.1)];
        assert!(TimeSeries::new(samples).is_err());
    }

    #[test]
    fn test_sampling_interval_is_median_gap() {
        // Gaps: 10, 10, 30, 10 minutes -> median 10
        let offsets = [0, 10, 20, 50, 60];
        let samples = offsets
            .iter()
            .map(|&m| Sample::new(t0() + Duration::minutes(m), 0.0))
            .collect();
        let series = TimeSeries::new(samples).unwrap();
        assert_eq!(series.sampling_interval(), Some(Duration::minutes(10)));
        assert_relative_eq!(series.sampling_interval_hours().unwrap(), 10.0 / 60.0);
        assert_relative_eq!(series.duration_hours(), 1.0);
    }

    #[test]
    fn test_from_values_and_elapsed_hours() {
        let series =
            TimeSeries::from_values(t0(), Duration::minutes(30), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.elapsed_hours(), vec![0.0, 0.5, 1.0, 1.5]);
        assert!(series.contains(t0() + Duration::minutes(45)));
        assert!(!series.contains(t0() + Duration::hours(2)));
    }

    #[test]
    fn test_with_values_keeps_timestamps() {
        let series = TimeSeries::from_values(t0(), Duration::hours(1), &[1.0, 2.0]).unwrap();
        let derived = series.with_values(vec![5.0, 6.0]).unwrap();
        assert!(series.is_aligned_with(&derived));
        assert_eq!(derived.values(), vec![5.0, 6.0]);
        assert!(series.with_values(vec![1.0]).is_err());
    }

    #[test]
    fn test_from_values_timestamp_overflow() {
        // The second sample lands in year ~152000, the third past chrono's range
        let interval = Duration::days(365 * 150_000);
        let err = TimeSeries::from_values(t0(), interval, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::MalformedSeries(_)));

        let two = TimeSeries::from_values(t0(), interval, &[1.0, 2.0]).unwrap();
        assert_eq!(two.len(), 2);
    }

    #[test]
    fn test_single_sample_has_no_interval() {
        let series = TimeSeries::from_values(t0(), Duration::hours(1), &[1.0]).unwrap();
        assert_eq!(series.sampling_interval(), None);
        assert_eq!(series.duration_hours(), 0.0);
    }

    #[test]
    fn test_deserialize_validates_order() {
        let json = r#"[
            {"timestamp":"2024-03-01T01:00:00Z","value":1.0},
            {"timestamp":"2024-03-01T00:00:00Z","value":2.0}
        ]"#;
        assert!(serde_json::from_str::<TimeSeries>(json).is_err());
    }
}
