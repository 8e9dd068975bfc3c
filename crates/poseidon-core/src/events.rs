//! Detected oceanographic events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of oceanographic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Residual energy at a tidal constituent period: the tide departs from
    /// the removed model in magnitude or phase
    TidalPhase,
    /// Slow, large sea-level excursion lasting hours
    StormSurge,
    /// Basin-resonant standing wave, minutes to tens of minutes
    Seiche,
    /// Flagged interval matching none of the above
    AnomalousWave,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::TidalPhase => write!(f, "Tidal Phase"),
            EventType::StormSurge => write!(f, "Storm Surge"),
            EventType::Seiche => write!(f, "Seiche"),
            EventType::AnomalousWave => write!(f, "Anomalous Wave"),
        }
    }
}

/// Ordered confidence scale, `Low < Medium < High`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

/// A typed event located on the input series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    /// Never before `start_time`
    pub end_time: DateTime<Utc>,
    pub peak_magnitude: f64,
    pub confidence: Confidence,
    pub supporting_features: BTreeMap<String, f64>,
}

impl DetectedEvent {
    /// Length of the event in hours
    pub fn duration_hours(&self) -> f64 {
        crate::series::hours_between(self.start_time, self.end_time)
    }

    /// Look up a supporting feature by name
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.supporting_features.get(name).copied()
    }

    /// Whether `instant` falls inside `[start_time, end_time]`
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant <= self.end_time
    }
}

impl fmt::Display for DetectedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ {} .. {}, peak: {:.3}, confidence: {} }}",
            self.event_type, self.start_time, self.end_time, self.peak_magnitude, self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(
            [Confidence::High, Confidence::Low, Confidence::Medium]
                .iter()
                .max(),
            Some(&Confidence::High)
        );
    }

    #[test]
    fn test_event_json_round_trip() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 14, 0, 0).unwrap();
        let mut features = BTreeMap::new();
        features.insert("duration_hours".to_string(), 3.5);
        features.insert("dominant_period_hours".to_string(), 6.1);
        let event = DetectedEvent {
            event_type: EventType::StormSurge,
            start_time: start,
            end_time: start + Duration::minutes(210),
            peak_magnitude: 0.734,
            confidence: Confidence::High,
            supporting_features: features,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"StormSurge""#));
        let back: DetectedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.duration_hours(), 3.5);
        assert_eq!(back.feature("dominant_period_hours"), Some(6.1));
        assert!(back.covers(start + Duration::hours(1)));
    }
}
