//! Short-range radio proximity from a burst of RSSI samples.
//!
//! The samples are reduced to one central estimate (the mode, or the rounded mean
//! when no unique mode exists) and classified against the registered threshold and
//! fixed signal-quality cut points.

use crate::VerificationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Default minimum acceptable RSSI in dBm.
pub const DEFAULT_RSSI_THRESHOLD: i32 = -65;

/// Absolute signal strength, independent of the pass/fail threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    /// Classify an RSSI value (dBm) against the fixed cut points -50 / -65 / -80.
    pub fn from_rssi(rssi: i32) -> Self {
        if rssi >= -50 {
            Self::Excellent
        } else if rssi >= -65 {
            Self::Good
        } else if rssi >= -80 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reliability of the central estimate, from the number of samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleConfidence {
    High,
    Medium,
    Low,
}

impl SampleConfidence {
    pub fn from_sample_count(count: usize) -> Self {
        match count {
            n if n >= 5 => Self::High,
            n if n >= 3 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Outcome of one radio proximity evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioCheckResult {
    pub present: bool,
    pub rssi_central: i32,
    pub threshold: i32,
    pub signal_quality: SignalQuality,
    pub confidence: SampleConfidence,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RadioProximityScorer;

impl RadioProximityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Classify `samples` against `threshold` (a minimum acceptable strength in dBm).
    pub fn evaluate(
        &self,
        samples: &[i32],
        threshold: i32,
    ) -> Result<RadioCheckResult, VerificationError> {
        let rssi_central = central_estimate(samples)?;
        let present = rssi_central >= threshold;
        let signal_quality = SignalQuality::from_rssi(rssi_central);
        let confidence = SampleConfidence::from_sample_count(samples.len());

        let message = if present {
            info!(rssi_central, threshold, %signal_quality, "radio proximity passed");
            "Within range of the session beacon"
        } else {
            warn!(rssi_central, threshold, "radio proximity failed");
            "Too far from the session beacon or signal blocked"
        };

        Ok(RadioCheckResult {
            present,
            rssi_central,
            threshold,
            signal_quality,
            confidence,
            message: message.to_string(),
        })
    }
}

/// Reduce RSSI samples to one value.
///
/// Returns the unique most frequent value. When several values tie for the highest
/// count (including the all-distinct case), falls back to the arithmetic mean rounded
/// half away from zero.
pub fn central_estimate(samples: &[i32]) -> Result<i32, VerificationError> {
    if samples.is_empty() {
        return Err(VerificationError::EmptyInput);
    }

    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for &s in samples {
        *counts.entry(s).or_default() += 1;
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    let mut modes = counts.iter().filter(|&(_, &c)| c == max_count).map(|(&v, _)| v);

    match (modes.next(), modes.next()) {
        (Some(mode), None) => Ok(mode),
        _ => {
            let sum: i64 = samples.iter().map(|&s| i64::from(s)).sum();
            let mean = (sum as f64 / samples.len() as f64).round() as i32;
            debug!(mean, "no unique RSSI mode, using rounded mean");
            Ok(mean)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_with_three_samples() {
        let result = RadioProximityScorer::new()
            .evaluate(&[-45, -48, -45], -65)
            .unwrap();
        assert_eq!(result.rssi_central, -45);
        assert!(result.present);
        assert_eq!(result.signal_quality, SignalQuality::Excellent);
        assert_eq!(result.confidence, SampleConfidence::Medium);
        assert_eq!(result.threshold, -65);
    }

    #[test]
    fn empty_samples_are_rejected() {
        let err = RadioProximityScorer::new().evaluate(&[], -65).unwrap_err();
        assert!(matches!(err, VerificationError::EmptyInput));
    }

    #[test]
    fn single_outlier_does_not_move_the_mode() {
        assert_eq!(central_estimate(&[-60, -60, -60, -95, -61]).unwrap(), -60);
    }

    #[test]
    fn all_distinct_falls_back_to_rounded_mean() {
        // mean -45.5 rounds away from zero
        assert_eq!(central_estimate(&[-45, -46]).unwrap(), -46);
        // mean -61.333.. rounds to -61
        assert_eq!(central_estimate(&[-60, -61, -63]).unwrap(), -61);
    }

    #[test]
    fn multimodal_falls_back_to_mean() {
        // -50 and -70 both appear twice; mean is -60
        assert_eq!(central_estimate(&[-50, -70, -50, -70]).unwrap(), -60);
    }

    #[test]
    fn single_sample_is_its_own_estimate() {
        assert_eq!(central_estimate(&[-72]).unwrap(), -72);
    }

    #[test]
    fn threshold_is_inclusive() {
        let scorer = RadioProximityScorer::new();
        assert!(scorer.evaluate(&[-65], -65).unwrap().present);
        assert!(!scorer.evaluate(&[-66], -65).unwrap().present);
    }

    #[test]
    fn quality_cut_points() {
        assert_eq!(SignalQuality::from_rssi(-50), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_rssi(-51), SignalQuality::Good);
        assert_eq!(SignalQuality::from_rssi(-65), SignalQuality::Good);
        assert_eq!(SignalQuality::from_rssi(-80), SignalQuality::Fair);
        assert_eq!(SignalQuality::from_rssi(-81), SignalQuality::Poor);
    }

    #[test]
    fn confidence_tiers() {
        assert_eq!(SampleConfidence::from_sample_count(1), SampleConfidence::Low);
        assert_eq!(SampleConfidence::from_sample_count(2), SampleConfidence::Low);
        assert_eq!(SampleConfidence::from_sample_count(3), SampleConfidence::Medium);
        assert_eq!(SampleConfidence::from_sample_count(4), SampleConfidence::Medium);
        assert_eq!(SampleConfidence::from_sample_count(5), SampleConfidence::High);
    }

    #[test]
    fn quality_is_independent_of_threshold() {
        let result = RadioProximityScorer::new().evaluate(&[-48; 5], -40).unwrap();
        assert!(!result.present);
        assert_eq!(result.signal_quality, SignalQuality::Excellent);
        assert_eq!(result.confidence, SampleConfidence::High);
    }
}
