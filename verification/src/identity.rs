//! Biometric identity match scoring.
//!
//! The face-matching collaborator produces an embedding distance; this module turns
//! it into a verified/not-verified decision, a confidence percentage and a quality
//! grade, using a per-model calibration table of four increasing distance ceilings.

use crate::geo::round_to;
use crate::VerificationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "VGG-Face";

/// Ceiling applied to every tier for models without a calibration table.
pub const DEFAULT_CEILING: f64 = 0.80;

/// Strictness tier selecting which ceiling gates verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    Strict,
    Normal,
    Lenient,
    /// Deliberately permissive, to keep false rejections of genuine claimants low.
    #[default]
    VeryLenient,
}

impl ThresholdMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Normal => "normal",
            Self::Lenient => "lenient",
            Self::VeryLenient => "very_lenient",
        }
    }
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdMode {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "normal" => Ok(Self::Normal),
            "lenient" => Ok(Self::Lenient),
            "very_lenient" => Ok(Self::VeryLenient),
            other => Err(VerificationError::Other(format!(
                "unknown threshold mode: {other}"
            ))),
        }
    }
}

/// Distance ceilings for one model, strictest first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub strict: f64,
    pub normal: f64,
    pub lenient: f64,
    pub very_lenient: f64,
}

/// Tuned for live selfie against a reference photo, looser than the models' defaults.
const CALIBRATIONS: &[(&str, Calibration)] = &[
    ("VGG-Face", Calibration::new(0.40, 0.60, 0.80, 0.95)),
    ("Facenet", Calibration::new(0.35, 0.55, 0.75, 0.95)),
    ("Facenet512", Calibration::new(0.30, 0.50, 0.70, 0.95)),
    ("OpenFace", Calibration::new(0.08, 0.15, 0.25, 0.40)),
    ("DeepFace", Calibration::new(0.15, 0.25, 0.40, 0.60)),
    ("DeepID", Calibration::new(0.08, 0.15, 0.25, 0.40)),
    ("ArcFace", Calibration::new(0.45, 0.60, 0.75, 0.95)),
    ("Dlib", Calibration::new(0.05, 0.08, 0.12, 0.20)),
    ("SFace", Calibration::new(0.45, 0.55, 0.65, 0.85)),
];

impl Calibration {
    pub const fn new(strict: f64, normal: f64, lenient: f64, very_lenient: f64) -> Self {
        Self {
            strict,
            normal,
            lenient,
            very_lenient,
        }
    }

    pub const fn uniform(ceiling: f64) -> Self {
        Self::new(ceiling, ceiling, ceiling, ceiling)
    }

    /// The table for `model`, or [`DEFAULT_CEILING`] on every tier for unknown models.
    pub fn for_model(model: &str) -> Self {
        CALIBRATIONS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, c)| *c)
            .unwrap_or(Self::uniform(DEFAULT_CEILING))
    }

    pub fn is_known_model(model: &str) -> bool {
        CALIBRATIONS.iter().any(|(name, _)| *name == model)
    }

    pub fn ceiling(&self, mode: ThresholdMode) -> f64 {
        match mode {
            ThresholdMode::Strict => self.strict,
            ThresholdMode::Normal => self.normal,
            ThresholdMode::Lenient => self.lenient,
            ThresholdMode::VeryLenient => self.very_lenient,
        }
    }

    /// Linear confidence: 100 at distance 0, 0 at or beyond the very-lenient ceiling.
    pub fn confidence_pct(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            100.0
        } else if distance >= self.very_lenient {
            0.0
        } else {
            round_to(((1.0 - distance / self.very_lenient) * 100.0).clamp(0.0, 100.0), 2)
        }
    }

    /// Grade by the first ceiling the distance falls under.
    pub fn match_quality(&self, distance: f64) -> MatchQuality {
        if distance <= self.strict {
            MatchQuality::Excellent
        } else if distance <= self.normal {
            MatchQuality::Good
        } else if distance <= self.lenient {
            MatchQuality::Fair
        } else if distance <= self.very_lenient {
            MatchQuality::Poor
        } else {
            MatchQuality::NoMatch
        }
    }
}

/// Human-interpretable grade of a match. Can disagree with `verified`, which is
/// gated by the requested mode's ceiling only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    NoMatch,
}

/// Outcome of one identity evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityCheckResult {
    /// Whether the comparison completed at all.
    pub success: bool,
    pub verified: bool,
    pub distance: Option<f64>,
    pub threshold: f64,
    pub threshold_mode: ThresholdMode,
    pub confidence_pct: f64,
    pub match_quality: MatchQuality,
    pub model: String,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMatchScorer;

impl IdentityMatchScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score an embedding distance produced by `model`, gated at `mode`'s ceiling.
    pub fn evaluate(&self, distance: f64, model: &str, mode: ThresholdMode) -> IdentityCheckResult {
        if !distance.is_finite() || distance < 0.0 {
            return self.failure(
                model,
                mode,
                &VerificationError::Other(format!("invalid embedding distance: {distance}")),
            );
        }

        let calibration = Calibration::for_model(model);
        let threshold = calibration.ceiling(mode);
        let distance = round_to(distance, 4);
        let verified = distance <= threshold;

        if verified {
            info!(distance, threshold, model, "face verification passed");
        } else {
            warn!(distance, threshold, model, "face verification failed");
        }

        IdentityCheckResult {
            success: true,
            verified,
            distance: Some(distance),
            threshold,
            threshold_mode: mode,
            confidence_pct: calibration.confidence_pct(distance),
            match_quality: calibration.match_quality(distance),
            model: model.to_string(),
            error: None,
        }
    }

    /// The result recorded when no distance could be obtained.
    pub fn failure(
        &self,
        model: &str,
        mode: ThresholdMode,
        error: &VerificationError,
    ) -> IdentityCheckResult {
        warn!(model, "face verification error: {error}");
        IdentityCheckResult {
            success: false,
            verified: false,
            distance: None,
            threshold: Calibration::for_model(model).ceiling(mode),
            threshold_mode: mode,
            confidence_pct: 0.0,
            match_quality: MatchQuality::NoMatch,
            model: model.to_string(),
            error: Some(error.to_string()),
        }
    }
}
