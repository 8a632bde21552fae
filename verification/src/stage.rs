//! Tagged per-stage outcomes recorded in a verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a stage did not run. Serialized as the same text `Display` prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Location proximity failed or could not be computed.
    #[serde(rename = "GPS check failed")]
    GeoFailed,
    /// A required radio check failed.
    #[serde(rename = "radio check failed")]
    RadioFailed,
    /// The session has no active beacon, so radio proximity is advisory.
    #[serde(rename = "no active beacon")]
    NoActiveBeacon,
    /// The request did not ask for this stage.
    #[serde(rename = "not requested")]
    NotRequested,
    /// The pipeline has no collaborator for this stage.
    #[serde(rename = "no extractor configured")]
    NoExtractor,
    /// An unexpected error aborted the run before this stage.
    #[serde(rename = "pipeline error")]
    PipelineError,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GeoFailed => "GPS check failed",
            Self::RadioFailed => "radio check failed",
            Self::NoActiveBeacon => "no active beacon",
            Self::NotRequested => "not requested",
            Self::NoExtractor => "no extractor configured",
            Self::PipelineError => "pipeline error",
        })
    }
}

/// The recorded outcome of one pipeline stage.
///
/// `Completed` means the stage ran and produced its result, which may itself be a
/// pass or a fail. `Failed` means the stage could not produce a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Stage<T> {
    Completed(T),
    Failed { reason: String },
    Skipped { reason: SkipReason },
}

impl<T> Stage<T> {
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped { reason } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::DocumentFields;

    #[test]
    fn skipped_stage_serializes_with_status_tag() {
        let stage: Stage<DocumentFields> = Stage::skipped(SkipReason::NoActiveBeacon);
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json, serde_json::json!({"status": "skipped", "reason": "no active beacon"}));
    }

    #[test]
    fn skip_reason_serializes_as_its_display_text() {
        let reasons = [
            SkipReason::GeoFailed,
            SkipReason::RadioFailed,
            SkipReason::NoActiveBeacon,
            SkipReason::NotRequested,
            SkipReason::NoExtractor,
            SkipReason::PipelineError,
        ];
        for reason in reasons {
            let json = serde_json::to_value(reason).unwrap();
            assert_eq!(json, serde_json::Value::String(reason.to_string()));
            let back: SkipReason = serde_json::from_value(json).unwrap();
            assert_eq!(back, reason);
        }

        let stage: Stage<DocumentFields> = Stage::skipped(SkipReason::GeoFailed);
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["reason"], "GPS check failed");
    }

    #[test]
    fn completed_stage_inlines_the_result() {
        let stage = Stage::Completed(DocumentFields {
            name: Some("Ada".into()),
            branch: None,
        });
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["name"], "Ada");

        let back: Stage<DocumentFields> = serde_json::from_value(json).unwrap();
        assert_eq!(back, stage);
    }

    #[test]
    fn accessors() {
        let failed: Stage<DocumentFields> = Stage::failed("readings not provided");
        assert!(failed.completed().is_none());
        assert!(!failed.is_skipped());
        assert_eq!(failed.skip_reason(), None);

        let skipped: Stage<DocumentFields> = Stage::skipped(SkipReason::GeoFailed);
        assert!(skipped.is_skipped());
        assert_eq!(skipped.skip_reason(), Some(SkipReason::GeoFailed));
        assert_eq!(SkipReason::GeoFailed.to_string(), "GPS check failed");
    }
}
