//! The aggregate verdict of one verification run.

use crate::collaborator::DocumentFields;
use crate::geo::GeoCheckResult;
use crate::identity::IdentityCheckResult;
use crate::radio::RadioCheckResult;
use crate::stage::{SkipReason, Stage};
use presence_types::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Processing,
    Verified,
    Failed,
    Error,
}

/// Everything a verification run decided. Built once per request and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub status: VerdictStatus,
    pub timestamp: Timestamp,
    pub geo: Stage<GeoCheckResult>,
    pub radio: Stage<RadioCheckResult>,
    pub identity: Stage<IdentityCheckResult>,
    /// Advisory only, never part of `overall_verified`.
    pub document: Stage<DocumentFields>,
    pub overall_verified: bool,
    /// Set only when `status` is `error`.
    pub error: Option<String>,
}

/// Whether every required stage passed.
///
/// Radio counts as passed when it was skipped for lack of an active beacon; any
/// other skip, including one caused by an upstream failure, counts as not passed.
pub fn overall_verified(
    geo: &Stage<GeoCheckResult>,
    radio: &Stage<RadioCheckResult>,
    identity: &Stage<IdentityCheckResult>,
) -> bool {
    let geo_passed = matches!(geo, Stage::Completed(g) if g.passed());
    let radio_passed = match radio {
        Stage::Completed(r) => r.present,
        Stage::Skipped {
            reason: SkipReason::NoActiveBeacon,
        } => true,
        Stage::Skipped { .. } | Stage::Failed { .. } => false,
    };
    let identity_passed = matches!(identity, Stage::Completed(i) if i.verified);

    geo_passed && radio_passed && identity_passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityMatchScorer, ThresholdMode};
    use crate::radio::RadioProximityScorer;
    use crate::GeoProximityScorer;
    use presence_types::Coordinate;

    fn geo(passed: bool) -> Stage<GeoCheckResult> {
        let a = Coordinate::new(19.0760, 72.8777);
        let radius = if passed { 50.0 } else { 0.001 };
        let b = Coordinate::new(19.0761, 72.8777);
        Stage::Completed(GeoProximityScorer::new().evaluate(&a, &b, radius))
    }

    fn radio(present: bool) -> Stage<RadioCheckResult> {
        let samples = if present { [-50, -50, -50] } else { [-90, -90, -90] };
        Stage::Completed(RadioProximityScorer::new().evaluate(&samples, -65).unwrap())
    }

    fn identity(verified: bool) -> Stage<IdentityCheckResult> {
        let distance = if verified { 0.2 } else { 1.5 };
        Stage::Completed(IdentityMatchScorer::new().evaluate(
            distance,
            "VGG-Face",
            ThresholdMode::VeryLenient,
        ))
    }

    #[test]
    fn all_required_stages_must_pass() {
        assert!(overall_verified(&geo(true), &radio(true), &identity(true)));
        assert!(!overall_verified(&geo(false), &radio(true), &identity(true)));
        assert!(!overall_verified(&geo(true), &radio(false), &identity(true)));
        assert!(!overall_verified(&geo(true), &radio(true), &identity(false)));
    }

    #[test]
    fn missing_beacon_is_the_only_acceptable_radio_skip() {
        let no_beacon = Stage::skipped(SkipReason::NoActiveBeacon);
        assert!(overall_verified(&geo(true), &no_beacon, &identity(true)));

        let upstream = Stage::skipped(SkipReason::GeoFailed);
        assert!(!overall_verified(&geo(true), &upstream, &identity(true)));

        let failed = Stage::failed("readings not provided");
        assert!(!overall_verified(&geo(true), &failed, &identity(true)));
    }

    #[test]
    fn skipped_identity_never_passes() {
        let skipped = Stage::skipped(SkipReason::RadioFailed);
        assert!(!overall_verified(&geo(true), &radio(true), &skipped));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&VerdictStatus::Verified).unwrap(), "\"verified\"");
        assert_eq!(serde_json::to_string(&VerdictStatus::Error).unwrap(), "\"error\"");
    }
}
