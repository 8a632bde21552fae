//! Fail-fast verification pipeline.
//!
//! Stages run in strict order, each one terminal on failure:
//!
//! ```text
//! Geo ──► Radio ──► Identity ──► Document ──► Done
//!  │        │
//!  └────────┴──► Done (downstream stages Skipped)
//! ```
//!
//! Radio is only required when the session has an active beacon registration.
//! The document stage is advisory and never affects `overall_verified`.

use crate::collaborator::{DocumentExtractor, DocumentFields, FaceMatcher};
use crate::error::ErrorClass;
use crate::geo::{GeoCheckResult, GeoProximityScorer};
use crate::identity::{IdentityCheckResult, IdentityMatchScorer, ThresholdMode, DEFAULT_MODEL};
use crate::radio::{RadioCheckResult, RadioProximityScorer};
use crate::stage::{SkipReason, Stage};
use crate::verdict::{overall_verified, VerdictStatus, VerificationVerdict};
use crate::VerificationError;
use presence_store::BeaconRegistry;
use presence_types::{BeaconRegistration, Coordinate, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// Default allowed distance between registrar and claimant, in meters.
pub const DEFAULT_RADIUS_M: f64 = 50.0;

/// Static settings shared by every run of a pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub face_model: String,
    pub threshold_mode: ThresholdMode,
    pub default_radius_m: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            face_model: DEFAULT_MODEL.to_string(),
            threshold_mode: ThresholdMode::default(),
            default_radius_m: DEFAULT_RADIUS_M,
        }
    }
}

/// One attendance claim to verify.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Where the registrar (session owner) is.
    pub anchor: Coordinate,
    /// Where the claimant says they are.
    pub claimant: Coordinate,
    /// Overrides the pipeline's default radius.
    #[serde(default)]
    pub radius_m: Option<f64>,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Beacon id the claimant's device scanned.
    #[serde(default)]
    pub beacon_id: Option<String>,
    #[serde(default)]
    pub rssi_samples: Option<Vec<i32>>,
    /// Live capture of the claimant.
    pub probe_image: PathBuf,
    /// Reference photo on file for the claimant.
    pub reference_image: PathBuf,
    #[serde(default)]
    pub document_image: Option<PathBuf>,
}

/// Position of a run in the stage sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Geo,
    Radio,
    Identity,
    Document,
    Done,
}

/// Stage results gathered during one run. Each stage is recorded at most once.
struct Draft {
    timestamp: Timestamp,
    geo: Option<Stage<GeoCheckResult>>,
    radio: Option<Stage<RadioCheckResult>>,
    identity: Option<Stage<IdentityCheckResult>>,
    document: Option<Stage<DocumentFields>>,
    error: Option<String>,
}

impl Draft {
    fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            geo: None,
            radio: None,
            identity: None,
            document: None,
            error: None,
        }
    }

    /// Mark every stage not yet recorded as skipped.
    fn skip_remaining(&mut self, reason: SkipReason) {
        self.geo.get_or_insert(Stage::skipped(reason));
        self.radio.get_or_insert(Stage::skipped(reason));
        self.identity.get_or_insert(Stage::skipped(reason));
        self.document.get_or_insert(Stage::skipped(reason));
    }

    fn finish(self) -> VerificationVerdict {
        fn unreached<T>() -> Stage<T> {
            Stage::skipped(SkipReason::PipelineError)
        }
        let geo = self.geo.unwrap_or_else(unreached);
        let radio = self.radio.unwrap_or_else(unreached);
        let identity = self.identity.unwrap_or_else(unreached);
        let document = self.document.unwrap_or_else(unreached);

        let (status, overall) = match self.error {
            Some(_) => (VerdictStatus::Error, false),
            None if overall_verified(&geo, &radio, &identity) => (VerdictStatus::Verified, true),
            None => (VerdictStatus::Failed, false),
        };

        VerificationVerdict {
            status,
            timestamp: self.timestamp,
            geo,
            radio,
            identity,
            document,
            overall_verified: overall,
            error: self.error,
        }
    }
}

/// Runs the geo, radio and identity checks for one claim and folds them into a verdict.
///
/// The scorers are pure, so one pipeline can serve concurrent requests; the only
/// shared state is the beacon registry, which a run only reads.
pub struct VerificationPipeline {
    config: PipelineConfig,
    registry: Arc<dyn BeaconRegistry>,
    face_matcher: Arc<dyn FaceMatcher>,
    extractor: Option<Arc<dyn DocumentExtractor>>,
    geo: GeoProximityScorer,
    radio: RadioProximityScorer,
    identity: IdentityMatchScorer,
}

impl VerificationPipeline {
    pub fn new(
        config: PipelineConfig,
        registry: Arc<dyn BeaconRegistry>,
        face_matcher: Arc<dyn FaceMatcher>,
    ) -> Self {
        Self {
            config,
            registry,
            face_matcher,
            extractor: None,
            geo: GeoProximityScorer::new(),
            radio: RadioProximityScorer::new(),
            identity: IdentityMatchScorer::new(),
        }
    }

    /// Enable the advisory document stage.
    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn BeaconRegistry {
        self.registry.as_ref()
    }

    /// Verify one claim. Never fails: every error ends up in the verdict.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationVerdict {
        let session = request
            .session_id
            .as_ref()
            .map(SessionId::to_string)
            .unwrap_or_default();
        let span = info_span!("verification", session = %session);

        async move {
            let mut draft = Draft::new(Timestamp::now());
            let mut state = PipelineState::Geo;

            while state != PipelineState::Done {
                state = match self.advance(state, request, &mut draft).await {
                    Ok(next) => next,
                    Err(e) => {
                        error!("verification error: {e}");
                        draft.error = Some(e.to_string());
                        draft.skip_remaining(SkipReason::PipelineError);
                        PipelineState::Done
                    }
                };
            }

            let verdict = draft.finish();
            match verdict.status {
                VerdictStatus::Verified => info!("attendance verification passed"),
                _ => warn!(status = ?verdict.status, "attendance verification did not pass"),
            }
            verdict
        }
        .instrument(span)
        .await
    }

    /// Run the stage for `state`, record its outcome and return the next state.
    async fn advance(
        &self,
        state: PipelineState,
        request: &VerificationRequest,
        draft: &mut Draft,
    ) -> Result<PipelineState, VerificationError> {
        let next = match state {
            PipelineState::Geo => self.geo_stage(request, draft),
            PipelineState::Radio => self.radio_stage(request, draft)?,
            PipelineState::Identity => {
                self.identity_stage(request, draft).await;
                PipelineState::Document
            }
            PipelineState::Document => {
                self.document_stage(request, draft).await;
                PipelineState::Done
            }
            PipelineState::Done => PipelineState::Done,
        };
        Ok(next)
    }

    fn geo_stage(&self, request: &VerificationRequest, draft: &mut Draft) -> PipelineState {
        let radius_m = request.radius_m.unwrap_or(self.config.default_radius_m);
        let result = self.geo.evaluate(&request.anchor, &request.claimant, radius_m);
        let passed = result.passed();
        draft.geo = Some(Stage::Completed(result));

        if passed {
            PipelineState::Radio
        } else {
            warn!("GPS check failed, skipping further processing");
            draft.skip_remaining(SkipReason::GeoFailed);
            PipelineState::Done
        }
    }

    fn radio_stage(
        &self,
        request: &VerificationRequest,
        draft: &mut Draft,
    ) -> Result<PipelineState, VerificationError> {
        let registration = match &request.session_id {
            Some(session_id) => self.registry.get_active(session_id)?,
            None => None,
        };
        let Some(registration) = registration else {
            info!("no active beacon for session, radio check skipped");
            draft.radio = Some(Stage::skipped(SkipReason::NoActiveBeacon));
            return Ok(PipelineState::Identity);
        };

        match self.evaluate_radio(request, &registration) {
            Ok(result) => {
                let present = result.present;
                draft.radio = Some(Stage::Completed(result));
                if present {
                    Ok(PipelineState::Identity)
                } else {
                    draft.skip_remaining(SkipReason::RadioFailed);
                    Ok(PipelineState::Done)
                }
            }
            Err(e) if e.class() == ErrorClass::Unexpected => Err(e),
            Err(e) => {
                warn!("radio check failed: {e}");
                draft.radio = Some(Stage::failed(e.to_string()));
                draft.skip_remaining(SkipReason::RadioFailed);
                Ok(PipelineState::Done)
            }
        }
    }

    fn evaluate_radio(
        &self,
        request: &VerificationRequest,
        registration: &BeaconRegistration,
    ) -> Result<RadioCheckResult, VerificationError> {
        if let Some(scanned) = &request.beacon_id {
            if !registration.matches_beacon(scanned) {
                return Err(VerificationError::BeaconMismatch {
                    scanned: scanned.clone(),
                    registered: registration.beacon_id.clone(),
                });
            }
        }
        let samples = request
            .rssi_samples
            .as_deref()
            .ok_or(VerificationError::ReadingsNotProvided)?;
        self.radio.evaluate(samples, registration.threshold)
    }

    async fn identity_stage(&self, request: &VerificationRequest, draft: &mut Draft) {
        let model = self.config.face_model.as_str();
        let mode = self.config.threshold_mode;

        let result = match self
            .face_matcher
            .distance(&request.probe_image, &request.reference_image, model)
            .await
        {
            Ok(distance) => self.identity.evaluate(distance, model, mode),
            Err(e) => self.identity.failure(model, mode, &VerificationError::from(e)),
        };
        draft.identity = Some(Stage::Completed(result));
    }

    async fn document_stage(&self, request: &VerificationRequest, draft: &mut Draft) {
        let stage = match (&request.document_image, &self.extractor) {
            (None, _) => Stage::skipped(SkipReason::NotRequested),
            (Some(_), None) => Stage::skipped(SkipReason::NoExtractor),
            (Some(image), Some(extractor)) => match extractor.extract(image).await {
                Ok(fields) => Stage::Completed(fields),
                Err(e) => {
                    warn!("document extraction failed: {e}");
                    Stage::failed(e.to_string())
                }
            },
        };
        draft.document = Some(stage);
    }
}
