//! Multi-signal attendance presence verification.
//!
//! Three independent, imperfect signals are scored separately:
//! 1. **Geo**: geodesic distance between registrar and claimant against a radius.
//! 2. **Radio**: RSSI samples from the session beacon against a registered threshold.
//! 3. **Identity**: a face-embedding distance against a per-model calibration table.
//!
//! The [`VerificationPipeline`] runs them in that order, stops at the first failure,
//! and folds every stage outcome into one immutable [`VerificationVerdict`].
//!
//! Face matching and document reading are delegated to collaborators behind the
//! traits in [`collaborator`]; beacon registrations come from a
//! [`presence_store::BeaconRegistry`].

pub mod beacon;
pub mod collaborator;
pub mod error;
pub mod geo;
pub mod identity;
pub mod pipeline;
pub mod radio;
pub mod stage;
pub mod verdict;

pub use beacon::{check_beacon_proximity, register_beacon};
pub use collaborator::{
    DocumentExtractor, DocumentFields, ExtractionError, FaceMatchError, FaceMatcher,
};
pub use error::{ErrorClass, VerificationError};
pub use geo::{GeoCheckResult, GeoProximityScorer};
pub use identity::{
    Calibration, IdentityCheckResult, IdentityMatchScorer, MatchQuality, ThresholdMode,
};
pub use pipeline::{PipelineConfig, PipelineState, VerificationPipeline, VerificationRequest};
pub use radio::{
    RadioCheckResult, RadioProximityScorer, SampleConfidence, SignalQuality,
    DEFAULT_RSSI_THRESHOLD,
};
pub use stage::{SkipReason, Stage};
pub use verdict::{VerdictStatus, VerificationVerdict};
