use presence_store::StoreError;
use presence_types::PresenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid radius: {0}")]
    InvalidRadius(f64),

    #[error("no RSSI readings provided")]
    EmptyInput,

    #[error("readings not provided")]
    ReadingsNotProvided,

    #[error("invalid beacon: {0}")]
    InvalidBeacon(String),

    #[error("no active beacon found for session {0}")]
    BeaconNotFound(String),

    #[error("beacon mismatch: scanned {scanned}, registered {registered}")]
    BeaconMismatch { scanned: String, registered: String },

    #[error("could not detect a face in one or both images")]
    FaceNotDetected,

    #[error("input not found: {0}")]
    InputNotFound(String),

    #[error("face matching unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a failure, deciding how the pipeline reacts to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed caller input. The stage fails and downstream stages are skipped.
    Input,
    /// An external collaborator failed. The stage degrades to not-verified.
    Collaborator,
    /// Anything else. The verdict status becomes `error`.
    Unexpected,
}

impl VerificationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidCoordinate(_)
            | Self::InvalidRadius(_)
            | Self::EmptyInput
            | Self::ReadingsNotProvided
            | Self::InvalidBeacon(_)
            | Self::BeaconNotFound(_)
            | Self::BeaconMismatch { .. }
            | Self::InputNotFound(_) => ErrorClass::Input,
            Self::FaceNotDetected | Self::CollaboratorUnavailable(_) => ErrorClass::Collaborator,
            Self::Store(_) | Self::Other(_) => ErrorClass::Unexpected,
        }
    }
}

impl From<PresenceError> for VerificationError {
    fn from(e: PresenceError) -> Self {
        match e {
            PresenceError::InvalidCoordinate(msg) => Self::InvalidCoordinate(msg),
            other => Self::Other(other.to_string()),
        }
    }
}
