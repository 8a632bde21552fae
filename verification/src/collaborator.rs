//! Contracts for the external collaborators the pipeline calls out to.
//!
//! The pipeline never computes embeddings or reads documents itself. It asks a
//! [`FaceMatcher`] for an embedding distance and, optionally, a [`DocumentExtractor`]
//! for identity fields. HTTP-backed implementations live in `presence-services`;
//! scripted ones live in `presence-nullables`.

use crate::VerificationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Failure modes of a face-matching collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaceMatchError {
    #[error("could not detect a face in one or both images")]
    FaceNotDetected,

    #[error("input not found: {0}")]
    InputNotFound(String),

    #[error("face matching unavailable: {0}")]
    Unavailable(String),
}

impl From<FaceMatchError> for VerificationError {
    fn from(e: FaceMatchError) -> Self {
        match e {
            FaceMatchError::FaceNotDetected => Self::FaceNotDetected,
            FaceMatchError::InputNotFound(path) => Self::InputNotFound(path),
            FaceMatchError::Unavailable(msg) => Self::CollaboratorUnavailable(msg),
        }
    }
}

/// Computes the embedding distance between the faces in two images.
#[async_trait]
pub trait FaceMatcher: Send + Sync {
    /// Distance (>= 0) between the face in `probe` and the face in `reference`,
    /// as measured by the named model.
    async fn distance(
        &self,
        probe: &Path,
        reference: &Path,
        model: &str,
    ) -> Result<f64, FaceMatchError>;
}

/// Identity fields read off a document image. Either field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    pub name: Option<String>,
    pub branch: Option<String>,
}

/// Failure modes of a document-field-extraction collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("document extraction is not configured")]
    NotConfigured,

    #[error("image not found: {0}")]
    InputNotFound(String),

    #[error("extraction request failed: {0}")]
    Request(String),

    #[error("failed to parse extracted data: {0}")]
    Parse(String),
}

/// Reads identity fields off a document image.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, image: &Path) -> Result<DocumentFields, ExtractionError>;
}
