//! Scripted face matcher and document extractor.

use async_trait::async_trait;
use presence_verification::{
    DocumentExtractor, DocumentFields, ExtractionError, FaceMatchError, FaceMatcher,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded `distance` call: probe, reference, model.
pub type FaceMatchCall = (PathBuf, PathBuf, String);

/// A face matcher that answers every call with the same scripted outcome.
pub struct NullFaceMatcher {
    outcome: Result<f64, FaceMatchError>,
    calls: Mutex<Vec<FaceMatchCall>>,
}

impl NullFaceMatcher {
    /// Always report `distance`.
    pub fn returning(distance: f64) -> Self {
        Self::with_outcome(Ok(distance))
    }

    /// Always fail with `error`.
    pub fn failing(error: FaceMatchError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<f64, FaceMatchError>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<FaceMatchCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl FaceMatcher for NullFaceMatcher {
    async fn distance(
        &self,
        probe: &Path,
        reference: &Path,
        model: &str,
    ) -> Result<f64, FaceMatchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((probe.to_path_buf(), reference.to_path_buf(), model.to_string()));
        }
        self.outcome.clone()
    }
}

/// A document extractor that answers every call with the same scripted outcome.
pub struct NullDocumentExtractor {
    outcome: Result<DocumentFields, ExtractionError>,
    calls: Mutex<Vec<PathBuf>>,
}

impl NullDocumentExtractor {
    pub fn returning(fields: DocumentFields) -> Self {
        Self {
            outcome: Ok(fields),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ExtractionError) -> Self {
        Self {
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Images passed to `extract` so far.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DocumentExtractor for NullDocumentExtractor {
    async fn extract(&self, image: &Path) -> Result<DocumentFields, ExtractionError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(image.to_path_buf());
        }
        self.outcome.clone()
    }
}
