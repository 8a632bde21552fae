//! Face matching through a remote face-embedding service.
//!
//! Wire contract: `POST {base_url}/verify` with
//! `{"probe_image": <base64>, "reference_image": <base64>, "model": <name>}`,
//! answered by `{"distance": <f64>}`. The service answers 422 when it cannot
//! find a face in one of the images.

use crate::{http_client, read_base64, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use presence_verification::{FaceMatchError, FaceMatcher};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    probe_image: String,
    reference_image: String,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    distance: f64,
}

/// [`FaceMatcher`] backed by a remote face-embedding service.
///
/// Without a base URL every call reports the collaborator as unavailable, which the
/// pipeline records as a not-verified identity stage.
pub struct RemoteFaceMatcher {
    http_client: reqwest::Client,
    base_url: Option<String>,
}

impl RemoteFaceMatcher {
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            http_client: http_client(timeout),
            base_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }
}

#[async_trait]
impl FaceMatcher for RemoteFaceMatcher {
    async fn distance(
        &self,
        probe: &Path,
        reference: &Path,
        model: &str,
    ) -> Result<f64, FaceMatchError> {
        let Some(base_url) = &self.base_url else {
            return Err(FaceMatchError::Unavailable(
                "face matching service is not configured".into(),
            ));
        };

        let body = VerifyRequest {
            probe_image: read_image(probe).await?,
            reference_image: read_image(reference).await?,
            model,
        };
        let url = format!("{}/verify", base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FaceMatchError::Unavailable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    FaceMatchError::Unavailable(format!("connection failed: {e}"))
                } else {
                    FaceMatchError::Unavailable(e.to_string())
                }
            })?;

        if let Some(err) = status_error(response.status()) {
            warn!(status = %response.status(), "face matching service rejected the request");
            return Err(err);
        }

        let parsed: VerifyResponse = response.json().await.map_err(|e| {
            FaceMatchError::Unavailable(format!("failed to parse face matching response: {e}"))
        })?;
        debug!(distance = parsed.distance, model, "face matching service answered");
        Ok(parsed.distance)
    }
}

async fn read_image(path: &Path) -> Result<String, FaceMatchError> {
    read_base64(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FaceMatchError::InputNotFound(path.display().to_string()),
        _ => FaceMatchError::InputNotFound(format!("{}: {e}", path.display())),
    })
}

/// Map a non-success HTTP status to a matcher error.
fn status_error(status: StatusCode) -> Option<FaceMatchError> {
    if status.is_success() {
        None
    } else if status == StatusCode::UNPROCESSABLE_ENTITY {
        Some(FaceMatchError::FaceNotDetected)
    } else {
        Some(FaceMatchError::Unavailable(format!("HTTP status {status}")))
    }
}
