//! HTTP-backed collaborators for presence verification.
//!
//! - [`geolocation`]: coarse "where am I" lookup by public IP, used to seed the
//!   registrar's anchor coordinate.
//! - [`face`]: a [`FaceMatcher`](presence_verification::FaceMatcher) that asks a
//!   remote face-embedding service for the distance between two images.
//! - [`extraction`]: a [`DocumentExtractor`](presence_verification::DocumentExtractor)
//!   backed by an OpenAI-compatible vision chat-completions endpoint.

pub mod error;
pub mod extraction;
pub mod face;
pub mod geolocation;

pub use error::GeolocationError;
pub use extraction::ChatCompletionsExtractor;
pub use face::RemoteFaceMatcher;
pub use geolocation::{IpApiClient, IpGeolocator, IpLocation};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Default timeout for collaborator requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a reusable HTTP client with the given overall request timeout.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
        .build()
        .unwrap_or_default()
}

/// Read an image file and encode it as standard base64.
pub(crate) async fn read_base64(path: &Path) -> io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(STANDARD.encode(bytes))
}
