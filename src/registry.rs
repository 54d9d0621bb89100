//! Latest-release lookup against the Maven Central registry.
//!
//! The augmentor only depends on the [`VersionResolver`] capability; the
//! HTTP client here is one implementation of it, and tests substitute
//! canned resolvers. One blocking request per lookup, bounded by the
//! agent-wide timeout, no retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ureq::Agent;

/// Endpoint backing the version lookup.
pub const CENTRAL_REGISTRY_URL: &str =
    "https://central.sonatype.com/api/internal/browse/components";

/// Single-method lookup capability: latest known release for an artifactId.
pub trait VersionResolver {
    fn latest_release_version(&self, artifact_id: &str) -> Result<String, ResolveError>;
}

/// Why a lookup failed. The two kinds stay distinguishable so callers can
/// report an unknown artifact differently from a broken network.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{artifact_id} does not exist in the registry")]
    NotFound { artifact_id: String },
    #[error("registry request failed: {0}")]
    Transport(String),
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "searchTerm")]
    search_term: &'a str,
    size: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "totalResultCount")]
    total: u64,
    #[serde(default)]
    components: Vec<Component>,
}

#[derive(Deserialize)]
struct Component {
    #[serde(rename = "latestVersionInfo")]
    latest_release: VersionInfo,
}

#[derive(Deserialize)]
struct VersionInfo {
    version: String,
}

/// Resolver backed by the Sonatype Central browse endpoint.
pub struct CentralRegistryClient {
    agent: Agent,
    url: String,
}

impl CentralRegistryClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_url(CENTRAL_REGISTRY_URL.to_string(), timeout)
    }

    /// Point the client at a different endpoint, mainly for tests.
    pub fn with_url(url: String, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: Agent::new_with_config(config),
            url,
        }
    }
}

impl VersionResolver for CentralRegistryClient {
    fn latest_release_version(&self, artifact_id: &str) -> Result<String, ResolveError> {
        let request = SearchRequest {
            search_term: artifact_id,
            size: 1,
        };
        let mut response = self
            .agent
            .post(&self.url)
            .send_json(&request)
            .map_err(transport_error)?;
        let payload: SearchResponse = response
            .body_mut()
            .read_json()
            .map_err(transport_error)?;
        version_from_response(payload, artifact_id)
    }
}

fn transport_error(err: ureq::Error) -> ResolveError {
    match err {
        ureq::Error::StatusCode(code) => {
            ResolveError::Transport(format!("unexpected status code {code}"))
        }
        other => ResolveError::Transport(other.to_string()),
    }
}

fn version_from_response(
    payload: SearchResponse,
    artifact_id: &str,
) -> Result<String, ResolveError> {
    if payload.total == 0 {
        return Err(ResolveError::NotFound {
            artifact_id: artifact_id.to_string(),
        });
    }
    payload
        .components
        .into_iter()
        .next()
        .map(|component| component.latest_release.version)
        .ok_or_else(|| ResolveError::NotFound {
            artifact_id: artifact_id.to_string(),
        })
}
