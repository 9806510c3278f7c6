use crate::config::ApiConfig;
use crate::domain::AnimeId;
use crate::models::RawAnime;
use crate::models::recommendation::{RawRecommendation, Recommendation};
use crate::services::normalizer::{NormalizeError, classify};
use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Failures of a single catalog request.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{endpoint} request timed out")]
    Timeout { endpoint: &'static str },

    #[error("{endpoint} request failed: {message}")]
    Fetch {
        endpoint: &'static str,
        message: String,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("{endpoint} returned an unusable payload: {message}")]
    InvalidInput {
        endpoint: &'static str,
        message: String,
    },
}

impl CatalogError {
    /// Whether trying the same request again can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Fetch { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidInput { .. } => false,
        }
    }

    fn from_reqwest(endpoint: &'static str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { endpoint }
        } else {
            Self::Fetch {
                endpoint,
                message: err.to_string(),
            }
        }
    }

    fn from_normalize(endpoint: &'static str, err: NormalizeError) -> Self {
        let NormalizeError::InvalidInput(message) = err;
        Self::InvalidInput { endpoint, message }
    }
}

/// Source of detail and recommendation data for the detail page.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetches and classifies the detail payload for `id`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Timeout`] / [`CatalogError::Fetch`] on transport failures
    /// - [`CatalogError::Status`] on a non-success response
    /// - [`CatalogError::InvalidInput`] if the payload matches neither shape
    async fn fetch_detail(&self, id: &AnimeId) -> Result<RawAnime, CatalogError>;

    /// Fetches the recommendations listed for `id`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`CatalogApi::fetch_detail`]; a body that is not an
    /// array is [`CatalogError::InvalidInput`].
    async fn fetch_recommendations(&self, id: &AnimeId)
    -> Result<Vec<Recommendation>, CatalogError>;
}

const DETAILS: &str = "details";
const RECOMMENDATIONS: &str = "recommendations";

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    detail_timeout: Duration,
    recommendations_timeout: Duration,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build catalog HTTP client")?;

        Self::with_shared_client(client, config)
    }

    pub fn with_shared_client(client: Client, config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot be used as a base: {}", config.base_url);
        }

        Ok(Self {
            client,
            base_url,
            detail_timeout: config.detail_timeout(),
            recommendations_timeout: config.recommendations_timeout(),
        })
    }

    #[must_use]
    pub fn with_timeouts(mut self, detail: Duration, recommendations: Duration) -> Self {
        self.detail_timeout = detail;
        self.recommendations_timeout = recommendations;
        self
    }

    /// `{base}/{endpoint}?{key}={value}`, keeping any path the base already has.
    fn endpoint_url(&self, endpoint: &str, key: &str, value: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        url.query_pairs_mut().append_pair(key, value);
        url
    }

    async fn get_json(
        &self,
        endpoint: &'static str,
        url: Url,
        timeout: Duration,
    ) -> Result<Value, CatalogError> {
        debug!(%url, "Fetching {endpoint}");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| CatalogError::from_reqwest(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::from_reqwest(endpoint, &e))?;

        serde_json::from_slice(&body).map_err(|e| CatalogError::InvalidInput {
            endpoint,
            message: format!("response body is not JSON: {e}"),
        })
    }
}

#[async_trait::async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_detail(&self, id: &AnimeId) -> Result<RawAnime, CatalogError> {
        let url = self.endpoint_url(DETAILS, "id", &id.to_string());
        let value = self.get_json(DETAILS, url, self.detail_timeout).await?;

        let raw = classify(value).map_err(|e| CatalogError::from_normalize(DETAILS, e))?;
        Ok(raw.with_fallback_id(id))
    }

    async fn fetch_recommendations(
        &self,
        id: &AnimeId,
    ) -> Result<Vec<Recommendation>, CatalogError> {
        let url = self.endpoint_url(RECOMMENDATIONS, "name", &id.to_string());
        let value = self
            .get_json(RECOMMENDATIONS, url, self.recommendations_timeout)
            .await?;

        parse_recommendations(value)
    }
}

/// Reads a recommendations array, skipping entries that do not fit.
fn parse_recommendations(value: Value) -> Result<Vec<Recommendation>, CatalogError> {
    let Value::Array(entries) = value else {
        return Err(CatalogError::InvalidInput {
            endpoint: RECOMMENDATIONS,
            message: "expected a JSON array".to_string(),
        });
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, entry)| match serde_json::from_value::<RawRecommendation>(entry) {
                Ok(raw) => Some(Recommendation::from(raw)),
                Err(e) => {
                    warn!(index, "Skipping malformed recommendation: {e}");
                    None
                }
            },
        )
        .collect())
}
