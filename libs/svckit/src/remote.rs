//! HTTP client for the sibling services (users, posts, auth).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Where the sibling services live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesConfig {
    /// Common base URL; `/user`, `/post` and `/auth` hang off it.
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_owned(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid service base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned an unexpected body: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl RemoteError {
    /// HTTP status the sibling answered with, if it answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin JSON-over-HTTP client. `reqwest::Client` is `Clone + Send + Sync`, so
/// one instance is shared by every adapter.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base: Url,
}

impl RemoteClient {
    /// # Errors
    /// Returns an error if the base URL can't be parsed or can't carry a path,
    /// or the underlying client can't be built.
    pub fn new(cfg: &ServicesConfig) -> Result<Self, RemoteError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|_| RemoteError::InvalidBaseUrl(cfg.base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidBaseUrl(cfg.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self { http, base })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` + `segments` + `query`, segments percent-encoded individually.
    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(
        &self,
        url: &Url,
        authorization: Option<&str>,
    ) -> Result<reqwest::Response, RemoteError> {
        let mut request = self.http.get(url.as_str());
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        request.send().await.map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })
    }

    /// GET a JSON body. Any non-2xx status is an error.
    ///
    /// # Errors
    /// Returns [`RemoteError::Status`], [`RemoteError::Transport`] or
    /// [`RemoteError::Decode`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        authorization: Option<&str>,
    ) -> Result<T, RemoteError> {
        let url = self.url(segments, query)?;
        let response = self.send(&url, authorization).await?;
        decode(&url, response).await
    }

    /// Like [`RemoteClient::get_json`], but a 404 yields `None`.
    ///
    /// # Errors
    /// Same as [`RemoteClient::get_json`] for every status except 404.
    pub async fn get_json_opt<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        authorization: Option<&str>,
    ) -> Result<Option<T>, RemoteError> {
        let url = self.url(segments, query)?;
        let response = self.send(&url, authorization).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(&url, response).await.map(Some)
    }
}

async fn decode<T: DeserializeOwned>(
    url: &Url,
    response: reqwest::Response,
) -> Result<T, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.json::<T>().await.map_err(|source| RemoteError::Decode {
        url: url.to_string(),
        source,
    })
}
