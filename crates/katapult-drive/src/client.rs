//! Google Drive API client
//!
//! Provides a typed HTTP client for the Drive v2 REST API. Handles the
//! bearer header, endpoint construction and decoding of Drive error bodies
//! into [`DriveError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use katapult_core::domain::RemoteId;
//! use katapult_drive::{client::DriveClient, files};
//!
//! # async fn example() -> Result<(), katapult_drive::DriveError> {
//! let client = DriveClient::new("access-token-here");
//! let page = files::list_children(&client, &RemoteId::drive_root(), None, 100).await?;
//! println!("{} children", page.items.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::DriveError;

/// Base URL for the Google APIs host
const DRIVE_BASE_URL: &str = "https://www.googleapis.com";

/// Error reasons Drive reports (with 403) when a quota bucket is exhausted
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

// ============================================================================
// Drive error body
// ============================================================================

/// `{"error": {"code": 403, "message": "...", "errors": [{"reason": "..."}]}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Drive v2 API calls
///
/// Wraps `reqwest::Client` with the bearer token and base URL.
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests (scheme + host, no trailing slash)
    base_url: String,
    /// OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a new DriveClient with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DRIVE_BASE_URL)
    }

    /// Creates a new DriveClient with a custom base URL (useful for testing)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an absolute endpoint URL with query parameters
    ///
    /// Parameter values are percent-encoded, so a query such as
    /// `'abc' in parents` can be passed verbatim.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, DriveError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| DriveError::InvalidResponse(format!("Invalid endpoint URL: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Creates an authenticated request builder for the given method and URL
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Sends a request and maps any non-success status to a [`DriveError`]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(failure(response).await)
    }

    /// Like [`send`](Self::send), but hands `allowed` back as a response too
    ///
    /// Resumable upload sessions answer every chunk but the last with
    /// `308 Resume Incomplete`.
    pub async fn send_allowing(
        &self,
        request: RequestBuilder,
        allowed: StatusCode,
    ) -> Result<Response, DriveError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() || status == allowed {
            return Ok(response);
        }
        Err(failure(response).await)
    }

    /// Sends a request and decodes the JSON body
    pub async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DriveError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Decoding Drive response");
        serde_json::from_slice(&bytes)
            .map_err(|e| DriveError::InvalidResponse(format!("Malformed JSON body: {e}")))
    }
}

async fn failure(response: Response) -> DriveError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let err = error_from_status(status, &body);
    warn!(status = status.as_u16(), error = %err, "Drive request failed");
    err
}

/// Classifies a failed response from its status and Drive error body
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> DriveError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
    let rate_limit_reason = parsed.as_ref().and_then(|e| {
        e.error
            .errors
            .iter()
            .find(|d| RATE_LIMIT_REASONS.contains(&d.reason.as_str()))
            .map(|d| d.reason.clone())
    });

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            DriveError::RateLimited(rate_limit_reason.unwrap_or(message))
        }
        StatusCode::FORBIDDEN => match rate_limit_reason {
            Some(reason) => DriveError::RateLimited(reason),
            None => DriveError::Forbidden(message),
        },
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized(message),
        StatusCode::NOT_FOUND => DriveError::NotFound(message),
        s if s.is_server_error() => DriveError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => DriveError::Http {
            status: s.as_u16(),
            message,
        },
    }
}
