//! Base types and traits for hosting providers
//!
//! Only the construction contract and the connectivity check live here; the
//! repository, issue and pull-request APIs of each host are not modelled.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::security::{SecureString, Sanitizer};

/// Known git hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    GitHub,
    GitLab,
    Bitbucket,
}

impl ProviderType {
    /// Every provider, in a stable order
    pub const ALL: [ProviderType; 3] = [
        ProviderType::GitHub,
        ProviderType::GitLab,
        ProviderType::Bitbucket,
    ];

    /// Identifier used in store keys and payloads (e.g., "github")
    pub fn id(&self) -> &'static str {
        match self {
            ProviderType::GitHub => "github",
            ProviderType::GitLab => "gitlab",
            ProviderType::Bitbucket => "bitbucket",
        }
    }

    /// Display name (e.g., "GitHub")
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::GitHub => "GitHub",
            ProviderType::GitLab => "GitLab",
            ProviderType::Bitbucket => "Bitbucket",
        }
    }

    /// Public API root used when a record has no base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::GitHub => "https://api.github.com",
            ProviderType::GitLab => "https://gitlab.com",
            ProviderType::Bitbucket => "https://api.bitbucket.org",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(ProviderType::GitHub),
            "gitlab" => Ok(ProviderType::GitLab),
            "bitbucket" => Ok(ProviderType::Bitbucket),
            _ => Err(ProviderError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Errors that can occur when building or calling a provider client
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider name is not one of the known hosts
    #[error("Unsupported provider type: {0}")]
    UnsupportedProvider(String),

    /// Client could not be built from the given settings
    #[error("Client construction failed: {0}")]
    Construction(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Host answered with a status that is neither success nor an auth failure
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// Network error during the request
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        // URLs may carry userinfo for self-hosted instances
        ProviderError::Network(e.without_url())
    }
}

/// Credentials handed to a provider client
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCredentials {
    /// Personal access token / app token
    Token(SecureString),
    /// Username and password (or app password)
    Basic {
        username: String,
        password: SecureString,
    },
}

/// A client for one hosting provider
///
/// The connectivity check is the only operation this crate calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Which host this client talks to
    fn provider_type(&self) -> ProviderType;

    /// Verifies the credentials against the host
    ///
    /// Returns `ProviderError::Cancelled` if `cancel` fires first.
    async fn test_auth(&self, cancel: &CancellationToken) -> Result<(), ProviderError>;
}

/// Builds provider clients from stored credentials
pub trait ProviderFactory: Send + Sync {
    fn construct(
        &self,
        provider_type: ProviderType,
        credentials: &ProviderCredentials,
        base_url: Option<&str>,
    ) -> Result<Box<dyn ProviderClient>, ProviderError>;
}

/// Resolves the API root for a client, trimming any trailing slash
pub(crate) fn resolve_base_url(
    provider_type: ProviderType,
    base_url: Option<&str>,
) -> Result<String, ProviderError> {
    let raw = base_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| provider_type.default_base_url());

    let url = Url::parse(raw).map_err(|e| {
        ProviderError::Construction(format!(
            "invalid base URL {}: {}",
            Sanitizer::sanitize_url(raw),
            e
        ))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProviderError::Construction(format!(
            "unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// How a host expects token credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenStyle {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Token in a host-specific header
    Header(&'static str),
}

/// Attaches credentials; basic credentials always use HTTP basic auth
pub(crate) fn authorize(
    request: RequestBuilder,
    credentials: &ProviderCredentials,
    style: TokenStyle,
) -> RequestBuilder {
    match (credentials, style) {
        (ProviderCredentials::Token(token), TokenStyle::Bearer) => request.bearer_auth(token.as_str()),
        (ProviderCredentials::Token(token), TokenStyle::Header(name)) => {
            request.header(name, token.as_str())
        }
        (ProviderCredentials::Basic { username, password }, _) => {
            request.basic_auth(username, Some(password.as_str()))
        }
    }
}

/// Sends a "current user" request and maps the outcome to a connectivity result
pub(crate) async fn verify_identity(
    provider_type: ProviderType,
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<(), ProviderError> {
    let response = send_cancellable(request, cancel).await?;
    check_auth_status(provider_type, response.status())?;
    tracing::debug!(provider = %provider_type, "Credentials verified");
    Ok(())
}

/// Sends `request` unless `cancel` fires first
async fn send_cancellable(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Response, ProviderError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        response = request.send() => Ok(response?),
    }
}

/// Maps the status of a "who am I" call to a connectivity result
fn check_auth_status(provider_type: ProviderType, status: StatusCode) -> Result<(), ProviderError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ProviderError::AuthFailed(format!(
            "{} rejected the credentials",
            provider_type.name()
        ))),
        StatusCode::FORBIDDEN => Err(ProviderError::AuthFailed(format!(
            "{} denied access with these credentials",
            provider_type.name()
        ))),
        other => Err(ProviderError::UnexpectedStatus(other.as_u16())),
    }
}
