//! GitHub client
//!
//! Checks credentials with `GET {base}/user`. GitHub Enterprise instances use
//! a base URL of the form `https://ghe.example.com/api/v3`.

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::base::{
    authorize, resolve_base_url, verify_identity, ProviderClient, ProviderCredentials,
    ProviderError, ProviderType, TokenStyle,
};

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    base_url: String,
    credentials: ProviderCredentials,
}

impl GitHubClient {
    pub fn new(
        client: Client,
        credentials: ProviderCredentials,
        base_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            base_url: resolve_base_url(ProviderType::GitHub, base_url)?,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ProviderClient for GitHubClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::GitHub
    }

    async fn test_auth(&self, cancel: &CancellationToken) -> Result<(), ProviderError> {
        let request = self
            .client
            .get(format!("{}/user", self.base_url))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        let request = authorize(request, &self.credentials, TokenStyle::Bearer);
        verify_identity(ProviderType::GitHub, request, cancel).await
    }
}
