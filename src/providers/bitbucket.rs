//! Bitbucket Cloud client

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::base::{
    authorize, resolve_base_url, verify_identity, ProviderClient, ProviderCredentials,
    ProviderError, ProviderType, TokenStyle,
};

/// Bitbucket REST API 2.0 client
pub struct BitbucketClient {
    client: Client,
    base_url: String,
    credentials: ProviderCredentials,
}

impl BitbucketClient {
    pub fn new(
        client: Client,
        credentials: ProviderCredentials,
        base_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            base_url: resolve_base_url(ProviderType::Bitbucket, base_url)?,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ProviderClient for BitbucketClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Bitbucket
    }

    async fn test_auth(&self, cancel: &CancellationToken) -> Result<(), ProviderError> {
        let request = self.client.get(format!("{}/2.0/user", self.base_url));
        // App passwords arrive as basic credentials, access tokens as bearer
        let request = authorize(request, &self.credentials, TokenStyle::Bearer);
        verify_identity(ProviderType::Bitbucket, request, cancel).await
    }
}
