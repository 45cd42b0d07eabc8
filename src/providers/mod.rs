//! Provider module - Hosting provider clients and their factory
//!
//! One small client per host behind the `ProviderClient` trait, dispatched by
//! `ProviderType`. New hosts are added as a variant plus a client module.

mod base;
mod bitbucket;
mod github;
mod gitlab;

pub use base::*;
pub use bitbucket::BitbucketClient;
pub use github::GitHubClient;
pub use gitlab::GitLabClient;

use reqwest::Client;
use std::time::Duration;

/// HTTP settings shared by every client the factory builds
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Total request timeout
    pub timeout: Duration,
    /// User-Agent header (GitHub rejects requests without one)
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("forgevault/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Factory producing reqwest-backed clients for every known provider
pub struct HttpProviderFactory {
    client: Client,
}

impl HttpProviderFactory {
    /// Creates a factory with default HTTP settings
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_settings(&HttpSettings::default())
    }

    /// Creates a factory with custom HTTP settings
    pub fn with_settings(settings: &HttpSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| ProviderError::Construction(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn construct(
        &self,
        provider_type: ProviderType,
        credentials: &ProviderCredentials,
        base_url: Option<&str>,
    ) -> Result<Box<dyn ProviderClient>, ProviderError> {
        let client = self.client.clone();
        let credentials = credentials.clone();

        let built: Box<dyn ProviderClient> = match provider_type {
            ProviderType::GitHub => Box::new(GitHubClient::new(client, credentials, base_url)?),
            ProviderType::GitLab => Box::new(GitLabClient::new(client, credentials, base_url)?),
            ProviderType::Bitbucket => {
                Box::new(BitbucketClient::new(client, credentials, base_url)?)
            }
        };
        tracing::debug!(provider = %provider_type, "Constructed provider client");
        Ok(built)
    }
}
