//! GitLab client
//!
//! Checks credentials with `GET {base}/api/v4/user`. Tokens go in the
//! `PRIVATE-TOKEN` header, which covers personal, project and group tokens.

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::base::{
    authorize, resolve_base_url, verify_identity, ProviderClient, ProviderCredentials,
    ProviderError, ProviderType, TokenStyle,
};

/// GitLab REST API client (gitlab.com or self-managed)
pub struct GitLabClient {
    client: Client,
    base_url: String,
    credentials: ProviderCredentials,
}

impl GitLabClient {
    pub fn new(
        client: Client,
        credentials: ProviderCredentials,
        base_url: Option<&str>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            base_url: resolve_base_url(ProviderType::GitLab, base_url)?,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ProviderClient for GitLabClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::GitLab
    }

    async fn test_auth(&self, cancel: &CancellationToken) -> Result<(), ProviderError> {
        let request = self.client.get(format!("{}/api/v4/user", self.base_url));
        let request = authorize(request, &self.credentials, TokenStyle::Header("PRIVATE-TOKEN"));
        verify_identity(ProviderType::GitLab, request, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SecureString;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_auth_sends_private_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/user"))
            .and(header("PRIVATE-TOKEN", "glpat-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitLabClient::new(
            Client::new(),
            ProviderCredentials::Token(SecureString::from("glpat-123")),
            Some(&server.uri()),
        )
        .unwrap();
        client.test_auth(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_basic_credentials() {
        let server = MockServer::start().await;
        // base64("u:p") == "dTpw"
        Mock::given(method("GET"))
            .and(path("/api/v4/user"))
            .and(header("Authorization", "Basic dTpw"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitLabClient::new(
            Client::new(),
            ProviderCredentials::Basic {
                username: "u".into(),
                password: SecureString::from("p"),
            },
            Some(&server.uri()),
        )
        .unwrap();
        client.test_auth(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/user"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GitLabClient::new(
            Client::new(),
            ProviderCredentials::Token(SecureString::from("glpat-123")),
            Some(&server.uri()),
        )
        .unwrap();
        let err = client.test_auth(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnexpectedStatus(503)));
    }

    #[test]
    fn test_self_managed_base_url() {
        let client = GitLabClient::new(
            Client::new(),
            ProviderCredentials::Token(SecureString::from("t")),
            Some("https://gitlab.internal.example/"),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://gitlab.internal.example");
    }
}
