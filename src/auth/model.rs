//! Credential records and store keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::AuthError;
use crate::providers::ProviderType;
use crate::security::SecureString;

/// Fixed key prefix for git-transport records
const GIT_TRANSPORT_KEY: &str = "git-transport";

/// Which physical store backs a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Per-user store
    Global,
    /// Per-repository store
    Project,
}

impl Scope {
    /// All scopes in resolution order: narrower first
    pub const ALL: [Scope; 2] = [Scope::Project, Scope::Global];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Project => "project",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Scope::Global),
            "project" => Ok(Scope::Project),
            _ => Err(AuthError::UnsupportedScope(s.to_string())),
        }
    }
}

/// How a provider API credential authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderAuthMethod {
    Token,
    Basic,
    Ssh,
}

impl ProviderAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderAuthMethod::Token => "token",
            ProviderAuthMethod::Basic => "basic",
            ProviderAuthMethod::Ssh => "ssh",
        }
    }
}

impl fmt::Display for ProviderAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderAuthMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "token" => Ok(ProviderAuthMethod::Token),
            "basic" => Ok(ProviderAuthMethod::Basic),
            "ssh" => Ok(ProviderAuthMethod::Ssh),
            _ => Err(AuthError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// How git transport authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitAuthMethod {
    Ssh,
    Https,
    Token,
    None,
}

impl GitAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitAuthMethod::Ssh => "ssh",
            GitAuthMethod::Https => "https",
            GitAuthMethod::Token => "token",
            GitAuthMethod::None => "none",
        }
    }
}

impl fmt::Display for GitAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hosting-provider API credential
///
/// Unknown fields are rejected so a git-transport or env-var payload sharing
/// the same root never decodes as a provider record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthRecord {
    pub provider_type: ProviderType,
    pub auth_method: ProviderAuthMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SecureString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecureString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthRecord {
    /// Creates a token credential
    pub fn token(provider_type: ProviderType, token: impl Into<SecureString>) -> Self {
        Self {
            provider_type,
            auth_method: ProviderAuthMethod::Token,
            token: Some(token.into()),
            username: None,
            password: None,
            base_url: None,
            expires_at: None,
        }
    }

    /// Creates a username/password credential
    pub fn basic(
        provider_type: ProviderType,
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Self {
        Self {
            provider_type,
            auth_method: ProviderAuthMethod::Basic,
            token: None,
            username: Some(username.into()),
            password: Some(password.into()),
            base_url: None,
            expires_at: None,
        }
    }

    /// Sets a custom API base URL (self-hosted instances)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the expiry timestamp
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if an expiry is set and has passed
    ///
    /// Expiry is informational; the store never refuses an expired record.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Git transport credential (one per scope)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitAuthRecord {
    pub auth_method: GitAuthMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecureString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SecureString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<SecureString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl GitAuthRecord {
    /// Creates a record with only the method set
    pub fn new(auth_method: GitAuthMethod) -> Self {
        Self {
            auth_method,
            username: None,
            password: None,
            token: None,
            ssh_key_path: None,
            ssh_key: None,
            expires_at: None,
        }
    }

    /// Sets the expiry timestamp
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if an expiry is set and has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Where the SSH private key for git transport comes from
#[derive(Debug, Clone)]
pub enum SshKeySource {
    /// Path to a key file, read on every lookup
    Path(PathBuf),
    /// Key material stored inside the encrypted record
    Inline(SecureString),
}

/// Username and password for git over HTTPS
#[derive(Debug, Clone, PartialEq)]
pub struct HttpsCredentials {
    pub username: String,
    pub password: SecureString,
}

/// Store key for a provider credential
pub fn provider_key(provider: ProviderType, scope: Scope) -> String {
    format!("{}_{}", provider, scope)
}

/// Store key for the git transport credential of a scope
pub fn git_transport_key(scope: Scope) -> String {
    format!("{}_{}", GIT_TRANSPORT_KEY, scope)
}
