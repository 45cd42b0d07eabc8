//! forgevault - Scoped, encrypted credentials for git hosting providers
//!
//! Stores hosting-provider API credentials (GitHub, GitLab, Bitbucket) and
//! git transport credentials (SSH, HTTPS, token) encrypted at rest, in two
//! independent scopes: a per-user global store and a per-repository project
//! store. Lookups that consult both scopes try the project first.
//!
//! ## Architecture
//!
//! - **Auth**: `SecureStore` (AES-256-GCM records), `AuthManager`, `SecretEnvStore`
//! - **Providers**: `ProviderClient` / `ProviderFactory` and the HTTP clients
//! - **Security**: sanitization and zeroizing secret containers
//! - **Config**: store locations and HTTP settings
//!
//! ## Example
//!
//! ```no_run
//! use forgevault_lib::auth::{AuthManager, Scope};
//! use forgevault_lib::config::VaultConfig;
//! use forgevault_lib::providers::ProviderType;
//!
//! # fn main() -> anyhow::Result<()> {
//! let manager = AuthManager::from_config(&VaultConfig::load(), ".")?;
//! manager.set_token(ProviderType::GitHub, "ghp_example", None, Scope::Global)?;
//! let (scope, record) = manager.resolve_auth_config(ProviderType::GitHub)?;
//! println!("{} credential from {} scope", record.auth_method, scope);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod providers;
pub mod security;

use tracing_subscriber::EnvFilter;

/// Installs the default `tracing` subscriber
///
/// Honours `RUST_LOG`; otherwise logs this crate at debug and everything else
/// at info. Does nothing if a subscriber is already installed.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("forgevault_lib=debug,info"));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!("Logging initialized");
    }
}
