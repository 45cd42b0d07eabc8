//! Authentication module - Encrypted storage and credential management
//!
//! Provides:
//! - `SecureStore`: AES-256-GCM encrypted records under one directory
//! - `AuthManager`: provider and git-transport credentials per scope
//! - `SecretEnvStore`: encrypted environment variables per scope

mod crypto;
mod env_store;
mod error;
mod manager;
mod model;
mod secure_store;

pub use crypto::{Cipher, EncryptionKey, KEY_SIZE, NONCE_SIZE};
pub use env_store::{EnvVarRecord, SecretEnvStore};
pub use error::{AuthError, StoreError};
pub use manager::AuthManager;
pub use model::{
    git_transport_key, provider_key, AuthRecord, GitAuthMethod, GitAuthRecord, HttpsCredentials,
    ProviderAuthMethod, Scope, SshKeySource,
};
pub use secure_store::{ListOutcome, SecureStore, KEY_FILE, RECORD_EXT};
