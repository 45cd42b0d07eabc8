//! Error types for the credential store and the auth manager
//!
//! Messages name keys, scopes and providers only. Secret values are carried
//! as `SecureString` and never formatted into an error.

use thiserror::Error;

use super::model::Scope;
use crate::providers::{ProviderError, ProviderType};

/// Errors that can occur during secure store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed (including deleting an absent key)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No record stored under the key
    #[error("Record not found for key: {0}")]
    NotFound(String),

    /// Key is empty, so it has no file name
    #[error("Store key must not be empty")]
    EmptyKey,

    /// Authentication tag did not verify, wrong key, or malformed payload
    #[error("Decryption failed: {0}")]
    Decrypt(String),

    /// Stored blob is shorter than the nonce
    #[error("Ciphertext too short: {len} bytes")]
    ShortCiphertext { len: usize },

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    Encrypt(String),

    /// Record could not be serialized before encryption
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns true if the error means "no such record"
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::NotFound(_) => true,
            StoreError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Errors that can occur in the auth manager and the env-var store
#[derive(Debug, Error)]
pub enum AuthError {
    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored auth method differs from the one the accessor expects
    #[error("Auth method mismatch: expected {expected}, found {actual}")]
    MethodMismatch {
        expected: &'static str,
        actual: String,
    },

    /// Scope name is neither "global" nor "project"
    #[error("Unsupported scope: {0}")]
    UnsupportedScope(String),

    /// Auth method name is not recognised
    #[error("Unsupported auth method: {0}")]
    UnsupportedMethod(String),

    /// Interactive authentication is not available
    #[error("Manual credential input required for {provider} ({method} auth)")]
    ManualInputRequired {
        provider: ProviderType,
        method: &'static str,
    },

    /// Provider client could not be constructed
    #[error("Failed to create {provider} client: {source}")]
    Construction {
        provider: ProviderType,
        #[source]
        source: ProviderError,
    },

    /// Provider rejected the credentials or could not be reached
    #[error("Authentication test failed for {provider} ({scope} scope): {source}")]
    Connectivity {
        provider: ProviderType,
        scope: Scope,
        #[source]
        source: ProviderError,
    },

    /// SSH auth record has neither a key path nor inline key material
    #[error("No SSH key configured for {0} scope")]
    NoKeyFound(Scope),

    /// A field the accessor needs is absent from the stored record
    #[error("Stored {scope} git auth has no {field}")]
    MissingField { scope: Scope, field: &'static str },

    /// Reading an SSH key file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable name is not valid
    #[error("Invalid variable name: {0:?}")]
    InvalidName(String),
}

impl AuthError {
    /// Returns true if the error means "no record stored for this slot"
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthError::Store(e) if e.is_not_found())
    }
}
