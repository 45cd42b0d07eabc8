//! Encrypted environment variables
//!
//! Reuses `SecureStore` for a second class of secrets. Variables live under
//! `env_<NAME>` keys, so the stores can be shared with `AuthManager`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::manager::resolve_first;
use super::model::Scope;
use super::secure_store::SecureStore;
use crate::security::SecureString;

const ENV_KEY_PREFIX: &str = "env_";

/// A stored environment variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvVarRecord {
    pub name: String,
    pub value: SecureString,
    pub updated_at: DateTime<Utc>,
}

/// Scoped, encrypted environment-variable store
pub struct SecretEnvStore {
    global: SecureStore,
    project: SecureStore,
}

impl SecretEnvStore {
    pub fn new(global: SecureStore, project: SecureStore) -> Self {
        Self { global, project }
    }

    fn store(&self, scope: Scope) -> &SecureStore {
        match scope {
            Scope::Global => &self.global,
            Scope::Project => &self.project,
        }
    }

    pub fn set(
        &self,
        name: &str,
        value: impl Into<SecureString>,
        scope: Scope,
    ) -> Result<(), AuthError> {
        validate_name(name)?;
        let record = EnvVarRecord {
            name: name.to_string(),
            value: value.into(),
            updated_at: Utc::now(),
        };
        self.store(scope).set(&env_key(name), &record)?;
        tracing::info!(name = %name, scope = %scope, "Stored environment variable");
        Ok(())
    }

    pub fn get(&self, name: &str, scope: Scope) -> Result<EnvVarRecord, AuthError> {
        validate_name(name)?;
        Ok(self.store(scope).get(&env_key(name))?)
    }

    pub fn remove(&self, name: &str, scope: Scope) -> Result<(), AuthError> {
        validate_name(name)?;
        self.store(scope).delete(&env_key(name))?;
        tracing::info!(name = %name, scope = %scope, "Removed environment variable");
        Ok(())
    }

    /// All variables of a scope, sorted by name; undecodable entries are skipped
    pub fn list(&self, scope: Scope) -> Result<Vec<EnvVarRecord>, AuthError> {
        let mut records: Vec<EnvVarRecord> = self.store(scope).list(ENV_KEY_PREFIX)?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    /// Project value if set, else the global one
    pub fn resolve(&self, name: &str) -> Result<(Scope, EnvVarRecord), AuthError> {
        validate_name(name)?;
        resolve_first(|scope| self.get(name, scope))
    }
}

fn env_key(name: &str) -> String {
    format!("{}{}", ENV_KEY_PREFIX, name)
}

/// Accepts POSIX-style names: a letter or underscore, then letters, digits, underscores
fn validate_name(name: &str) -> Result<(), AuthError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidName(name.to_string()))
    }
}
