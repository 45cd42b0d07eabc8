//! Secret holders with automatic memory zeroization
//!
//! Credential records carry tokens, passwords and SSH keys in these types so
//! that secrets are wiped on drop and never show up in `Debug` output or in
//! error messages built from a record.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// A string that securely clears its memory when dropped
///
/// Serializes as a plain JSON string so it can live inside stored records.
/// The plaintext only ever reaches disk inside an encrypted payload.
///
/// # Example
///
/// ```
/// use forgevault_lib::security::SecureString;
///
/// let secret = SecureString::from("ghp_abc");
/// assert_eq!(secret.as_str(), "ghp_abc");
/// assert!(!format!("{:?}", secret).contains("ghp_abc"));
/// ```
#[derive(Clone, Default)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Wraps an owned String without copying it
    pub fn new(s: String) -> Self {
        Self { inner: s }
    }

    /// Returns the secret as a slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the length of the secret in bytes
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Zeroize for SecureString {
    fn zeroize(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

// No Display impl: secrets must be unwrapped explicitly with as_str()
impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .field("content", &"[REDACTED]")
            .finish()
    }
}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl Eq for SecureString {}

impl PartialEq<str> for SecureString {
    fn eq(&self, other: &str) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.as_bytes())
    }
}

impl PartialEq<&str> for SecureString {
    fn eq(&self, other: &&str) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.as_bytes())
    }
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// A byte buffer that securely clears its memory when dropped
///
/// Holds decrypted payloads and raw key-file contents.
#[derive(Clone)]
pub struct SecureBytes {
    inner: Vec<u8>,
}

impl SecureBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.inner, &other.inner)
    }
}

impl Eq for SecureBytes {}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.inner.len())
            .field("content", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_basics() {
        let secret = SecureString::new("password123".to_string());
        assert_eq!(secret.as_str(), "password123");
        assert_eq!(secret.len(), 11);
        assert!(!secret.is_empty());
        assert!(secret.starts_with("pass"));
    }

    #[test]
    fn test_secure_string_debug_redacted() {
        let secret = SecureString::from("ghp_supersecret");
        let debug_output = format!("{:?}", secret);
        assert!(!debug_output.contains("ghp_supersecret"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_secure_string_serde_is_transparent() {
        let secret = SecureString::from("glpat-xyz");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"glpat-xyz\"");

        let back: SecureString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }

    #[test]
    fn test_secure_string_equality() {
        let a = SecureString::from("same");
        assert_eq!(a, SecureString::from("same"));
        assert_ne!(a, SecureString::from("different"));
        assert!(a == "same");
        assert!(a != "other");
    }

    #[test]
    fn test_secure_bytes_debug_redacted() {
        let bytes = SecureBytes::new(vec![7, 7, 7]);
        let debug_output = format!("{:?}", bytes);
        assert!(!debug_output.contains('7'));
        assert!(debug_output.contains("REDACTED"));
        assert_eq!(bytes.len(), 3);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }
}
