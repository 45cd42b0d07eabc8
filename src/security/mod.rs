//! Security module - Secret handling and sanitization
//!
//! This module provides security primitives for:
//! - Mapping store keys to safe file names
//! - Masking sensitive data for logs
//! - Secret strings and key bytes with zeroization

mod sanitizer;
mod secure_string;

pub use sanitizer::Sanitizer;
pub use secure_string::{SecureBytes, SecureString};
