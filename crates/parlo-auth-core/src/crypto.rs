//! Cryptographic utilities for secure operations
//!
//! This module provides security-critical primitives that must be implemented
//! correctly to prevent timing attacks and other side-channel vulnerabilities.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

/// Pre-computed HMAC key for efficient repeated signing operations.
///
/// Creating an HMAC instance from raw bytes has overhead. This struct
/// pre-validates the key and allows efficient cloning for signing.
#[derive(Clone)]
pub struct HmacKey {
    key_bytes: Arc<[u8]>,
}

impl HmacKey {
    /// Create a new HMAC key from bytes.
    ///
    /// Shared app passwords are not length-constrained, so any non-empty
    /// key is accepted. HMAC-SHA256 hashes keys longer than the block size
    /// and zero-pads shorter ones internally.
    ///
    /// # Errors
    /// Returns error if the key is empty.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let key_bytes = key.as_ref();
        if key_bytes.is_empty() {
            return Err(HmacKeyError::EmptyKey);
        }
        Ok(Self {
            key_bytes: Arc::from(key_bytes),
        })
    }

    /// Create HMAC instance for signing
    fn create_hmac(&self) -> Hmac<Sha256> {
        // This cannot fail because HMAC accepts keys of any length
        Hmac::<Sha256>::new_from_slice(&self.key_bytes)
            .expect("HMAC-SHA256 accepts keys of any length")
    }

    /// Sign data and return the MAC bytes
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = self.create_hmac();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Verify a signature in constant time
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let expected = self.sign(data);
        constant_time_eq(&expected, signature)
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("key_length", &self.key_bytes.len())
            .finish_non_exhaustive()
    }
}

/// Errors that can occur when creating an HMAC key
#[derive(Debug, Clone, thiserror::Error)]
pub enum HmacKeyError {
    #[error("HMAC key must not be empty")]
    EmptyKey,
}

/// Constant-time byte slice comparison.
///
/// This function compares two byte slices in constant time to prevent
/// timing attacks. Every byte of both operands is consulted before the
/// verdict is produced, including when the lengths differ: the shorter
/// operand is padded with zeroes up to the longer length and the length
/// difference is folded into the accumulator, so a length mismatch is
/// not observable as an early return.
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut acc = u8::from(a.len() != b.len());

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        acc |= x ^ y;
    }

    acc == 0
}

/// Constant-time string comparison.
///
/// Wrapper around `constant_time_eq` for string comparisons.
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
