//! Password-based key derivation using PBKDF2-HMAC.
//!
//! Derivation is deliberately slow (100,000 iterations by default) to
//! resist brute-force attacks on the password. The same (password, salt,
//! params) triple always yields the same key, which is what lets a restore
//! re-derive the key from the salt persisted in the envelope.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::fmt;

use crate::keys::{Salt, SymmetricKey, KEY_LENGTH};
use ludosafe_common::{Error, Result};

/// Digest used by the PBKDF2 PRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfDigest {
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha512")]
    Sha512,
}

impl fmt::Display for KdfDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdfDigest::Sha256 => write!(f, "sha256"),
            KdfDigest::Sha512 => write!(f, "sha512"),
        }
    }
}

/// Parameters for PBKDF2 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations.
    pub iterations: u32,
    /// PRF digest.
    pub digest: KdfDigest,
}

impl KdfParams {
    /// Standard parameters: 100,000 iterations of PBKDF2-HMAC-SHA512.
    ///
    /// These match every envelope the backup engine has ever produced, so
    /// they are also what a restore re-derives with unless the envelope says
    /// otherwise.
    pub fn standard() -> Self {
        Self {
            iterations: 100_000,
            digest: KdfDigest::Sha512,
        }
    }

    /// Reduced parameters for interactive tooling and tests.
    ///
    /// Not suitable for protecting long-lived backups.
    pub fn fast() -> Self {
        Self {
            iterations: 10_000,
            digest: KdfDigest::Sha512,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Derive a symmetric key from a password and salt.
///
/// # Postconditions
/// - Deterministic: identical (password, salt, params) always yield the
///   same key
/// - The key zeroizes on drop
///
/// # Errors
/// - Returns [`Error::InvalidInput`] if the iteration count is zero
pub fn derive_key(password: &[u8], salt: &Salt, params: &KdfParams) -> Result<SymmetricKey> {
    if params.iterations == 0 {
        return Err(Error::InvalidInput(
            "KDF iteration count must be at least 1".to_string(),
        ));
    }

    let mut key = [0u8; KEY_LENGTH];
    match params.digest {
        KdfDigest::Sha256 => pbkdf2_hmac::<Sha256>(password, salt.as_bytes(), params.iterations, &mut key),
        KdfDigest::Sha512 => pbkdf2_hmac::<Sha512>(password, salt.as_bytes(), params.iterations, &mut key),
    }

    Ok(SymmetricKey::from_bytes(key))
}

/// Derive a key under a freshly generated random salt.
///
/// This is the encryption-side entry point: every backup gets its own salt,
/// which then travels in the envelope so the restore side can call
/// [`derive_key`] with it.
///
/// # Errors
/// - Returns [`Error::Derivation`] if salt generation fails
pub fn derive_fresh_key(password: &[u8], params: &KdfParams) -> Result<(SymmetricKey, Salt)> {
    let salt = Salt::generate()?;
    let key = derive_key(password, &salt, params)?;
    Ok((key, salt))
}
