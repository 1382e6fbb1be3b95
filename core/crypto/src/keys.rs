//! Key material types with secure memory handling.
//!
//! The symmetric key zeroizes its memory on drop so that derived secrets do
//! not persist after an operation completes. Salts and IVs are public
//! metadata and travel hex-encoded next to the ciphertext.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use ludosafe_common::{Error, Result};

/// Length of symmetric encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of key derivation salts in bytes.
pub const SALT_LENGTH: usize = 16;

/// Symmetric key derived from a password.
///
/// Ephemeral by design: derived per call, used, and dropped. Never cached
/// across operations.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_LENGTH],
}

impl SymmetricKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// Salt for key derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(pub [u8; SALT_LENGTH]);

impl Salt {
    /// Generate a random salt.
    ///
    /// # Errors
    /// - Returns [`Error::Derivation`] if the system RNG fails
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| Error::Derivation(format!("Salt generation failed: {}", e)))?;
        Ok(Self(salt))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }

    /// Hex encoding for envelope metadata.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from the hex form stored in envelope metadata.
    ///
    /// # Errors
    /// - Returns [`Error::InvalidInput`] if the string is not hex or has the
    ///   wrong length
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| Error::InvalidInput(format!("Malformed salt hex: {}", e)))?;
        let bytes: [u8; SALT_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidInput(format!(
                "Invalid salt length: expected {}, got {}",
                SALT_LENGTH,
                b.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

/// Initialization vector for a cipher operation.
///
/// The length depends on the cipher suite (16 bytes for AES-256-CBC,
/// 24 bytes for XChaCha20-Poly1305), so the bytes are held in a `Vec` and
/// validated against the suite at encryption/decryption time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iv(Vec<u8>);

impl Iv {
    /// Generate a random IV of the given length.
    ///
    /// # Errors
    /// - Returns [`Error::Derivation`] if the system RNG fails
    pub fn generate(len: usize) -> Result<Self> {
        let mut iv = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| Error::Derivation(format!("IV generation failed: {}", e)))?;
        Ok(Self(iv))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the IV is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex encoding for envelope metadata.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from the hex form stored in envelope metadata.
    ///
    /// The length is validated against the cipher suite at decryption time,
    /// not here.
    ///
    /// # Errors
    /// - Returns [`Error::InvalidInput`] if the string is not hex
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| Error::InvalidInput(format!("Malformed IV hex: {}", e)))?;
        Ok(Self(bytes))
    }
}
