//! Backup record and its self-describing metadata.
//!
//! Every parameter needed to reverse an encryption travels with the
//! ciphertext: cipher suite, key and IV lengths, KDF iteration count and
//! digest, salt, and IV. Field names serialize in camelCase so records are
//! interchangeable with envelopes persisted by earlier deployments.

use serde::{Deserialize, Serialize};

use ludosafe_common::{Error, Result};
use ludosafe_crypto::{CipherSuite, Iv, KdfDigest, KdfParams, Salt};

/// Metadata describing how a backup record was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    /// Cipher suite id, e.g. `aes-256-cbc`.
    pub algorithm: CipherSuite,
    /// Key length in bytes.
    pub key_length: usize,
    /// IV length in bytes.
    pub iv_length: usize,
    /// PBKDF2 iteration count.
    pub iterations: u32,
    /// PBKDF2 PRF digest id.
    pub digest: KdfDigest,
    /// Hex-encoded key derivation salt. Fresh for every record.
    pub salt: String,
    /// Hex-encoded initialization vector. Fresh for every record.
    pub iv: String,
    /// Whether the payload is gzip-compressed.
    pub compressed: bool,
    /// Whether the payload is a diff against the immediate predecessor
    /// rather than a full snapshot. The record itself carries no pointer to
    /// that predecessor; tracking chain order is the caller's job.
    pub differential: bool,
    /// Creation time, Unix milliseconds.
    pub timestamp: i64,
    /// Byte length of the full serialized snapshot before compression.
    pub original_size: usize,
    /// Byte length of the compressed payload.
    pub compressed_size: usize,
}

impl BackupMetadata {
    /// Decode the salt from its hex form.
    pub fn salt_bytes(&self) -> Result<Salt> {
        Salt::from_hex(&self.salt)
    }

    /// Decode the IV from its hex form.
    pub fn iv_bytes(&self) -> Result<Iv> {
        Iv::from_hex(&self.iv)
    }

    /// KDF parameters recorded in this envelope.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.iterations,
            digest: self.digest,
        }
    }
}

/// An encrypted, compressed backup of a JSON snapshot.
///
/// Immutable once produced. Opaque to callers: suitable for persistence as
/// a file, blob, or database field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub metadata: BackupMetadata,
    /// Hex-encoded ciphertext.
    pub data: String,
}

impl BackupRecord {
    /// Whether this record is a diff against a predecessor.
    pub fn is_differential(&self) -> bool {
        self.metadata.differential
    }

    /// Decode the ciphertext from its hex form.
    ///
    /// # Errors
    /// - Returns [`Error::InvalidInput`] if the data field is not hex
    pub fn ciphertext(&self) -> Result<Vec<u8>> {
        hex::decode(&self.data)
            .map_err(|e| Error::InvalidInput(format!("Malformed ciphertext hex: {}", e)))
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}
