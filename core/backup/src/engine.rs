//! Backup creation and chain restoration.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use ludosafe_codec::{apply_diff, compress, compute_diff, decompress, Diff};
use ludosafe_common::{Error, Result};
use ludosafe_crypto::{decrypt, derive_fresh_key, derive_key, encrypt, CipherSuite, Iv, KdfParams};

use crate::envelope::{BackupMetadata, BackupRecord};

/// Maximum differential chain length accepted during restore.
///
/// Restoration recurses once per link, so the bound keeps a hostile or
/// mis-assembled chain from exhausting the stack.
pub const MAX_CHAIN_DEPTH: usize = 64;

/// Configuration for producing backup records.
///
/// Restoration never consults this: every record is self-describing, so a
/// record produced under one configuration restores under any other.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Key derivation parameters for new records.
    pub kdf: KdfParams,
    /// Cipher suite for new records.
    pub cipher: CipherSuite,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::standard(),
            cipher: CipherSuite::Aes256Cbc,
        }
    }
}

/// Engine composing key derivation, diffing, compression, and encryption
/// into backup creation and restoration.
///
/// Stateless apart from its configuration: every call derives its own key
/// and allocates its own buffers, so independent operations may run in
/// parallel freely.
#[derive(Debug, Clone)]
pub struct BackupEngine {
    config: BackupConfig,
}

impl BackupEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: BackupConfig) -> Self {
        Self { config }
    }

    /// Create an engine with the default configuration
    /// (PBKDF2-HMAC-SHA512 × 100,000 + AES-256-CBC).
    pub fn with_defaults() -> Self {
        Self::new(BackupConfig::default())
    }

    /// The engine's configuration.
    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Create an encrypted, compressed backup of `data`.
    ///
    /// `predecessors` is the already-produced chain, oldest record first.
    /// When non-empty, the engine attempts to restore the newest record
    /// (using the earlier ones as its chain) and encode `data` as a shallow
    /// diff against it. If that recovery fails for any reason — wrong
    /// password, corrupted record — the failure is logged and the engine
    /// falls back to a full backup; this is the only locally-recovered
    /// failure in the engine.
    ///
    /// # Postconditions
    /// - Salt and IV are freshly generated; no two records share either
    /// - The returned record's metadata fully describes how to reverse it
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] if a diff is requested between non-object
    ///   snapshots
    /// - [`Error::Derivation`] / [`Error::Encryption`] from the crypto layer
    pub fn create_backup_blocking(
        &self,
        data: &Value,
        password: &str,
        predecessors: &[BackupRecord],
    ) -> Result<BackupRecord> {
        let snapshot = serde_json::to_vec(data)?;
        let original_size = snapshot.len();

        let previous = match predecessors.split_last() {
            Some((newest, rest)) => {
                match self.restore_backup_blocking(newest, password, rest) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(
                            error = %err,
                            "Previous backup could not be recovered, falling back to a full backup"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let (payload, differential) = match &previous {
            Some(old) => {
                let diff = compute_diff(old, data)?;
                (serde_json::to_vec(&diff)?, true)
            }
            None => (snapshot, false),
        };

        let compressed = compress(&payload)?;
        let compressed_size = compressed.len();

        let (key, salt) = derive_fresh_key(password.as_bytes(), &self.config.kdf)?;
        let iv = Iv::generate(self.config.cipher.iv_length())?;
        let ciphertext = encrypt(self.config.cipher, &key, &iv, &compressed)?;

        info!(
            differential,
            original_size, compressed_size, "Backup record created"
        );

        Ok(BackupRecord {
            metadata: BackupMetadata {
                algorithm: self.config.cipher,
                key_length: self.config.cipher.key_length(),
                iv_length: self.config.cipher.iv_length(),
                iterations: self.config.kdf.iterations,
                digest: self.config.kdf.digest,
                salt: salt.to_hex(),
                iv: iv.to_hex(),
                compressed: true,
                differential,
                timestamp: Utc::now().timestamp_millis(),
                original_size,
                compressed_size,
            },
            data: hex::encode(&ciphertext),
        })
    }

    /// Restore the snapshot sealed in `backup`.
    ///
    /// For a differential record, `predecessors` must hold the records it
    /// was diffed against, oldest first; the engine restores the chain
    /// recursively until it reaches a full record. For a full record,
    /// `predecessors` is ignored.
    ///
    /// # Errors
    /// - [`Error::Decryption`] on wrong password or corrupted ciphertext
    /// - [`Error::Decompression`] / [`Error::Serialization`] on corrupted
    ///   payloads
    /// - [`Error::ChainRestore`] if a predecessor is missing or fails to
    ///   restore, naming the failing link, or if the chain exceeds
    ///   [`MAX_CHAIN_DEPTH`]
    pub fn restore_backup_blocking(
        &self,
        backup: &BackupRecord,
        password: &str,
        predecessors: &[BackupRecord],
    ) -> Result<Value> {
        if predecessors.len() >= MAX_CHAIN_DEPTH {
            return Err(Error::ChainRestore {
                link: predecessors.len(),
                reason: format!("chain exceeds maximum depth of {}", MAX_CHAIN_DEPTH),
            });
        }
        self.restore_link(backup, password, predecessors, predecessors.len())
    }

    /// Restore the record at position `link` of the chain. `predecessors`
    /// holds the records before it, so `link == predecessors.len()`.
    fn restore_link(
        &self,
        backup: &BackupRecord,
        password: &str,
        predecessors: &[BackupRecord],
        link: usize,
    ) -> Result<Value> {
        let meta = &backup.metadata;
        let suite = meta.algorithm;

        if meta.key_length != suite.key_length() {
            return Err(Error::InvalidInput(format!(
                "Envelope key length {} does not match {}",
                meta.key_length, suite
            )));
        }
        if meta.iv_length != suite.iv_length() {
            return Err(Error::InvalidInput(format!(
                "Envelope IV length {} does not match {}",
                meta.iv_length, suite
            )));
        }

        debug!(link, differential = meta.differential, "Restoring backup record");

        let salt = meta.salt_bytes()?;
        let iv = meta.iv_bytes()?;
        let key = derive_key(password.as_bytes(), &salt, &meta.kdf_params())?;
        let ciphertext = backup.ciphertext()?;

        let decrypted = decrypt(suite, &key, &iv, &ciphertext)?;
        let payload = if meta.compressed {
            decompress(&decrypted)?
        } else {
            decrypted
        };

        if meta.differential {
            let (newest, rest) =
                predecessors
                    .split_last()
                    .ok_or_else(|| Error::ChainRestore {
                        link,
                        reason: "differential backup requires its predecessor".to_string(),
                    })?;

            let previous = self
                .restore_link(newest, password, rest, link - 1)
                .map_err(|err| match err {
                    chain @ Error::ChainRestore { .. } => chain,
                    other => Error::ChainRestore {
                        link: link - 1,
                        reason: other.to_string(),
                    },
                })?;

            let diff: Diff = serde_json::from_slice(&payload)?;
            apply_diff(&previous, &diff)
        } else {
            Ok(serde_json::from_slice(&payload)?)
        }
    }

    /// Async form of [`Self::create_backup_blocking`].
    ///
    /// Key derivation is CPU-bound by design, so the work runs on the
    /// blocking pool and never stalls the async executor.
    pub async fn create_backup(
        &self,
        data: Value,
        password: String,
        predecessors: Vec<BackupRecord>,
    ) -> Result<BackupRecord> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            engine.create_backup_blocking(&data, &password, &predecessors)
        })
        .await
        .map_err(|e| Error::Task(format!("Backup task failed: {}", e)))?
    }

    /// Async form of [`Self::restore_backup_blocking`].
    pub async fn restore_backup(
        &self,
        backup: BackupRecord,
        password: String,
        predecessors: Vec<BackupRecord>,
    ) -> Result<Value> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            engine.restore_backup_blocking(&backup, &password, &predecessors)
        })
        .await
        .map_err(|e| Error::Task(format!("Restore task failed: {}", e)))?
    }
}
