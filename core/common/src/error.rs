//! Error types for the Ludosafe backup engine.

use thiserror::Error;

/// Top-level error type for backup operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input to a primitive (non-object diff target, bad hex,
    /// mismatched IV length, zero KDF iterations).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Randomness or key derivation failure. Always fatal, never retried.
    #[error("Key derivation error: {0}")]
    Derivation(String),

    /// Cipher failure while sealing a payload.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Wrong password, corrupted ciphertext, or padding failure. The engine
    /// cannot distinguish between these conditions; this one category
    /// covers them all.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Corrupted or non-matching compressed payload.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A differential chain could not be restored. `link` is the zero-based
    /// position of the failing record, oldest record first.
    #[error("Chain restore failed at link {link}: {reason}")]
    ChainRestore { link: usize, reason: String },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task could not be joined.
    #[error("Task error: {0}")]
    Task(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
