//! Cryptographic primitives for the Ludosafe backup engine.
//!
//! This module provides:
//! - Password-based key derivation using PBKDF2-HMAC
//! - Symmetric encryption with an explicit per-call IV
//! - Key material types with automatic zeroization
//!
//! # Security Guarantees
//! - Key material is zeroized on drop and never logged
//! - Salts and IVs are generated fresh for every encryption
//! - Derivation is deterministic for identical (password, salt, params)

pub mod cipher;
pub mod kdf;
pub mod keys;

pub use cipher::{decrypt, encrypt, CipherSuite};
pub use kdf::{derive_fresh_key, derive_key, KdfDigest, KdfParams};
pub use keys::{Iv, Salt, SymmetricKey, KEY_LENGTH, SALT_LENGTH};
