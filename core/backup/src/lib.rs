//! Encrypted differential backup engine.
//!
//! This module provides:
//! - Self-describing encrypted backup records for JSON snapshots
//! - Full and differential backups (shallow delta against a predecessor)
//! - Recursive restoration of caller-supplied backup chains
//!
//! # Architecture
//! The engine composes the crypto and codec crates: a snapshot is
//! serialized, optionally diffed against its recovered predecessor,
//! compressed, and encrypted under a key derived fresh for every record.
//! Records are opaque values; persisting and ordering them is entirely the
//! caller's responsibility.

pub mod engine;
pub mod envelope;

pub use engine::{BackupConfig, BackupEngine, MAX_CHAIN_DEPTH};
pub use envelope::{BackupMetadata, BackupRecord};
