//! Payload codecs for the Ludosafe backup engine.
//!
//! This module provides:
//! - Shallow field-level diffs between JSON snapshots, with a tombstone
//!   that is distinct from a legitimate `null` value
//! - Lossless gzip compression of payload bytes

pub mod compress;
pub mod diff;

pub use compress::{compress, decompress};
pub use diff::{apply_diff, compute_diff, Diff, FieldChange};
