//! Common error types shared across Ludosafe modules.
//!
//! Every member crate reports failures through the single [`Error`] enum so
//! that callers see one consistent taxonomy from key derivation all the way
//! up to chain restoration.

pub mod error;

pub use error::{Error, Result};
