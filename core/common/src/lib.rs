//! Common utilities and types shared across driveup modules.
//!
//! This crate provides the error taxonomy of an upload run, the secret
//! masking set consulted by every diagnostic sink, and identifier types.

pub mod error;
pub mod secrets;
pub mod types;

pub use error::{Error, Result};
pub use secrets::{SecretSet, MASK};
pub use types::{FileId, FolderId};
