//! Storage layer: TOML configuration with named profiles.
//!
//! Tokens are never written to disk; they come from `--token` or
//! `CHMS_API_TOKEN` on each run.

use crate::error::StorageError;

pub mod config;

type Result<T> = std::result::Result<T, StorageError>;
