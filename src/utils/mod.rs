//! Utilities shared across layers

/// Conversion of transport errors into `ApiError`
pub mod error_helpers;

/// `env_logger` setup and verbose output
pub mod logging;

/// Exponential backoff for idempotent requests
pub mod retry;

/// Terminal-width aware text formatting
pub mod text;

/// Input validation
pub mod validation;
