//! Input validation and sanitization utilities
//!
//! This module provides utilities for validating user input, configuration
//! values, and request payloads before they are sent to the API.

use crate::error::{CliError, ServiceError};

/// Request payloads are checked before they leave the client
pub trait Validate {
    fn validate(&self) -> Result<(), ServiceError>;
}

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    // Basic URL validation - must start with http:// or https://
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Validate API token format
pub fn validate_token(token: &str) -> crate::Result<()> {
    if token.trim().is_empty() {
        return Err(CliError::InvalidArguments("API token cannot be empty".to_string()).into());
    }

    if token.chars().any(char::is_whitespace) {
        return Err(
            CliError::InvalidArguments("API token cannot contain whitespace".to_string()).into(),
        );
    }

    Ok(())
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation {
            field: field.to_string(),
            message: "cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Shallow email check: one `@`, non-empty local part, dotted domain
pub fn validate_email(field: &str, email: &str) -> Result<(), ServiceError> {
    let invalid = || ServiceError::Validation {
        field: field.to_string(),
        message: format!("'{}' is not a valid email address", email),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(())
}
