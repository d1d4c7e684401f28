use crate::error::{AppError, CliError};
use rpassword::prompt_password;
use std::io::{self, BufRead, Write};

/// Credentials for `POST /auth/login`
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

fn input_error(what: &str, e: io::Error) -> AppError {
    AppError::Cli(CliError::InvalidArguments(format!(
        "Failed to read {}: {}",
        what, e
    )))
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Prompt for whatever was not given on the command line.
    /// The password is read without echo.
    pub fn collect(username: Option<&str>) -> Result<Self, AppError> {
        let username = match username {
            Some(username) => username.to_string(),
            None => {
                print!("Username: ");
                io::stdout().flush().map_err(|e| input_error("stdout", e))?;
                let mut line = String::new();
                io::stdin()
                    .lock()
                    .read_line(&mut line)
                    .map_err(|e| input_error("username", e))?;
                line.trim().to_string()
            }
        };

        let password = prompt_password("Password: ").map_err(|e| input_error("password", e))?;

        Ok(Self {
            username,
            password: password.trim_end_matches(['\r', '\n']).to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::Cli(CliError::InvalidArguments(
                "Username cannot be empty".to_string(),
            )));
        }
        if self.password.is_empty() {
            return Err(AppError::Cli(CliError::InvalidArguments(
                "Password cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(LoginInput::new("pastor@example.org", "secret").validate().is_ok());
        assert!(LoginInput::new("  ", "secret").validate().is_err());

        let err = LoginInput::new("pastor@example.org", "").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "CliError: Invalid arguments: Password cannot be empty"
        );
    }
}
