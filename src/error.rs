use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("QueryError: {0}")]
    Query(#[from] QueryError),
    #[error("PermissionError: {0}")]
    Permission(#[from] PermissionError),
    #[error("StateError: {0}")]
    State(#[from] StateError),
    #[error("ServiceError: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Authentication required")]
    AuthRequired { message: String, hint: String },
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Authentication failed")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
    #[error("Access to {endpoint} is forbidden")]
    Forbidden {
        endpoint: String,
        server_message: String,
    },
    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },
    #[error("Unexpected status {actual} from {endpoint} (expected {expected})")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        endpoint: String,
    },
}

impl ApiError {
    /// HTTP status carried by this error, if the failure came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Timeout { .. } => None,
            ApiError::Http { status: 0, .. } => None,
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::UnexpectedStatus { actual, .. } => Some(*actual),
        }
    }
}

/// Rejected query builder state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Page must be a positive number (got {page})")]
    InvalidPage { page: u32 },
    #[error("Page size must be a positive number (got {page_size})")]
    InvalidPageSize { page_size: u32 },
    #[error("IN filter on '{field}' requires at least one value")]
    EmptyInList { field: String },
    #[error("Filter field name cannot be empty (operator {operator})")]
    EmptyField { operator: String },
}

/// Raised by callers that gate an operation on the current actor's permissions
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Permission denied: {action}")]
pub struct PermissionError {
    pub action: String,
}

impl PermissionError {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Query {index} reported success without a payload")]
    InconsistentSnapshot { index: usize },
    #[error("Request failed without reporting an error")]
    MissingError,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration save failed: {message}")]
    ConfigSaveFailed { message: String },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    /// HTTP status behind this error, used to classify failed requests
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::Api(api_error) => api_error.status_code(),
            _ => None,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => ErrorSeverity::High,
                ApiError::Timeout { .. } => ErrorSeverity::Medium,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Query(_) => ErrorSeverity::Medium,
            AppError::Permission(_) => ErrorSeverity::High,
            AppError::State(_) => ErrorSeverity::Critical,
            AppError::Service(ServiceError::Validation { .. }) => ErrorSeverity::Medium,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Api(ApiError::Unauthorized { .. }) => "Session expired or invalid".to_string(),
            AppError::Permission(PermissionError { action }) => {
                format!("You are not allowed to perform '{}'", action)
            }
            AppError::Service(ServiceError::Validation { field, message }) => {
                format!("Invalid {}: {}", field, message)
            }
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::Unauthorized { .. }) | AppError::Cli(CliError::AuthRequired { .. }) => {
                Some("Run 'chms auth login' and export CHMS_API_TOKEN".to_string())
            }
            AppError::Permission(_) => {
                Some("'chms permissions list' shows what your role is allowed to do".to_string())
            }
            AppError::Config(ConfigError::ProfileNotFound { .. }) => {
                Some("'chms config set api_url <url>' creates the profile".to_string())
            }
            AppError::Api(ApiError::Timeout { .. }) => {
                Some("Check your network connection and the API URL, then try again".to_string())
            }
            AppError::Query(_) => Some("Pages and page sizes start at 1".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let cli_err = CliError::InvalidArguments("invalid arguments".to_string());
        assert_eq!(
            format!("{}", cli_err),
            "Invalid arguments: invalid arguments"
        );
        let cli_err = CliError::AuthRequired {
            message: "message".to_string(),
            hint: "hint".to_string(),
        };
        if let CliError::AuthRequired { message, hint } = cli_err {
            assert_eq!(message, "message");
            assert_eq!(hint, "hint");
        } else {
            panic!("Expected AuthRequired");
        }
    }

    #[test]
    fn test_api_error_status_codes() {
        let err = ApiError::Unauthorized {
            status: 401,
            endpoint: "/members".to_string(),
            server_message: "expired".to_string(),
        };
        assert_eq!(err.status_code(), Some(401));

        let err = ApiError::Forbidden {
            endpoint: "/members".to_string(),
            server_message: "no".to_string(),
        };
        assert_eq!(err.status_code(), Some(403));

        let err = ApiError::NotFound {
            endpoint: "/members/7".to_string(),
        };
        assert_eq!(err.status_code(), Some(404));

        let err = ApiError::Timeout {
            timeout_secs: 10,
            endpoint: "/members".to_string(),
        };
        assert_eq!(err.status_code(), None);

        // status 0 marks transport failures with no response
        let err = ApiError::Http {
            status: 0,
            endpoint: "/members".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_app_error_status_code_passthrough() {
        let app_err = AppError::Api(ApiError::Http {
            status: 500,
            endpoint: "/members".to_string(),
            message: "boom".to_string(),
        });
        assert_eq!(app_err.status_code(), Some(500));
        assert_eq!(app_err.severity(), ErrorSeverity::High);

        let app_err = AppError::Permission(PermissionError::new("member.findAll"));
        assert_eq!(app_err.status_code(), None);
    }

    #[test]
    fn test_query_error_display() {
        let err = QueryError::InvalidPage { page: 0 };
        assert_eq!(
            format!("{}", err),
            "Page must be a positive number (got 0)"
        );
        let err = QueryError::EmptyInList {
            field: "id".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "IN filter on 'id' requires at least one value"
        );
    }

    #[test]
    fn test_permission_error_friendly_and_hint() {
        let app_err = AppError::from(PermissionError::new("envelope.assign"));
        assert_eq!(
            app_err.display_friendly(),
            "You are not allowed to perform 'envelope.assign'"
        );
        assert!(app_err.troubleshooting_hint().is_some());
        assert_eq!(app_err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_service_error_display() {
        let service_err = ServiceError::Validation {
            field: "email".to_string(),
            message: "invalid".to_string(),
        };
        assert_eq!(
            format!("{}", service_err),
            "Validation error: email: invalid"
        );
    }

    #[test]
    fn test_state_error_is_critical() {
        let app_err = AppError::State(StateError::InconsistentSnapshot { index: 1 });
        assert_eq!(app_err.severity(), ErrorSeverity::Critical);
        assert_eq!(
            format!("{}", app_err),
            "StateError: Query 1 reported success without a payload"
        );
    }
}
