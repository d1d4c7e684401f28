use crate::error::ApiError;

/// Convert reqwest errors to ApiError with endpoint context
pub fn convert_request_error(error: reqwest::Error, endpoint: &str, timeout_secs: u64) -> ApiError {
    if error.is_timeout() {
        return convert_timeout_error(endpoint, timeout_secs);
    }
    ApiError::Http {
        status: error.status().map(|s| s.as_u16()).unwrap_or(0),
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Convert timeout errors to ApiError with endpoint context
pub fn convert_timeout_error(endpoint: &str, timeout_secs: u64) -> ApiError {
    ApiError::Timeout {
        timeout_secs,
        endpoint: endpoint.to_string(),
    }
}

/// Convert JSON deserialization errors to ApiError with endpoint context
pub fn convert_json_error(error: reqwest::Error, status: u16, endpoint: &str) -> ApiError {
    ApiError::Http {
        status,
        endpoint: endpoint.to_string(),
        message: format!("JSON parse error: {}", error),
    }
}

/// Map a non-expected response status to the matching ApiError
pub fn status_to_api_error(status: u16, expected: u16, endpoint: &str, body: String) -> ApiError {
    match status {
        401 => ApiError::Unauthorized {
            status,
            endpoint: endpoint.to_string(),
            server_message: body,
        },
        403 => ApiError::Forbidden {
            endpoint: endpoint.to_string(),
            server_message: body,
        },
        404 => ApiError::NotFound {
            endpoint: endpoint.to_string(),
        },
        200..=299 => ApiError::UnexpectedStatus {
            expected,
            actual: status,
            endpoint: endpoint.to_string(),
        },
        _ => ApiError::Http {
            status,
            endpoint: endpoint.to_string(),
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_api_error_classification() {
        assert!(matches!(
            status_to_api_error(401, 200, "/members", String::new()),
            ApiError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            status_to_api_error(403, 200, "/members", String::new()),
            ApiError::Forbidden { .. }
        ));
        assert!(matches!(
            status_to_api_error(404, 200, "/members/1", String::new()),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            status_to_api_error(200, 201, "/members", String::new()),
            ApiError::UnexpectedStatus {
                expected: 201,
                actual: 200,
                ..
            }
        ));
        assert!(matches!(
            status_to_api_error(502, 200, "/members", "bad gateway".to_string()),
            ApiError::Http { status: 502, .. }
        ));
    }

    #[test]
    fn test_timeout_conversion() {
        let err = convert_timeout_error("/members", 15);
        assert_eq!(err.to_string(), "Request timed out after 15s");
    }
}
