use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when interacting with the Claude API
#[derive(Error, Debug)]
pub enum ClaudeApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error from Claude API (HTTP 5xx, 529 overloaded)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Unknown or unexpected error
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl ClaudeApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::InvalidApiKey,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            StatusCode::REQUEST_TIMEOUT => Self::Timeout,
            status if status.is_server_error() || status.as_u16() == 529 => {
                Self::ServerError(status, body)
            }
            _ => Self::UnknownError(status, body),
        }
    }

    /// Classify a reqwest failure, separating timeouts from other I/O errors.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkError(err)
        }
    }

    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::NetworkError(_)
        )
    }

    /// Returns true if this is a permanent error that should not be retried
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidApiKey | Self::Forbidden(_) | Self::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ClaudeApiError::RateLimitExceeded.is_transient());
        assert!(
            ClaudeApiError::ServerError(StatusCode::INTERNAL_SERVER_ERROR, "test".to_string())
                .is_transient()
        );
        assert!(ClaudeApiError::Timeout.is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        assert!(ClaudeApiError::InvalidRequest("test".to_string()).is_permanent());
        assert!(ClaudeApiError::InvalidApiKey.is_permanent());
        assert!(ClaudeApiError::Forbidden("test".to_string()).is_permanent());
        assert!(ClaudeApiError::NotFound.is_permanent());
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ClaudeApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ClaudeApiError::RateLimitExceeded
        ));
        assert!(matches!(
            ClaudeApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ClaudeApiError::InvalidApiKey
        ));

        let overloaded = StatusCode::from_u16(529).unwrap();
        assert!(ClaudeApiError::from_status(overloaded, "overloaded".to_string()).is_transient());
        assert!(matches!(
            ClaudeApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            ClaudeApiError::UnknownError(_, _)
        ));
    }

    #[test]
    fn test_error_exclusivity() {
        let rate_limit_error = ClaudeApiError::RateLimitExceeded;
        assert!(rate_limit_error.is_transient());
        assert!(!rate_limit_error.is_permanent());

        let invalid_request_error = ClaudeApiError::InvalidRequest("test".to_string());
        assert!(!invalid_request_error.is_transient());
        assert!(invalid_request_error.is_permanent());
    }
}
