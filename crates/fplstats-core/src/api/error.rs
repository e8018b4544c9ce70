use thiserror::Error;

/// Why a remote call produced no data.
///
/// Every variant means the same thing to callers: nothing is available right
/// now, try again on a later run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited by the FPL API")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected status {status}: {body}")]
    Unexpected { status: u16, body: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 300;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => FetchError::NotFound(truncated),
            429 => FetchError::RateLimited,
            500..=599 => FetchError::ServerError(truncated),
            code => FetchError::Unexpected {
                status: code,
                body: truncated,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_codes() {
        assert!(matches!(FetchError::from_status(StatusCode::NOT_FOUND, "gone"), FetchError::NotFound(b) if b == "gone"));
        assert!(matches!(FetchError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), FetchError::RateLimited));
        assert!(matches!(FetchError::from_status(StatusCode::SERVICE_UNAVAILABLE, "The game is being updated."), FetchError::ServerError(_)));
        assert!(matches!(FetchError::from_status(StatusCode::FORBIDDEN, ""), FetchError::Unexpected { status: 403, .. }));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        match FetchError::from_status(StatusCode::BAD_GATEWAY, &body) {
            FetchError::ServerError(msg) => {
                assert!(msg.len() < 400);
                assert!(msg.ends_with("(truncated, 1000 total bytes)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
