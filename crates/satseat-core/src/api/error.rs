use thiserror::Error;

/// Failure talking to the College Board endpoints.
///
/// Every variant is the same kind of failure from the user's point of view
/// (the external API could not be used), so callers surface
/// [`ApiError::USER_MESSAGE`] rather than the variant detail.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Notification shown to the user for any API failure.
    pub const USER_MESSAGE: &'static str = "Error with CollegeBoard API";

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, url: &str, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            429 => ApiError::RateLimited(url.to_string()),
            500..=599 => ApiError::ServerError(format!("{} from {}: {}", status, url, truncated)),
            _ => ApiError::Status {
                status,
                body: truncated,
            },
        }
    }
}
