//! Campus data service error types.

/// Errors from the campus transport data service client.
#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check CAMPUS_API_USERNAME and CAMPUS_API_PASSWORD")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A response field failed domain validation
    #[error("invalid payload: {message}")]
    Invalid { message: String },
}
