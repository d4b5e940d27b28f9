//! Error types for OAuth client operations

/// Errors from OAuth client operations.
///
/// Every operation either returns a fully populated value or one of these;
/// nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed response in which the provider rejected the request.
    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },
}

impl Error {
    /// Whether the failure happened at the transport level, so repeating the
    /// same call could succeed. Provider rejections and bad input are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

impl From<common::Error> for Error {
    fn from(err: common::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

/// Result alias for OAuth client operations.
pub type Result<T> = std::result::Result<T, Error>;
