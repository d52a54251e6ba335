use thiserror::Error;

/// Boxed opaque failure from the underlying HTTP stack.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid URL. Please try again later.")]
    InvalidUrl(String),

    #[error("Server error with status code: {0}. Please try again later.")]
    Http(u16),

    #[error("The request timed out. Please try again later.")]
    Timeout,

    #[error("A network connection was lost.")]
    NotConnected,

    #[error("Network error: {0}")]
    Transport(#[source] BoxError),
}

impl ApiError {
    /// Classify a reqwest failure into one of the recognized kinds.
    /// Anything that is neither a timeout nor a connection failure is
    /// passed through as an opaque transport error.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::NotConnected
        } else {
            ApiError::Transport(Box::new(err))
        }
    }

    pub fn from_status(status: u16) -> Self {
        ApiError::Http(status)
    }

    /// Status code for HTTP failures, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(status) => Some(*status),
            _ => None,
        }
    }

    /// Timeouts and lost connections are worth a manual retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::NotConnected)
    }
}
