use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("The provided URL is invalid.")]
    InvalidUrl(Option<String>),

    #[error("The image already exists in the cache.")]
    AlreadyExists(PathBuf),

    #[error("The URL does not point to valid image data.")]
    NotAnImage(#[source] image::ImageError),

    #[error("Error retrieving image {0} from the cache.")]
    RetrieveFailed(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }

    /// Another writer already cached this image. Callers that only want the
    /// image present should treat this as success.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CacheError::AlreadyExists(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CacheError::InvalidUrl(None).to_string(),
            "The provided URL is invalid."
        );
        assert_eq!(
            CacheError::AlreadyExists(PathBuf::from("/tmp/x.jpg")).to_string(),
            "The image already exists in the cache."
        );
        assert_eq!(
            CacheError::Api(ApiError::Http(503)).to_string(),
            "Server error with status code: 503. Please try again later."
        );
    }

    #[test]
    fn test_io_includes_path() {
        let err = CacheError::io("/cache/a.jpg")(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Cache I/O error at /cache/a.jpg: disk full");
        assert!(!err.is_already_exists());
    }
}
