use pkgscout_api::NpmError;
use pkgscout_store::StoreError;
use thiserror::Error;

/// Everything that can fail inside pkgscout-core
///
/// Validation problems (empty query, duplicate favorite, ...) are not errors;
/// they come back as notices. This enum is for the things that actually broke.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, slow down and try again")]
    RateLimitExceeded,

    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<NpmError> for Error {
    fn from(err: NpmError) -> Self {
        match err {
            NpmError::RateLimitExceeded => Error::RateLimitExceeded,
            other => Error::ApiError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_stays_distinct() {
        assert!(matches!(
            Error::from(NpmError::RateLimitExceeded),
            Error::RateLimitExceeded
        ));
    }

    #[test]
    fn test_other_api_failures_keep_message() {
        let err = Error::from(NpmError::RequestFailed("Status 500: registry on fire".into()));
        match err {
            Error::ApiError(msg) => assert!(msg.contains("registry on fire")),
            other => panic!("expected ApiError, got {}", other),
        }
    }
}
