/// Failures surfaced by the lock client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// Caller supplied an empty lock name or an empty lock key.
    /// Raised before any request reaches the coordination service.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The coordination service rejected the request because it is too busy.
    #[error("coordination service overloaded: {0}")]
    TransientOverload(String),

    /// Any other failure reported by the coordination service or its transport.
    #[error("coordination service error: {0}")]
    Service(String),

    /// The client configuration was rejected at construction.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LockError {
    /// Only admission-control rejections are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LockError::TransientOverload(_))
    }
}

pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LockError::InvalidArgument("lock name must not be empty".to_string());
        assert_eq!(err.to_string(), "invalid argument: lock name must not be empty");

        let err = LockError::TransientOverload("etcdserver: too many requests".to_string());
        assert_eq!(
            err.to_string(),
            "coordination service overloaded: etcdserver: too many requests"
        );

        let err = LockError::Service("lease not found".to_string());
        assert_eq!(err.to_string(), "coordination service error: lease not found");
    }

    #[test]
    fn test_only_overload_is_retryable() {
        assert!(LockError::TransientOverload("busy".into()).is_retryable());
        assert!(!LockError::Service("unavailable".into()).is_retryable());
        assert!(!LockError::InvalidArgument("empty".into()).is_retryable());
        assert!(!LockError::Config("endpoint".into()).is_retryable());
    }
}
