//! Error types for queue operations.

use thiserror::Error;

/// Failures reported by queue operations.
///
/// [`QueueError::EmptyQueue`] means "nothing to do" rather than a fault: the
/// queue was left exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueError {
    /// A node or its string storage could not be allocated. Anything
    /// allocated by the failing call has already been released.
    #[error("allocation failure")]
    AllocationFailure,

    /// The operation was given an absent queue handle.
    #[error("invalid queue handle")]
    InvalidHandle,

    /// The queue holds no element to remove or delete.
    #[error("queue is empty")]
    EmptyQueue,
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::QueueError;

    #[test]
    fn error_display() {
        assert_eq!(QueueError::AllocationFailure.to_string(), "allocation failure");
        assert_eq!(QueueError::InvalidHandle.to_string(), "invalid queue handle");
        assert_eq!(QueueError::EmptyQueue.to_string(), "queue is empty");
    }
}
