//! # Room Errors

use thiserror::Error;

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;

/// Room hub errors
#[derive(Debug, Clone, Error)]
pub enum RoomError {
    /// Connection was never attached, or already detached
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),

    #[error("Message too large (max: {0} bytes)")]
    MessageTooLarge(usize),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// Returns the close code for WebSocket
    pub fn close_code(&self) -> u16 {
        match self {
            RoomError::UnknownConnection(_) => 4001,
            RoomError::MessageTooLarge(_) => 4021,
            RoomError::RateLimitExceeded => 4020,
            RoomError::Internal(_) => 4500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_codes() {
        assert_eq!(RoomError::UnknownConnection("c".into()).close_code(), 4001);
        assert_eq!(RoomError::RateLimitExceeded.close_code(), 4020);
        assert_eq!(RoomError::MessageTooLarge(65536).close_code(), 4021);
    }
}
