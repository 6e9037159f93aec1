//! Shared error type across wshub crates.

use thiserror::Error;

/// Stable error codes (log fields, test assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Undecodable frame or payload that does not match its tag.
    Malformed,
    /// Envelope without a `msg_type` tag.
    MissingType,
    /// Envelope with a `msg_type` this side does not understand.
    UnknownType,
    /// Outbound envelope could not be serialized.
    Encode,
    /// Send attempted while the channel is not open.
    NotReady,
    /// Channel accepted the call but could not take the frame.
    SendFailed,
    /// Request id already pending.
    DuplicateRequestId,
    /// Connection target could not be built.
    InvalidTarget,
    /// Transport failed to connect.
    Connect,
    /// Established connection broke.
    Transport,
    /// Bad configuration.
    Config,
    /// Broken internal plumbing (closed task channels).
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Malformed => "MALFORMED",
            ErrorCode::MissingType => "MISSING_TYPE",
            ErrorCode::UnknownType => "UNKNOWN_TYPE",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::NotReady => "NOT_READY",
            ErrorCode::SendFailed => "SEND_FAILED",
            ErrorCode::DuplicateRequestId => "DUPLICATE_REQUEST_ID",
            ErrorCode::InvalidTarget => "INVALID_TARGET",
            ErrorCode::Connect => "CONNECT",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WsHubError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum WsHubError {
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("server message has no type")]
    MissingType,
    #[error("server message has unknown type: {0}")]
    UnknownType(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("channel is not ready")]
    NotReady,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("request id already pending: {0}")]
    DuplicateRequestId(String),
    #[error("invalid connection target: {0}")]
    InvalidTarget(String),
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl WsHubError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            WsHubError::Malformed(_) => ErrorCode::Malformed,
            WsHubError::MissingType => ErrorCode::MissingType,
            WsHubError::UnknownType(_) => ErrorCode::UnknownType,
            WsHubError::Encode(_) => ErrorCode::Encode,
            WsHubError::NotReady => ErrorCode::NotReady,
            WsHubError::SendFailed(_) => ErrorCode::SendFailed,
            WsHubError::DuplicateRequestId(_) => ErrorCode::DuplicateRequestId,
            WsHubError::InvalidTarget(_) => ErrorCode::InvalidTarget,
            WsHubError::Connect(_) => ErrorCode::Connect,
            WsHubError::Transport(_) => ErrorCode::Transport,
            WsHubError::Config(_) => ErrorCode::Config,
            WsHubError::Internal(_) => ErrorCode::Internal,
        }
    }
}
