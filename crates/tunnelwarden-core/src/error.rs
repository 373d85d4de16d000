//! Shared error type across tunnelWarden crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed instruction.
    BadRequest,
    /// Auth failed.
    AuthFailed,
    /// The requested resource is already in use and concurrent access is
    /// not permitted for the requesting session.
    ResourceBusy,
    /// Unsupported protocol version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::ResourceBusy => "RESOURCE_BUSY",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed")]
    AuthFailed,
    #[error("concurrent access to this resource is not allowed")]
    ResourceBusy,
    #[error("unsupported protocol version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl WardenError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            WardenError::BadRequest(_) => ClientCode::BadRequest,
            WardenError::AuthFailed => ClientCode::AuthFailed,
            WardenError::ResourceBusy => ClientCode::ResourceBusy,
            WardenError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            WardenError::Internal(_) => ClientCode::Internal,
        }
    }
}
