//! Seam to the external move-suggestion service.

use crate::protocol::{MoveReply, MoveRequest};
use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Supplies moves for the automated player.
///
/// Implementations send exactly one request per call and report transport
/// problems as [`MoveServiceError`]. Application-level `{error}` bodies are
/// a successful transport and come back as [`MoveReply::Error`].
#[async_trait::async_trait]
pub trait MoveService: Send + Sync {
    /// Asks the service for a move.
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveReply, MoveServiceError>;
}

/// What went wrong talking to the move service.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveServiceErrorKind {
    /// Connection, timeout or other failure before a response arrived.
    #[display("{}", _0)]
    Network(String),
    /// Non-2xx response.
    #[display("Server error: {} - {}", status, detail)]
    Status {
        /// HTTP status code.
        status: u16,
        /// `error` field of the body, or a placeholder.
        detail: String,
    },
    /// 2xx response whose body is not JSON.
    #[display("Malformed response: {}", _0)]
    Malformed(String),
}

/// Move service error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Move service error: {} at {}:{}", kind, file, line)]
pub struct MoveServiceError {
    /// Error category and detail.
    pub kind: MoveServiceErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl MoveServiceError {
    /// Creates a new move service error.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: MoveServiceErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_kind = %kind, "Move service error created");
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Network failure before a response arrived.
    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(MoveServiceErrorKind::Network(message.into()))
    }

    /// Non-2xx HTTP status.
    #[track_caller]
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::new(MoveServiceErrorKind::Status {
            status,
            detail: detail.into(),
        })
    }

    /// Body that could not be parsed.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(MoveServiceErrorKind::Malformed(message.into()))
    }
}
