use thiserror::Error;

/// Errors raised by the transfer engine.
///
/// Everything above `BadParameters` is a protocol or I/O failure detected
/// inside a running transfer; those are collapsed to
/// [`TransferOutcome::Fail`](crate::transfer::TransferOutcome) at the
/// `run()` boundary and never retried. The parameter and policy variants
/// are detected before any connection is opened and surface synchronously
/// as a command rejection.
#[derive(Error, Debug)]
pub enum XfrError {
    #[error("failed to connect to master: {0}")]
    ConnectError(String),

    #[error("timed out waiting for data from master")]
    Timeout,

    #[error("master closed the connection")]
    PeerClosed,

    #[error("malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("incomplete DNS message: need {need} bytes, got {got}")]
    IncompleteMessage { need: usize, got: usize },

    #[error("response QID {got:#06x} does not match query QID {want:#06x}")]
    QidMismatch { want: u16, got: u16 },

    #[error("message is not a response")]
    NotAResponse,

    #[error("server returned error rcode {0}")]
    ServerError(u8),

    #[error("expected exactly 1 question in response, got {0}")]
    QuestionCountMismatch(u16),

    #[error("transfer response carries no answer records")]
    EmptyAnswerSection,

    #[error("transfer ended without a terminating SOA record")]
    UnexpectedEndOfTransfer,

    #[error("bad command parameters: {0}")]
    BadParameters(String),

    #[error("zone {0} already has a transfer in progress")]
    AlreadyInProgress(String),

    #[error("maximum number of concurrent transfers reached")]
    QuotaExceeded,

    #[error("zone store write failed: {0}")]
    StoreWriteError(String),
}

pub type Result<T> = std::result::Result<T, XfrError>;
