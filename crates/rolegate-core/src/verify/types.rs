//! Outcome types for the verification handshake

use thiserror::Error;

/// Result of a code submission
///
/// Submission never fails hard; every backend or platform problem maps to
/// one of these so the caller can always answer the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Code matched and the verified attribute was granted
    Success,
    /// Candidate did not match the current code, or the code backend was
    /// unreachable; the session stays open for a retry
    WrongCode,
    /// No session is bound to this requester
    NoActiveSession,
    /// Code matched but the grant failed; the session stays open for a retry
    GrantFailed,
}

/// Successful start of a verification handshake
#[derive(Debug, Clone)]
pub struct Initiation {
    /// Session id now bound to the requester
    pub session_id: String,
    /// Rendered verification link for that session
    pub link: String,
}

/// Why an initiation was refused
#[derive(Error, Debug)]
pub enum InitiateError {
    /// The requester already holds the verified attribute
    #[error("requester is already verified")]
    AlreadyVerified,

    /// The prompt could not be delivered; the binding stays in place
    #[error("prompt delivery failed: {0}")]
    Delivery(#[from] crate::error::Error),
}
