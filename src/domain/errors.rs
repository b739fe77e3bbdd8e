use thiserror::Error;

/// Failure taxonomy of the order gate. Every expected failure is one of
/// these; anything else is caught at the boundary and surfaced as
/// `Internal` with the detail kept server-side.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Structural or cross-check validation failures. Carries the complete
    /// list of defects so a client can fix them all at once.
    #[error("Invalid order data")]
    Validation(Vec<String>),

    #[error("Too many orders. Retry in {retry_after} seconds.")]
    RateLimited { retry_after: u64 },

    #[error("{0}")]
    NotFound(String),

    /// Orders closed, or a catalog item no longer available.
    #[error("{0}")]
    FailedPrecondition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
