//! Error types for the location store.

/// Errors from a [`LocationStore`](crate::LocationStore) backend.
///
/// Callers treat every variant as non-fatal: the in-memory game state
/// already advanced by the time a write fails, and a failed read only
/// means a rejoining player starts without a seeded position.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or timed out.
    #[error("location store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something we could not interpret.
    #[error("location store returned malformed data: {0}")]
    MalformedEntry(String),
}
