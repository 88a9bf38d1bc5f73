//! Error types for the game engine.

/// Errors raised by location-update ingestion.
///
/// Every variant is a client mistake and is rejected before any state
/// mutation; the reporting player gets an error reply and nobody else
/// is affected.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Latitude outside [-90, 90] degrees.
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] degrees.
    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),

    /// NaN or infinite coordinates. Distances against these are
    /// meaningless, so they never reach the roster.
    #[error("coordinates must be finite, got ({0}, {1})")]
    NonFiniteCoordinates(f64, f64),
}
