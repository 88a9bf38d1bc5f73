//! The distance evaluator: great-circle distance between coordinates.
//!
//! A pure function over a pair of positions. The Haversine formula is
//! accurate to well under a meter at elimination-radius scales, and
//! needs no shared state, so any number of concurrent sweeps can call
//! it without synchronization.

use geo::{Distance, Haversine, Point};

use manhunt_protocol::Position;

/// Great-circle distance between two positions, in meters.
///
/// Symmetric, non-negative, and zero exactly when both positions are
/// numerically identical.
pub fn distance_meters(a: Position, b: Position) -> f64 {
    // geo points are (x, y), i.e. (lon, lat).
    let a = Point::new(a.lon, a.lat);
    let b = Point::new(b.lon, b.lat);
    Haversine.distance(a, b)
}

// =========================================================================
// Tests
// =========================================================================
