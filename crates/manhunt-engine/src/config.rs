//! Game session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for a game session, supplied externally at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Maximum distance, in meters, at which the Seeker eliminates a
    /// Target. The comparison is inclusive: a Target exactly at this
    /// distance is eliminated.
    pub elimination_radius_m: f64,

    /// How long the Seeker has to eliminate every Target before the
    /// session resolves against them.
    pub duration: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            elimination_radius_m: 1.0,
            duration: Duration::from_secs(300),
        }
    }
}

impl GameConfig {
    /// Returns a copy with out-of-range values clamped to usable ones.
    ///
    /// Called once when the session starts, so the rest of the engine
    /// can assume a non-negative finite radius and a non-zero duration.
    pub fn validated(mut self) -> Self {
        if !self.elimination_radius_m.is_finite() {
            warn!(
                radius = self.elimination_radius_m,
                "elimination radius is not finite, using default"
            );
            self.elimination_radius_m = Self::default().elimination_radius_m;
        }
        if self.elimination_radius_m < 0.0 {
            warn!(
                radius = self.elimination_radius_m,
                "elimination radius is negative, clamping to zero"
            );
            self.elimination_radius_m = 0.0;
        }
        if self.duration.is_zero() {
            warn!("game duration is zero, using default");
            self.duration = Self::default().duration;
        }
        self
    }
}
