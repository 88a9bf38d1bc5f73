//! The proximity-elimination game engine.
//!
//! One [`GameSession`] owns all mutable game state behind a single
//! mutex: the roster, the active-target set, and the outcome. Location
//! reports flow in through [`GameSession::handle_update`]; when the
//! Seeker reports, the elimination sweep and the win check run as one
//! indivisible step. A one-shot timer resolves the session against the
//! Seeker if they run out of time.
//!
//! # Key types
//!
//! - [`GameSession`]: the concurrency boundary and public entry point
//! - [`GameState`]: roster, eliminations, and outcome transitions
//! - [`GameConfig`]: elimination radius and session duration
//! - [`Outcome`]: in-progress / seeker-wins / seeker-loses
//! - [`distance_meters`]: the great-circle distance evaluator

mod config;
mod error;
mod geo;
mod session;
mod state;

pub use config::GameConfig;
pub use error::GameError;
pub use geo::distance_meters;
pub use session::{EventSender, GameSession};
pub use state::{GameState, Outcome, Player};
