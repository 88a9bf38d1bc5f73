//! Last-known-position store for the manhunt game server.
//!
//! The game engine keeps all authoritative state in memory; the store
//! is a best-effort cache of each player's last reported position so a
//! rejoining player shows up on the map before their first new report.
//!
//! The engine consumes the [`LocationStore`] trait and never depends on
//! a concrete backend. [`MemoryStore`] is the shipped implementation; a
//! Redis-backed one would implement the same two methods. Store
//! failures degrade persistence, never game logic; callers log and
//! carry on.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use manhunt_protocol::{PlayerId, Position};

/// A best-effort cache of last known player positions.
///
/// Read-through on join, written-through after every accepted location
/// update. Both methods return futures that are `Send` so the engine
/// can await them from spawned connection tasks.
pub trait LocationStore: Send + Sync + 'static {
    /// Looks up a player's last known position.
    ///
    /// `Ok(None)` means the store is healthy but has never seen this
    /// player; an `Err` means the backend is unreachable.
    fn get(
        &self,
        player_id: PlayerId,
    ) -> impl std::future::Future<Output = Result<Option<Position>, StoreError>> + Send;

    /// Records a player's position, overwriting any previous entry.
    fn set(
        &self,
        player_id: PlayerId,
        position: Position,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
