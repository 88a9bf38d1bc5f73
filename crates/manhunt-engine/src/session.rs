//! The game session: one concurrency boundary around the whole game.
//!
//! Many short-lived connection tasks call [`GameSession::handle_update`]
//! concurrently, and one timer task races them to resolve the outcome.
//! All of them funnel through a single `tokio::sync::Mutex` around
//! [`GameState`], so "sweep all targets, check the win condition" is
//! indivisible. Everything slow or fallible (the broadcast fan-out,
//! the store write-through) happens strictly after the lock is
//! released; the authoritative state never waits on I/O.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};

use manhunt_protocol::{
    PlayerId, PlayerSnapshot, Position, Role, ServerMessage,
};
use manhunt_store::LocationStore;

use crate::state::UpdateEffects;
use crate::{GameConfig, GameError, GameState};

/// Sender half of the broadcast gateway. Notifications are
/// fire-and-forget: a send with no listeners is not an error, and a
/// lagging listener drops old events rather than slowing the game.
pub type EventSender = broadcast::Sender<ServerMessage>;

/// One running game, shared by every connection handler.
pub struct GameSession<S> {
    state: Arc<Mutex<GameState>>,
    store: S,
    events: EventSender,
}

impl<S: LocationStore> GameSession<S> {
    /// Creates the session and starts its one-shot timer.
    ///
    /// Called once at process startup; the session lives until the
    /// process exits and is never persisted.
    pub fn start(config: GameConfig, store: S, events: EventSender) -> Self {
        let config = config.validated();
        let duration = config.duration;
        let state = Arc::new(Mutex::new(GameState::new(config)));
        spawn_timer(Arc::clone(&state), events.clone(), duration);
        tracing::info!(
            duration_secs = duration.as_secs(),
            "game session started"
        );
        Self {
            state,
            store,
            events,
        }
    }

    /// Adds a player to the roster (idempotently) and seeds their
    /// position from the store if they have none yet.
    ///
    /// The store read happens before the lock is taken; a slow or dead
    /// cache delays only this player's join, never the critical
    /// section.
    pub async fn join(&self, player_id: PlayerId) -> PlayerSnapshot {
        let cached = match self.store.get(player_id).await {
            Ok(pos) => pos,
            Err(e) => {
                tracing::warn!(
                    %player_id,
                    error = %e,
                    "location store read failed, joining without a seed"
                );
                None
            }
        };
        self.state.lock().await.join(player_id, cached)
    }

    /// The single entry point for location reports.
    ///
    /// Validates the coordinates, applies the update (with the
    /// elimination sweep and win check when the Seeker reports) under
    /// the session lock, then publishes the resulting notifications
    /// and writes the position through to the store.
    ///
    /// # Errors
    /// Returns a [`GameError`] for malformed coordinates; nothing is
    /// mutated in that case.
    pub async fn handle_update(
        &self,
        player_id: PlayerId,
        role: Role,
        lat: f64,
        lon: f64,
    ) -> Result<PlayerSnapshot, GameError> {
        let position = validate_coordinates(lat, lon)?;

        let UpdateEffects { snapshot, events } = {
            let mut state = self.state.lock().await;
            state.record_update(player_id, role, position)
        };

        for event in events {
            let _ = self.events.send(event);
        }
        // Best-effort write-through; the in-memory update above already
        // succeeded.
        if let Err(e) = self.store.set(player_id, position).await {
            tracing::warn!(%player_id, error = %e, "location store write failed");
        }

        Ok(snapshot)
    }

    /// Snapshot of the whole roster, in id order.
    pub async fn roster_snapshot(&self) -> Vec<PlayerSnapshot> {
        self.state.lock().await.snapshots()
    }

    pub async fn outcome(&self) -> crate::Outcome {
        self.state.lock().await.outcome()
    }

    /// A fresh receiver on the broadcast gateway.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }
}

/// Spawns the one-shot deadline task.
///
/// Fires exactly once after `duration`; resolution goes through the
/// same check-and-set as the win path, so racing a final sweep is
/// safe: whichever acquires the lock first decides, the other no-ops.
fn spawn_timer(
    state: Arc<Mutex<GameState>>,
    events: EventSender,
    duration: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        let resolved = { state.lock().await.resolve_timeout() };
        if let Some(result) = resolved {
            let _ = events.send(ServerMessage::GameOver { result });
        }
    });
}

/// Rejects non-finite or out-of-range coordinates before they can
/// touch the roster.
fn validate_coordinates(lat: f64, lon: f64) -> Result<Position, GameError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(GameError::NonFiniteCoordinates(lat, lon));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(GameError::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(GameError::InvalidLongitude(lon));
    }
    Ok(Position::new(lat, lon))
}

// =========================================================================
// Tests
// =========================================================================
