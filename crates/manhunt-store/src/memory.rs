//! In-process implementation of the location store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use manhunt_protocol::{PlayerId, Position};

use crate::{LocationStore, StoreError};

/// A [`LocationStore`] backed by a plain in-process map.
///
/// Positions live exactly as long as the process, which matches the
/// session lifecycle: the game itself is never persisted across
/// restarts. Cloning yields another handle to the same map, so a test
/// can keep one handle and hand the other to the session. Infallible
/// in practice.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    positions: Arc<Mutex<HashMap<PlayerId, Position>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationStore for MemoryStore {
    async fn get(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<Position>, StoreError> {
        Ok(self.positions.lock().await.get(&player_id).copied())
    }

    async fn set(
        &self,
        player_id: PlayerId,
        position: Position,
    ) -> Result<(), StoreError> {
        self.positions.lock().await.insert(player_id, position);
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
