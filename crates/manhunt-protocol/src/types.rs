//! Core wire types for the manhunt protocol.
//!
//! Everything in this module crosses the network as JSON, so the serde
//! attributes here ARE the protocol. The wire vocabulary is what the
//! deployed phone clients expect (`cop`, `mafia`, `cop_wins`) while
//! the Rust identifiers use the engine's role names (Seeker, Target).
//! Tests at the bottom pin the exact JSON shapes.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A player's stable identifier.
///
/// Assigned by the credential registry at startup and carried in token
/// claims, so the same person maps to the same id across reconnects.
/// `#[serde(transparent)]` keeps it a plain number on the wire:
/// `PlayerId(2)` serializes as `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// A player's role for the whole session.
///
/// Exactly one Seeker exists per session; everyone else is a Target.
/// The wire names are the vocabulary the clients already speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "cop")]
    Seeker,
    #[serde(rename = "mafia")]
    Target,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Seeker => write!(f, "cop"),
            Role::Target => write!(f, "mafia"),
        }
    }
}

/// Whether a Target is still in the game.
///
/// `Eliminated` is terminal; a player never returns to `Active`.
/// The Seeker stays `Active` for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Eliminated,
}

/// The resolved result of a session.
///
/// `game_over` carries one of these; a session that is still running
/// has no result yet and never puts `InProgress` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "cop_wins")]
    SeekerWins,
    #[serde(rename = "cop_loses")]
    SeekerLoses,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::SeekerWins => write!(f, "cop_wins"),
            GameResult::SeekerLoses => write!(f, "cop_loses"),
        }
    }
}

/// A geographic coordinate, degrees.
///
/// Latitude in [-90, 90], longitude in [-180, 180]; range checks happen
/// at ingestion, not here, so malformed reports can be rejected with a
/// proper error instead of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// One roster entry as reported to clients.
///
/// Used by the `all_users` snapshot and the `player_state` reply.
/// `position` is absent until the player's first accepted report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub role: Role,
    pub status: PlayerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

// ---------------------------------------------------------------------------
// Client → server messages
// ---------------------------------------------------------------------------

/// Messages a client may send, internally tagged with `"type"`.
///
/// The first frame on a connection must be `login` or `resume`; after a
/// successful handshake the client sends `location_report` frames only.
///
/// ```json
/// { "type": "location_report", "player_id": 0, "role": "cop",
///   "lat": 40.0, "lon": -70.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Authenticate with configured credentials; the reply is `welcome`
    /// with a fresh token pair.
    Login { name: String, password: String },

    /// Re-authenticate a reconnect with a previously issued access
    /// token; lands on the same roster entry as the original login.
    Resume { access_token: String },

    /// A position report. `player_id` must match the authenticated
    /// identity; `role` is the client's belief and is not trusted for
    /// assignment.
    LocationReport {
        player_id: PlayerId,
        role: Role,
        lat: f64,
        lon: f64,
    },
}

// ---------------------------------------------------------------------------
// Server → client messages
// ---------------------------------------------------------------------------

/// Messages the server sends, internally tagged with `"event"`.
///
/// `welcome`, `all_users`, `player_state`, and `error` are direct
/// replies on one connection; everything else is broadcast to every
/// connected client through the broadcast gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Successful login or resume. Token fields are empty strings on a
    /// `resume` (the client already holds a valid pair).
    Welcome {
        player_id: PlayerId,
        role: Role,
        access_token: String,
        refresh_token: String,
        expires_at: u64,
    },

    /// Roster snapshot, pushed right after `welcome`.
    AllUsers { players: Vec<PlayerSnapshot> },

    /// Direct reply to an accepted `location_report`: the reporting
    /// player's post-update state.
    PlayerState { player: PlayerSnapshot },

    /// Broadcast for every accepted report, regardless of role or
    /// game state.
    LocationUpdate {
        player_id: PlayerId,
        role: Role,
        lat: f64,
        lon: f64,
    },

    /// Broadcast when the Seeker's report is processed; carries the
    /// active targets remaining after the elimination sweep.
    CopLocationUpdate {
        player_id: PlayerId,
        lat: f64,
        lon: f64,
        active_targets: Vec<PlayerId>,
    },

    /// Broadcast when an active Target reports while the game is
    /// still in progress.
    MafiaLocationUpdate {
        player_id: PlayerId,
        lat: f64,
        lon: f64,
    },

    /// A Target came within the elimination radius of the Seeker.
    /// One per eliminated Target, even when a single sweep removes
    /// several.
    MafiaEliminated { mafia_id: PlayerId },

    /// The session resolved. Sent exactly once.
    GameOver { result: GameResult },

    /// Rejection of the current request. `code` follows HTTP
    /// conventions: 400 malformed, 401 unauthenticated, 403 identity
    /// mismatch.
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================
