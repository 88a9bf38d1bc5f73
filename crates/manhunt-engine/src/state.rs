//! Authoritative game state and its transitions.
//!
//! Everything in this module is synchronous and single-threaded by
//! construction: [`GameState`] is owned by a
//! [`GameSession`](crate::GameSession) behind one mutex, and every
//! invariant-bearing transition (role assignment, the elimination
//! sweep, win and loss resolution) is a plain `&mut self` method. That
//! keeps the rules unit-testable without a runtime and makes the
//! critical section explicit at the call site.

use std::collections::{HashMap, HashSet};

use manhunt_protocol::{
    GameResult, PlayerId, PlayerSnapshot, PlayerStatus, Position, Role,
    ServerMessage,
};

use crate::{GameConfig, geo};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The session's result state.
///
/// Transitions `InProgress` to one of the resolved variants at most
/// once, and only inside [`GameState::record_update`] (seeker wins) or
/// [`GameState::resolve_timeout`] (seeker loses). Once resolved it
/// never changes; racing resolvers observe the resolved value and
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    SeekerWins,
    SeekerLoses,
}

impl Outcome {
    /// Returns `true` once the session has a final result.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// The wire-facing result, if resolved.
    pub fn result(&self) -> Option<GameResult> {
        match self {
            Self::InProgress => None,
            Self::SeekerWins => Some(GameResult::SeekerWins),
            Self::SeekerLoses => Some(GameResult::SeekerLoses),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::SeekerWins => write!(f, "cop_wins"),
            Self::SeekerLoses => write!(f, "cop_loses"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One roster entry.
///
/// `position` stays `None` until the player's first accepted report
/// (or a seeded value from the location store on join); a Target with
/// no known position cannot be eliminated.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub role: Role,
    pub position: Option<Position>,
    pub status: PlayerStatus,
}

impl Player {
    fn new(id: PlayerId, role: Role) -> Self {
        Self {
            id,
            role,
            position: None,
            status: PlayerStatus::Active,
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: self.id,
            role: self.role,
            status: self.status,
            position: self.position,
        }
    }
}

/// What one accepted update produced: the reporter's post-update state
/// and the notifications to publish once the lock is released.
pub(crate) struct UpdateEffects {
    pub snapshot: PlayerSnapshot,
    pub events: Vec<ServerMessage>,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The single source of truth for one game session.
///
/// Invariants maintained here:
/// - at most one player ever holds [`Role::Seeker`], assigned
///   first-come and never reassigned;
/// - `active_targets` always equals the set of Target players with
///   status [`PlayerStatus::Active`], and only ever shrinks;
/// - [`PlayerStatus::Eliminated`] is terminal;
/// - [`Outcome`] resolves at most once.
pub struct GameState {
    config: GameConfig,
    roster: HashMap<PlayerId, Player>,
    active_targets: HashSet<PlayerId>,
    seeker: Option<PlayerId>,
    outcome: Outcome,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config: config.validated(),
            roster: HashMap::new(),
            active_targets: HashSet::new(),
            seeker: None,
            outcome: Outcome::InProgress,
        }
    }

    /// Assigns a role to a player, first-come: the first player becomes
    /// the Seeker, everyone after a Target. Idempotent; an already
    /// assigned player keeps their role no matter what they ask for.
    pub fn assign(&mut self, player_id: PlayerId) -> Role {
        if let Some(player) = self.roster.get(&player_id) {
            return player.role;
        }
        let role = if self.seeker.is_none() {
            self.seeker = Some(player_id);
            Role::Seeker
        } else {
            Role::Target
        };
        self.roster.insert(player_id, Player::new(player_id, role));
        if role == Role::Target {
            self.active_targets.insert(player_id);
        }
        tracing::info!(%player_id, %role, "player joined the session");
        role
    }

    /// Adds a player (idempotently) and seeds their position from the
    /// location store if they have none yet. A cached position never
    /// overrides a live report.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        cached_position: Option<Position>,
    ) -> PlayerSnapshot {
        let role = self.assign(player_id);
        let player = self
            .roster
            .entry(player_id)
            .or_insert_with(|| Player::new(player_id, role));
        if player.position.is_none() {
            player.position = cached_position;
        }
        player.snapshot()
    }

    /// Applies an accepted location report.
    ///
    /// Records the position, and when the reporter is the Seeker and
    /// the session is still in progress, runs the elimination sweep
    /// and the win check in the same step. The returned events are in
    /// emission order: the generic update first, then one elimination
    /// per removed Target, the role-specific update, and finally
    /// `game_over` if this report resolved the session.
    pub(crate) fn record_update(
        &mut self,
        player_id: PlayerId,
        claimed_role: Role,
        position: Position,
    ) -> UpdateEffects {
        let role = self.assign(player_id);
        // The entry is guaranteed by assign; or_insert_with keeps this
        // total without an unwrap.
        let player = self
            .roster
            .entry(player_id)
            .or_insert_with(|| Player::new(player_id, role));
        if claimed_role != player.role {
            tracing::debug!(
                %player_id,
                claimed = %claimed_role,
                assigned = %player.role,
                "role conflict in report, assigned role kept"
            );
        }
        player.position = Some(position);
        let status = player.status;

        let mut events = vec![ServerMessage::LocationUpdate {
            player_id,
            role,
            lat: position.lat,
            lon: position.lon,
        }];

        match role {
            Role::Seeker => {
                let eliminated = if self.outcome == Outcome::InProgress {
                    self.sweep(position)
                } else {
                    Vec::new()
                };
                // Win only on the transition from non-empty to empty:
                // a sweep that removed nobody never resolves the game.
                let emptied =
                    !eliminated.is_empty() && self.active_targets.is_empty();

                for &target_id in &eliminated {
                    events.push(ServerMessage::MafiaEliminated {
                        mafia_id: target_id,
                    });
                }
                events.push(ServerMessage::CopLocationUpdate {
                    player_id,
                    lat: position.lat,
                    lon: position.lon,
                    active_targets: self.active_target_ids(),
                });
                if emptied {
                    self.outcome = Outcome::SeekerWins;
                    tracing::info!(%player_id, "all targets eliminated, seeker wins");
                    events.push(ServerMessage::GameOver {
                        result: GameResult::SeekerWins,
                    });
                }
            }
            Role::Target => {
                if status == PlayerStatus::Active
                    && self.outcome == Outcome::InProgress
                {
                    events.push(ServerMessage::MafiaLocationUpdate {
                        player_id,
                        lat: position.lat,
                        lon: position.lon,
                    });
                }
            }
        }

        UpdateEffects {
            snapshot: PlayerSnapshot {
                player_id,
                role,
                status,
                position: Some(position),
            },
            events,
        }
    }

    /// Eliminates every active Target within the configured radius of
    /// the Seeker's position. Distances are computed against one
    /// consistent snapshot of positions, then all matches are removed
    /// together.
    fn sweep(&mut self, seeker_position: Position) -> Vec<PlayerId> {
        let mut eliminated = Vec::new();
        for &target_id in &self.active_targets {
            let Some(target) = self.roster.get(&target_id) else {
                continue;
            };
            // A Target that has never reported has no position to be
            // caught at.
            let Some(target_position) = target.position else {
                continue;
            };
            let distance = geo::distance_meters(seeker_position, target_position);
            if distance <= self.config.elimination_radius_m {
                eliminated.push(target_id);
            }
        }
        eliminated.sort_by_key(|id| id.0);
        for &target_id in &eliminated {
            self.active_targets.remove(&target_id);
            if let Some(target) = self.roster.get_mut(&target_id) {
                target.status = PlayerStatus::Eliminated;
            }
            tracing::info!(player_id = %target_id, "target eliminated");
        }
        eliminated
    }

    /// The timer's resolution: if the session is still in progress and
    /// at least one Target survives, the Seeker loses. Uses the same
    /// check-and-set discipline as the win path, so whichever resolver
    /// runs first decides and the other no-ops.
    pub fn resolve_timeout(&mut self) -> Option<GameResult> {
        if self.outcome.is_resolved() || self.active_targets.is_empty() {
            return None;
        }
        self.outcome = Outcome::SeekerLoses;
        tracing::info!(
            remaining = self.active_targets.len(),
            "time expired with targets remaining, seeker loses"
        );
        Some(GameResult::SeekerLoses)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn seeker(&self) -> Option<PlayerId> {
        self.seeker
    }

    /// Ids of Targets still in the game, in id order.
    pub fn active_target_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> =
            self.active_targets.iter().copied().collect();
        ids.sort_by_key(|id| id.0);
        ids
    }

    /// Snapshot of the whole roster, in id order.
    pub fn snapshots(&self) -> Vec<PlayerSnapshot> {
        let mut all: Vec<PlayerSnapshot> =
            self.roster.values().map(Player::snapshot).collect();
        all.sort_by_key(|s| s.player_id.0);
        all
    }
}

// =========================================================================
// Tests
// =========================================================================
