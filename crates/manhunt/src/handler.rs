//! Per-connection handler: login handshake, roster push, event
//! forwarding, and the location report loop.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive `login` or `resume` -> establish identity
//!   2. Send `welcome` + `all_users`
//!   3. Spawn a forwarder pushing broadcast events to this socket
//!   4. Loop: receive `location_report` -> session update -> reply

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use manhunt_protocol::{ClientMessage, Codec, PlayerId, ServerMessage};
use manhunt_session::{Authenticator, AuthGrant};
use manhunt_store::LocationStore;
use manhunt_transport::{
    Connection, TransportError, WebSocketConnection,
};

use crate::ManhuntError;
use crate::server::ServerState;

/// How long a fresh connection gets to present credentials.
const LOGIN_DEADLINE: Duration = Duration::from_secs(5);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C, S>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C, S>>,
) -> Result<(), ManhuntError>
where
    A: Authenticator,
    C: Codec,
    S: LocationStore,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: identity ---
    let grant = perform_login(&conn, &state).await?;
    let player_id = grant.player_id;
    tracing::info!(%conn_id, %player_id, "player authenticated");

    // Subscribe before the roster snapshot so no event falls in the
    // gap between `all_users` and the forwarder starting.
    let events = state.session.subscribe();

    // --- Step 2: welcome + roster ---
    let snapshot = state.session.join(player_id).await;
    send(
        &conn,
        &state.codec,
        &ServerMessage::Welcome {
            player_id,
            role: snapshot.role,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
        },
    )
    .await?;
    send(
        &conn,
        &state.codec,
        &ServerMessage::AllUsers {
            players: state.session.roster_snapshot().await,
        },
    )
    .await?;

    // --- Step 3: broadcast forwarder ---
    let forwarder = tokio::spawn(forward_events(
        conn.clone(),
        Arc::clone(&state),
        events,
        player_id,
    ));

    // --- Step 4: report loop ---
    let result = drive_reports(&conn, &state, player_id).await;

    // The roster entry survives the disconnect; only this socket's
    // forwarder goes away.
    forwarder.abort();
    result
}

/// Reads the first frame and establishes who is on the other end.
///
/// A fresh client sends `login`; a reconnecting one sends `resume`
/// with its access token. Resume issues no new tokens, so the grant's
/// token fields are empty.
async fn perform_login<A, C, S>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C, S>>,
) -> Result<AuthGrant, ManhuntError>
where
    A: Authenticator,
    C: Codec,
    S: LocationStore,
{
    let data =
        match tokio::time::timeout(LOGIN_DEADLINE, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                return Err(TransportError::ConnectionClosed(
                    "before login".into(),
                )
                .into());
            }
            Ok(Err(e)) => return Err(ManhuntError::Transport(e)),
            Err(_) => {
                return Err(manhunt_protocol::ProtocolError::InvalidMessage(
                    "login timed out".into(),
                )
                .into());
            }
        };

    let msg: ClientMessage = match state.codec.decode(&data) {
        Ok(msg) => msg,
        Err(e) => {
            send_error(conn, &state.codec, 400, "malformed login").await?;
            return Err(e.into());
        }
    };

    match msg {
        ClientMessage::Login { name, password } => {
            match state.auth.login(&name, &password).await {
                Ok(grant) => Ok(grant),
                Err(e) => {
                    send_error(conn, &state.codec, 401, "unauthorized")
                        .await?;
                    Err(ManhuntError::Session(e))
                }
            }
        }
        ClientMessage::Resume { access_token } => {
            match state.auth.resume(&access_token).await {
                Ok(player_id) => Ok(AuthGrant {
                    player_id,
                    access_token: String::new(),
                    refresh_token: String::new(),
                    expires_at: 0,
                }),
                Err(e) => {
                    send_error(conn, &state.codec, 401, "unauthorized")
                        .await?;
                    Err(ManhuntError::Session(e))
                }
            }
        }
        ClientMessage::LocationReport { .. } => {
            send_error(
                conn,
                &state.codec,
                400,
                "expected login or resume",
            )
            .await?;
            Err(manhunt_protocol::ProtocolError::InvalidMessage(
                "first message must be login or resume".into(),
            )
            .into())
        }
    }
}

/// The post-login loop: location reports in, direct replies out.
///
/// No idle deadline here: an eliminated player legitimately goes
/// silent and just watches the broadcasts.
async fn drive_reports<A, C, S>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C, S>>,
    player_id: PlayerId,
) -> Result<(), ManhuntError>
where
    A: Authenticator,
    C: Codec,
    S: LocationStore,
{
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    %player_id, error = %e, "undecodable frame"
                );
                send_error(
                    conn,
                    &state.codec,
                    400,
                    "malformed message",
                )
                .await?;
                continue;
            }
        };

        match msg {
            ClientMessage::LocationReport {
                player_id: reported,
                role,
                lat,
                lon,
            } => {
                if reported != player_id {
                    tracing::warn!(
                        %player_id,
                        %reported,
                        "report for another player rejected"
                    );
                    send_error(
                        conn,
                        &state.codec,
                        403,
                        "player_id does not match this connection",
                    )
                    .await?;
                    continue;
                }

                match state
                    .session
                    .handle_update(player_id, role, lat, lon)
                    .await
                {
                    Ok(player) => {
                        send(
                            conn,
                            &state.codec,
                            &ServerMessage::PlayerState { player },
                        )
                        .await?;
                    }
                    Err(e) => {
                        send_error(
                            conn,
                            &state.codec,
                            400,
                            &e.to_string(),
                        )
                        .await?;
                    }
                }
            }

            ClientMessage::Login { .. } | ClientMessage::Resume { .. } => {
                send_error(
                    conn,
                    &state.codec,
                    400,
                    "already authenticated",
                )
                .await?;
            }
        }
    }
}

/// Pushes broadcast events to one socket until it goes away.
///
/// A lagging socket drops the events it missed and keeps going; a
/// dead one ends the task.
async fn forward_events<A, C, S>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C, S>>,
    mut events: broadcast::Receiver<ServerMessage>,
    player_id: PlayerId,
) where
    A: Authenticator,
    C: Codec,
    S: LocationStore,
{
    loop {
        match events.recv().await {
            Ok(event) => {
                let bytes = match state.codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "failed to encode broadcast event"
                        );
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    tracing::debug!(
                        %player_id,
                        "stopping forwarder, socket gone"
                    );
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    %player_id,
                    skipped,
                    "dropping events for a lagging connection"
                );
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Encodes and sends one server message on a connection.
async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), ManhuntError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends an `error` event on a connection.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), ManhuntError> {
    send(
        conn,
        codec,
        &ServerMessage::Error {
            code,
            message: message.to_string(),
        },
    )
    .await
}
