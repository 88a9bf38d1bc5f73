//! End-to-end tests over a real socket: server on an ephemeral port,
//! tokio-tungstenite clients, JSON frames on the wire.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use manhunt::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port with the default credential list
/// and returns the address.
async fn start_server() -> String {
    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".into(),
        secret_key: "integration-test-secret".into(),
        ..ServerConfig::default()
    };
    let registry = CredentialRegistry::new(config.credentials());
    let issuer = TokenIssuer::new(
        config.secret_key.as_bytes(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    );
    let auth = TokenAuthenticator::new(registry, issuer);

    let server = ManhuntServerBuilder::new()
        .config(config)
        .build(auth, MemoryStore::new())
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_client(ws: &mut ClientWs, msg: &ClientMessage) {
    let text = serde_json::to_string(msg).expect("encode");
    ws.send(Message::text(text)).await.expect("send");
}

/// Reads frames until one decodes to a message the predicate accepts.
///
/// Broadcasts and direct replies interleave on a socket, so tests
/// pick out the message they care about instead of assuming order.
async fn wait_for(
    ws: &mut ClientWs,
    pred: impl Fn(&ServerMessage) -> bool,
) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let frame = ws
                .next()
                .await
                .expect("stream ended while waiting")
                .expect("ws error while waiting");
            if frame.is_close() {
                panic!("connection closed while waiting");
            }
            let msg: ServerMessage =
                serde_json::from_slice(&frame.into_data())
                    .expect("decode server message");
            if pred(&msg) {
                return msg;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Reads frames up to and including the first one the predicate
/// accepts, returning everything seen along the way.
///
/// For steps where a direct reply and several broadcasts land on the
/// same socket in no fixed order.
async fn collect_until(
    ws: &mut ClientWs,
    pred: impl Fn(&ServerMessage) -> bool,
) -> Vec<ServerMessage> {
    tokio::time::timeout(Duration::from_secs(2), async {
        let mut seen = Vec::new();
        loop {
            let frame = ws
                .next()
                .await
                .expect("stream ended while collecting")
                .expect("ws error while collecting");
            if frame.is_close() {
                panic!("connection closed while collecting");
            }
            let msg: ServerMessage =
                serde_json::from_slice(&frame.into_data())
                    .expect("decode server message");
            let done = pred(&msg);
            seen.push(msg);
            if done {
                return seen;
            }
        }
    })
    .await
    .expect("timed out collecting events")
}

/// Logs in, consumes `welcome` + `all_users`, and returns
/// (player_id, role, access_token).
async fn login(
    ws: &mut ClientWs,
    name: &str,
    password: &str,
) -> (PlayerId, Role, String) {
    send_client(
        ws,
        &ClientMessage::Login {
            name: name.into(),
            password: password.into(),
        },
    )
    .await;

    let welcome =
        wait_for(ws, |m| matches!(m, ServerMessage::Welcome { .. })).await;
    let (player_id, role, access_token) = match welcome {
        ServerMessage::Welcome {
            player_id,
            role,
            access_token,
            ..
        } => (player_id, role, access_token),
        other => panic!("expected welcome, got {other:?}"),
    };

    wait_for(ws, |m| matches!(m, ServerMessage::AllUsers { .. })).await;
    (player_id, role, access_token)
}

/// Sends a location report and returns the direct reply
/// (`player_state` on success, `error` on rejection).
async fn report(
    ws: &mut ClientWs,
    player_id: PlayerId,
    role: Role,
    lat: f64,
    lon: f64,
) -> ServerMessage {
    send_client(
        ws,
        &ClientMessage::LocationReport {
            player_id,
            role,
            lat,
            lon,
        },
    )
    .await;
    wait_for(ws, |m| {
        matches!(
            m,
            ServerMessage::PlayerState { .. } | ServerMessage::Error { .. }
        )
    })
    .await
}

// =========================================================================
// Login and identity
// =========================================================================

#[tokio::test]
async fn test_login_first_player_becomes_cop() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_client(
        &mut ws,
        &ClientMessage::Login {
            name: "Elon Musk".into(),
            password: "Tesla".into(),
        },
    )
    .await;

    match wait_for(&mut ws, |m| matches!(m, ServerMessage::Welcome { .. }))
        .await
    {
        ServerMessage::Welcome {
            player_id,
            role,
            access_token,
            refresh_token,
            expires_at,
        } => {
            assert_eq!(player_id, PlayerId(0));
            assert_eq!(role, Role::Seeker);
            assert!(!access_token.is_empty());
            assert!(!refresh_token.is_empty());
            assert!(expires_at > 0);
        }
        other => panic!("expected welcome, got {other:?}"),
    }

    // The roster snapshot follows and already contains us.
    match wait_for(&mut ws, |m| matches!(m, ServerMessage::AllUsers { .. }))
        .await
    {
        ServerMessage::AllUsers { players } => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].player_id, PlayerId(0));
        }
        other => panic!("expected all_users, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_second_player_becomes_mafia() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    let (_, role1, _) = login(&mut ws1, "Elon Musk", "Tesla").await;
    assert_eq!(role1, Role::Seeker);

    let mut ws2 = connect(&addr).await;
    let (id2, role2, _) = login(&mut ws2, "Bill Gates", "Clippy").await;
    assert_eq!(id2, PlayerId(1));
    assert_eq!(role2, Role::Target);
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_client(
        &mut ws,
        &ClientMessage::Login {
            name: "Elon Musk".into(),
            password: "Edsel".into(),
        },
    )
    .await;

    match wait_for(&mut ws, |m| matches!(m, ServerMessage::Error { .. }))
        .await
    {
        ServerMessage::Error { code, .. } => assert_eq!(code, 401),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_message_must_be_login() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_client(
        &mut ws,
        &ClientMessage::LocationReport {
            player_id: PlayerId(0),
            role: Role::Seeker,
            lat: 40.0,
            lon: -70.0,
        },
    )
    .await;

    match wait_for(&mut ws, |m| matches!(m, ServerMessage::Error { .. }))
        .await
    {
        ServerMessage::Error { code, .. } => assert_eq!(code, 400),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resume_restores_identity() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    let (id, role, access_token) =
        login(&mut ws1, "Elon Musk", "Tesla").await;
    assert_eq!(role, Role::Seeker);
    ws1.close(None).await.expect("close");

    // Reconnect with the token instead of credentials.
    let mut ws2 = connect(&addr).await;
    send_client(&mut ws2, &ClientMessage::Resume { access_token }).await;

    match wait_for(&mut ws2, |m| matches!(m, ServerMessage::Welcome { .. }))
        .await
    {
        ServerMessage::Welcome {
            player_id,
            role,
            access_token,
            ..
        } => {
            assert_eq!(player_id, id);
            // Same roster entry, so still the cop.
            assert_eq!(role, Role::Seeker);
            // Resume issues no fresh tokens.
            assert!(access_token.is_empty());
        }
        other => panic!("expected welcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resume_with_bad_token_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_client(
        &mut ws,
        &ClientMessage::Resume {
            access_token: "not-a-jwt".into(),
        },
    )
    .await;

    match wait_for(&mut ws, |m| matches!(m, ServerMessage::Error { .. }))
        .await
    {
        ServerMessage::Error { code, .. } => assert_eq!(code, 401),
        other => panic!("expected error, got {other:?}"),
    }
}

// =========================================================================
// Location reports
// =========================================================================

#[tokio::test]
async fn test_report_for_another_player_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let (id, role, _) = login(&mut ws, "Elon Musk", "Tesla").await;
    assert_eq!(id, PlayerId(0));

    match report(&mut ws, PlayerId(5), role, 40.0, -70.0).await {
        ServerMessage::Error { code, .. } => assert_eq!(code, 403),
        other => panic!("expected error 403, got {other:?}"),
    }
}

#[tokio::test]
async fn test_out_of_range_latitude_rejected_then_recovers() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let (id, role, _) = login(&mut ws, "Elon Musk", "Tesla").await;

    match report(&mut ws, id, role, 95.0, -70.0).await {
        ServerMessage::Error { code, .. } => assert_eq!(code, 400),
        other => panic!("expected error 400, got {other:?}"),
    }

    // The connection and the session both survive the bad report.
    match report(&mut ws, id, role, 40.0, -70.0).await {
        ServerMessage::PlayerState { player } => {
            assert_eq!(player.player_id, id);
            assert_eq!(player.position, Some(Position::new(40.0, -70.0)));
        }
        other => panic!("expected player_state, got {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_frame_gets_error_and_connection_survives() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let (id, role, _) = login(&mut ws, "Elon Musk", "Tesla").await;

    ws.send(Message::text("not json")).await.expect("send");
    match wait_for(&mut ws, |m| matches!(m, ServerMessage::Error { .. }))
        .await
    {
        ServerMessage::Error { code, .. } => assert_eq!(code, 400),
        other => panic!("expected error, got {other:?}"),
    }

    match report(&mut ws, id, role, 40.0, -70.0).await {
        ServerMessage::PlayerState { .. } => {}
        other => panic!("expected player_state, got {other:?}"),
    }
}

// =========================================================================
// The hunt on the wire
// =========================================================================

#[tokio::test]
async fn test_capture_and_game_over_reach_every_client() {
    let addr = start_server().await;

    let mut cop_ws = connect(&addr).await;
    let (cop_id, cop_role, _) =
        login(&mut cop_ws, "Elon Musk", "Tesla").await;
    assert_eq!(cop_role, Role::Seeker);

    let mut mafia_ws = connect(&addr).await;
    let (mafia_id, mafia_role, _) =
        login(&mut mafia_ws, "Bill Gates", "Clippy").await;
    assert_eq!(mafia_role, Role::Target);

    // The mafia reports from a street corner; the reply confirms the
    // position landed.
    match report(&mut mafia_ws, mafia_id, mafia_role, 40.7128, -74.0060)
        .await
    {
        ServerMessage::PlayerState { player } => {
            assert_eq!(player.status, PlayerStatus::Active);
        }
        other => panic!("expected player_state, got {other:?}"),
    }

    // The cop sees the mafia movement broadcast.
    match wait_for(&mut cop_ws, |m| {
        matches!(m, ServerMessage::MafiaLocationUpdate { .. })
    })
    .await
    {
        ServerMessage::MafiaLocationUpdate { player_id, lat, .. } => {
            assert_eq!(player_id, mafia_id);
            assert_eq!(lat, 40.7128);
        }
        other => panic!("expected mafia_location_update, got {other:?}"),
    }

    // The cop walks onto the same corner. The direct player_state
    // reply and the broadcast frames race on this socket, so collect
    // until the ending shows up and assert on the whole trace.
    send_client(
        &mut cop_ws,
        &ClientMessage::LocationReport {
            player_id: cop_id,
            role: cop_role,
            lat: 40.7128,
            lon: -74.0060,
        },
    )
    .await;

    let trace = collect_until(&mut cop_ws, |m| {
        matches!(m, ServerMessage::GameOver { .. })
    })
    .await;
    assert!(trace.iter().any(|m| matches!(
        m,
        ServerMessage::MafiaEliminated { mafia_id: caught } if *caught == mafia_id
    )));
    assert!(trace.iter().any(|m| matches!(
        m,
        ServerMessage::GameOver {
            result: GameResult::SeekerWins
        }
    )));

    // The mafia's socket gets the ending too.
    match wait_for(&mut mafia_ws, |m| {
        matches!(m, ServerMessage::GameOver { .. })
    })
    .await
    {
        ServerMessage::GameOver { result } => {
            assert_eq!(result, GameResult::SeekerWins);
        }
        other => panic!("expected game_over, got {other:?}"),
    }
}

#[tokio::test]
async fn test_roster_snapshot_carries_reported_positions() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    let (id1, role1, _) = login(&mut ws1, "Elon Musk", "Tesla").await;
    report(&mut ws1, id1, role1, 40.7128, -74.0060).await;

    // A later joiner's all_users already shows where the cop is.
    let mut ws2 = connect(&addr).await;
    send_client(
        &mut ws2,
        &ClientMessage::Login {
            name: "Bill Gates".into(),
            password: "Clippy".into(),
        },
    )
    .await;
    wait_for(&mut ws2, |m| matches!(m, ServerMessage::Welcome { .. }))
        .await;

    match wait_for(&mut ws2, |m| matches!(m, ServerMessage::AllUsers { .. }))
        .await
    {
        ServerMessage::AllUsers { players } => {
            assert_eq!(players.len(), 2);
            let cop = players
                .iter()
                .find(|p| p.player_id == id1)
                .expect("cop in roster");
            assert_eq!(cop.role, Role::Seeker);
            assert_eq!(
                cop.position,
                Some(Position::new(40.7128, -74.0060))
            );
        }
        other => panic!("expected all_users, got {other:?}"),
    }
}
