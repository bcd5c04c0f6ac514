//! `WebSocket` stream of resolved turns.
//!
//! `GET /ws/turns` upgrades the connection. The newest turn already in the
//! snapshot is sent first so a late client has something to draw, then every
//! [`TurnBroadcast`] is forwarded as a JSON text frame. Clients that fall
//! behind the channel lose the missed turns and continue from the newest.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use wayfarer_types::EpisodeId;

use crate::state::{AppState, TurnBroadcast};

/// `GET /ws/turns`
pub async fn ws_turns(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_turns(socket, state))
}

/// The newest recorded turn, if the engine has published one.
async fn latest_turn(state: &AppState) -> Option<TurnBroadcast> {
    let snapshot = state.snapshot.read().await;
    let episode_id = snapshot.episode_id?;
    let status = snapshot.status.as_ref()?;
    let record = snapshot.history.last()?;
    Some(TurnBroadcast::from_record(episode_id, record, status))
}

/// Send one turn as a text frame. `false` once the client is gone.
async fn send_turn(socket: &mut WebSocket, turn: &TurnBroadcast) -> bool {
    match serde_json::to_string(turn) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(turn = turn.turn, error = %e, "turn broadcast not serializable");
            true
        }
    }
}

/// A turn at or before the last one sent, within the same episode.
fn already_sent(last_sent: Option<(EpisodeId, u64)>, turn: &TurnBroadcast) -> bool {
    last_sent.is_some_and(|(episode_id, sent)| episode_id == turn.episode_id && turn.turn <= sent)
}

async fn stream_turns(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the snapshot so no turn falls in between.
    let mut rx = state.subscribe();
    let mut last_sent = None;
    debug!("turn stream client connected");

    if let Some(turn) = latest_turn(&state).await {
        last_sent = Some((turn.episode_id, turn.turn));
        if !send_turn(&mut socket, &turn).await {
            return;
        }
    }

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(turn) if already_sent(last_sent, &turn) => {}
                Ok(turn) => {
                    last_sent = Some((turn.episode_id, turn.turn));
                    if !send_turn(&mut socket, &turn).await {
                        debug!("turn stream client gone");
                        return;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "turn stream client lagged");
                }
                Err(RecvError::Closed) => return,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Ping(payload))) => {
                    if socket.send(Message::Pong(payload)).await.is_err() {
                        return;
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => {
                    debug!("turn stream client closed");
                    return;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}
