use axum::{
    extract::{State, ws::{WebSocket, WebSocketUpgrade, Message}},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::time::{interval, Duration};

use super::rest::AppState;
use crate::services::render;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

fn screen_message(state: &AppState) -> Message {
    let screen = render::screen(&state.poller.view());
    let msg = serde_json::json!({
        "type": "screen",
        "loading": screen.is_loading(),
        "text": screen.to_text(),
    });
    Message::Text(msg.to_string())
}

/// Pushes the rendered screen on connect and after every state change.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut revisions = state.poller.subscribe();
    let mut heartbeat_ticker = interval(Duration::from_secs(10));

    if sender.send(screen_message(&state)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                // poller gone
                if changed.is_err() {
                    return;
                }
                if sender.send(screen_message(&state)).await.is_err() {
                    return;
                }
            }

            _ = heartbeat_ticker.tick() => {
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    return;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    _ => {}
                }
            }
        }
    }
}
