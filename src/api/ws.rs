//! Real-time push channel for token rotations.
//!
//! Each connected monitor client gets one `initial_state` message with the
//! current token, then every `token_update` event as rotations happen. The
//! inbound side of the socket carries no protocol; frames (or their
//! absence) only signal liveness. The outbound relay and the inbound drain
//! are raced against each other, and the connection is torn down as soon as
//! either terminates. Delivery is best-effort and at-most-once; a send
//! failure ends that connection and nothing else.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::events::PushMessage;
use crate::AppState;

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading the current token: a rotation landing in
    // between is then delivered as an update rather than lost.
    let mut events = state.bus.subscribe();

    let current = match state.tokens.current() {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Failed to read current token for new subscriber");
            return;
        }
    };

    if send_message(&mut sender, &PushMessage::InitialState { token: current })
        .await
        .is_err()
    {
        return;
    }

    debug!("Monitor client connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let msg = PushMessage::TokenUpdate { token: event.token };
                    if send_message(&mut sender, &msg).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Only the newest token matters; skipped intermediate
                    // rotations are already stale.
                    warn!(skipped, "Subscriber lagged behind rotation events");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = drain_inbound(&mut receiver) => {
                if !inbound {
                    break;
                }
            }
        }
    }

    debug!("Monitor client disconnected");
}

/// Drain one inbound frame. Returns false when the client is gone.
async fn drain_inbound(receiver: &mut SplitStream<WebSocket>) -> bool {
    match receiver.next().await {
        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => false,
        Some(Ok(_)) => true,
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &PushMessage,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(text)).await
}
