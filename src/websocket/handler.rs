use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    extract::{ConnectInfo, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{ReceivedMessage, SendMessage};
use crate::sync::{ConnectionId, Joined};
use crate::AppState;
use super::msg_get_ip_handler::handle_get_ip_message;
use super::msg_ping_handler::handle_ping_message;
use super::msg_update_caret_handler::handle_update_caret_message;
use super::msg_update_input_handler::handle_update_input_message;

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(origin): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt from {}", origin);
    ws.on_upgrade(move |socket| handle_socket(socket, origin, state))
}

/// Serialize and write one event to a single socket.
pub async fn send_message(sender: &WsSender, message: &SendMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.lock().await.send(Message::Text(text)).await
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, origin: SocketAddr, state: Arc<AppState>) {

    let connection_id = Uuid::new_v4();
    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(Mutex::new(sender));

    // Register, take the snapshot and subscribe in one critical section
    let joined = state.hub.lock().await.connect(connection_id, origin);
    let Joined { snapshot, events: mut rbc } = match joined {
        Ok(joined) => joined,
        Err(e) => {
            error!("Rejecting connection from {}: {}", origin, e);
            return;
        }
    };

    // Bootstrap the joiner before any of its own events are read
    if let Err(e) = send_message(&sender, &SendMessage::Sync(snapshot)).await {
        error!("Failed to send sync to {}: {}", connection_id, e);
        state.hub.lock().await.disconnect(&connection_id);
        return;
    }
    info!("WebSocket connection {} established from {}", connection_id, origin);

    // Read events from the socket, strictly in the order they were sent
    let recv_state = state.clone();
    let recv_sender = sender.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => dispatch(&text, connection_id, &recv_state, &recv_sender).await,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("WebSocket read error on {}: {}", connection_id, e);
                    break;
                }
            }
        }
    });

    // Forward fan-out events addressed to this connection
    let send_state = state.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            match rbc.recv().await {
                Ok(outbound) => {
                    if !outbound.is_for(&connection_id) {
                        continue;
                    }
                    if send_message(&sender, &outbound.message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Missed updates cannot be replayed, so start over from a fresh snapshot
                    warn!("Connection {} lagged by {} events, resyncing", connection_id, skipped);
                    let snapshot = {
                        let hub = send_state.hub.lock().await;
                        rbc = rbc.resubscribe();
                        hub.snapshot()
                    };
                    if send_message(&sender, &SendMessage::Sync(snapshot)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.hub.lock().await.disconnect(&connection_id);
    info!("WebSocket connection {} terminated", connection_id);
}

/// Decode one frame and route it to its handler. A bad frame is dropped on its own.
async fn dispatch(frame: &str, connection_id: ConnectionId, state: &Arc<AppState>, sender: &WsSender) {
    let message = match ReceivedMessage::parse(frame) {
        Ok(message) => message,
        Err(e) => {
            warn!("Dropping event from {}: {}", connection_id, e);
            return;
        }
    };

    match message {
        ReceivedMessage::GetIp => handle_get_ip_message(connection_id, state).await,
        ReceivedMessage::UpdateInput(payload) => handle_update_input_message(payload, connection_id, state).await,
        ReceivedMessage::UpdateCaret(caret) => handle_update_caret_message(&caret, connection_id, state).await,
        ReceivedMessage::Ping => handle_ping_message(connection_id, sender).await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};

    use crate::config::Config;
    use crate::models::{EditPayload, KeystrokeEdit, SendMessage};
    use crate::routes::create_router;
    use crate::AppState;

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn start_server() -> std::net::SocketAddr {
        let state = AppState::new(Config::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let app = create_router(state, &Config::default());
            axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>())
                .await
                .unwrap();
        });
        addr
    }

    async fn join(addr: std::net::SocketAddr) -> Client {
        let (ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
        ws
    }

    async fn emit(ws: &mut Client, frame: Value) {
        ws.send(tungstenite::Message::text(frame.to_string())).await.unwrap();
    }

    async fn next_event(ws: &mut Client) -> SendMessage {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(3), ws.next())
                .await
                .expect("timed out waiting for an event")
                .expect("stream ended")
                .unwrap();
            if let tungstenite::Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    /// getIP doubles as a barrier: once the requester sees its ip event, every
    /// earlier event it sent has been applied.
    async fn barrier(ws: &mut Client) {
        emit(ws, json!({"event": "getIP", "data": 1})).await;
        assert_eq!(next_event(ws).await, SendMessage::Ip("127.0.0.1".into()));
    }

    #[tokio::test]
    async fn late_joiner_and_relay_flow() {
        let addr = start_server().await;

        let mut a = join(addr).await;
        assert_eq!(next_event(&mut a).await, SendMessage::Sync(String::new()));

        emit(&mut a, json!({"event": "updateInput", "data": "hi"})).await;
        barrier(&mut a).await;

        let mut b = join(addr).await;
        assert_eq!(next_event(&mut b).await, SendMessage::Sync("hi".into()));

        emit(&mut a, json!({"event": "updateInput", "data": {"caretPosition": 2, "keyPressed": 33}})).await;
        assert_eq!(
            next_event(&mut b).await,
            SendMessage::Update(EditPayload::Keystroke(KeystrokeEdit { caret_position: 2, key_pressed: 33 }))
        );

        // The sender gets no echo: the next thing it sees is its own barrier reply
        barrier(&mut a).await;
        assert_eq!(next_event(&mut b).await, SendMessage::Ip("127.0.0.1".into()));

        let mut c = join(addr).await;
        assert_eq!(next_event(&mut c).await, SendMessage::Sync("hi!".into()));
    }

    #[tokio::test]
    async fn caret_updates_are_silent() {
        let addr = start_server().await;
        let mut a = join(addr).await;
        let mut b = join(addr).await;
        next_event(&mut a).await;
        next_event(&mut b).await;

        emit(&mut a, json!({"event": "updateCaret", "data": {"caretPosition": 4}})).await;
        barrier(&mut a).await;

        assert_eq!(next_event(&mut b).await, SendMessage::Ip("127.0.0.1".into()));
    }

    #[tokio::test]
    async fn malformed_frames_do_not_close_the_connection() {
        let addr = start_server().await;
        let mut a = join(addr).await;
        next_event(&mut a).await;

        a.send(tungstenite::Message::text("{{ not json")).await.unwrap();
        emit(&mut a, json!({"event": "updateCaret", "data": {}})).await;
        emit(&mut a, json!({"event": "updateInput", "data": {"caretPosition": 0}})).await;
        emit(&mut a, json!({"event": "shout"})).await;

        barrier(&mut a).await;
        emit(&mut a, json!({"event": "ping"})).await;
        assert!(matches!(next_event(&mut a).await, SendMessage::Pong(_)));
    }
}
