use axum::{
    debug_handler,
    extract::ws::{WebSocket, WebSocketUpgrade},
    response::IntoResponse,
};

/// Realtime socket endpoint. Wired for the clients that open it, but the
/// server only logs connects/disconnects and drains inbound frames; no
/// events are published yet.
#[debug_handler]
pub async fn connect(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle)
}

async fn handle(mut socket: WebSocket) {
    tracing::info!("realtime client connected");

    while let Some(Ok(_)) = socket.recv().await {}

    tracing::info!("realtime client disconnected");
}
