// src/server.rs
// HTTP/WebSocket front of the broadcast hub. Each connection task only
// shuttles frames: inbound JSON goes to the hub command channel, hub
// broadcasts come back out, filtered by origin for peer-only events.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::hub::{self, HubCommand, HubHandle};
use crate::logging::{log_error, log_error_stderr, log_info, log_warning};
use crate::protocol::{ClientEvent, ServerEvent};

pub struct AppState {
    pub hub: HubHandle,
    next_conn_id: AtomicU64,
}

pub fn start_server(config: ServerConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let (hub_handle, _hub_task) = hub::spawn();

        let app_state = Arc::new(AppState {
            hub: hub_handle,
            next_conn_id: AtomicU64::new(1),
        });

        let app = Router::new()
            .route("/status", get(handle_status))
            .route("/ws", get(handle_ws))
            .layer(CorsLayer::permissive())
            .with_state(app_state);

        let addr = SocketAddr::from((
            config.host.parse::<std::net::IpAddr>().unwrap_or([127, 0, 0, 1].into()),
            config.port,
        ));
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                log_error_stderr(&format!("Failed to start server: {e}"));
                return;
            }
        };

        log_info(&format!("Server starting on {addr}"));

        if let Err(err) = axum::serve(listener, app).await {
            log_error(&format!("Server error: {err:?}"));
        }

        log_info("Server shutdown complete");
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Response {
    match state.hub.snapshot().await {
        Some(snapshot) => Json(json!({
            "status": "running",
            "calledCount": snapshot.len(),
            "lastNumber": snapshot.last_number,
        }))
        .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "hub unavailable"})),
        )
            .into_response(),
    }
}

async fn handle_ws(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| client_connection(socket, state))
}

async fn client_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = state.next_conn_id.fetch_add(1, Ordering::Relaxed);

    // Subscribe before snapshotting so no event can fall in the gap between
    // the snapshot and the live stream. Anything delivered twice is absorbed
    // by the client's duplicate suppression.
    let mut events = state.hub.subscribe();
    let Some(snapshot) = state.hub.snapshot().await else {
        log_error(&format!("Client {conn_id}: hub unavailable, dropping connection"));
        return;
    };

    let (mut sink, mut stream) = socket.split();

    // First frame on every connection is the full state snapshot.
    match ServerEvent::InitState(snapshot).to_json() {
        Ok(json) => {
            if sink.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
        Err(e) => {
            log_error(&format!("Client {conn_id}: snapshot serialization failed: {e}"));
            return;
        }
    }

    log_info(&format!("Client {conn_id} connected"));

    loop {
        tokio::select! {
            outbound = events.recv() => match outbound {
                Ok(out) => {
                    if !out.delivers_to(conn_id) {
                        continue;
                    }
                    match out.event.to_json() {
                        Ok(json) => {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => log_error(&format!("Client {conn_id}: serialization failed: {e}")),
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Every event is idempotent on the client, so skipping
                    // missed ones under load is safe.
                    log_warning(&format!("Client {conn_id}: lagged, skipped {missed} events"));
                }
                Err(RecvError::Closed) => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => match ClientEvent::from_json(text.as_str()) {
                    Ok(event) => {
                        if state.hub.send(HubCommand::Client { origin: conn_id, event }).await.is_err() {
                            break;
                        }
                    }
                    // A bad frame must never take the hub down; drop it.
                    Err(e) => log_warning(&format!("Client {conn_id}: malformed frame dropped: {e}")),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // ping/pong are handled by axum, binary is ignored
                Some(Err(e)) => {
                    log_warning(&format!("Client {conn_id}: socket error: {e}"));
                    break;
                }
            },
        }
    }

    log_info(&format!("Client {conn_id} disconnected"));
}
