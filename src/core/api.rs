//! HTTP + WebSocket API for the kiosk
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /session - Current session state
//! - POST /session/event - Send a user event
//! - GET /translations/:lang - Screen labels
//! - WS /ws - Live updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::core::KioskController;
use crate::types::{texts, Language, Step, StepOutput, Translation, UserEvent};

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub step: Step,
    pub sessions_completed: u64,
}

/// Create the API router
pub fn create_router(controller: KioskController) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(get_session))
        .route("/session/event", post(post_event))
        .route("/translations/:lang", get(get_translation))
        .route("/ws", get(websocket_handler))
        .with_state(controller)
}

/// Health check endpoint
async fn health(State(controller): State<KioskController>) -> Json<HealthResponse> {
    let snapshot = controller.snapshot().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        step: snapshot.step,
        sessions_completed: controller.completed().await,
    })
}

/// Get session state
async fn get_session(State(controller): State<KioskController>) -> Json<StepOutput> {
    Json(controller.snapshot().await)
}

/// Apply a user event
async fn post_event(
    State(controller): State<KioskController>,
    Json(event): Json<UserEvent>,
) -> Json<StepOutput> {
    Json(controller.dispatch(event).await)
}

/// Get labels for a language
async fn get_translation(Path(lang): Path<String>) -> Result<Json<Translation>, StatusCode> {
    let language: Language = lang.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(*texts(language)))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(controller): State<KioskController>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = controller.subscribe();
    let current = controller.snapshot().await;
    ws.on_upgrade(move |socket| handle_websocket(socket, current, rx))
}

/// Send the current state, then every update until the client leaves
async fn handle_websocket(
    socket: WebSocket,
    current: StepOutput,
    mut rx: broadcast::Receiver<StepOutput>,
) {
    let (mut sender, mut receiver) = socket.split();

    let Ok(json) = serde_json::to_string(&current) else {
        return;
    };
    if sender.send(Message::Text(json)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(update) => {
                    let Ok(json) = serde_json::to_string(&update) else { continue };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging, updates dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("websocket client disconnected");
}

/// Run the API server
pub async fn run_server(addr: &str, controller: KioskController) -> anyhow::Result<()> {
    let router = create_router(controller);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "EcoPay kiosk API listening");
    println!("♻ EcoPay kiosk API running on {}", addr);
    println!("  GET  /health              - Health check");
    println!("  GET  /session             - Current state");
    println!("  POST /session/event       - Send event");
    println!("  GET  /translations/:lang  - Screen labels");
    println!("  WS   /ws                  - Live updates");
    axum::serve(listener, router).await?;
    Ok(())
}
