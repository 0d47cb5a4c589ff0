#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Frames one status-channel connection receives.
#[derive(Debug, Clone)]
pub struct WsSession {
    pub frames: Vec<String>,
    /// Close the connection after the frames instead of holding it open.
    pub close_after: bool,
}

impl WsSession {
    pub fn closing(frames: &[&str]) -> Self {
        Self {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            close_after: true,
        }
    }

    pub fn held_open(frames: &[&str]) -> Self {
        Self {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            close_after: false,
        }
    }
}

/// Shared state of the fake backend, inspected by the tests.
#[derive(Default)]
pub struct FakeState {
    pub settings: Mutex<Value>,
    pub converts: Mutex<Vec<Value>>,
    pub cancels: AtomicUsize,
    pub cleanups: AtomicUsize,
    /// When set, `/api/convert` answers 400 like a busy backend.
    pub busy: AtomicBool,
    pub ws_connections: AtomicUsize,
    /// Script per connection, by connection index. Connections past the
    /// end of the script get no frames and are held open.
    pub ws_script: Mutex<Vec<WsSession>>,
}

pub struct FakeServer {
    pub api_url: String,
    pub ws_url: String,
    pub state: Arc<FakeState>,
}

/// Start an in-process fake conversion backend on `127.0.0.1:0`.
pub async fn spawn_fake_backend(ws_script: Vec<WsSession>) -> FakeServer {
    let state = Arc::new(FakeState {
        settings: Mutex::new(json!({
            "last_input_folder": "/footage/shotA",
            "codec": "h264",
            "frame_rate": 30,
            "theme": "dark",
        })),
        ws_script: Mutex::new(ws_script),
        ..FakeState::default()
    });

    let app = Router::new()
        .route("/api/settings", get(get_settings).post(save_settings))
        .route("/api/browse", get(browse))
        .route("/api/scan", post(scan))
        .route("/api/convert", post(convert))
        .route("/api/cancel", post(cancel))
        .route("/api/cleanup", post(cleanup))
        .route("/api/deps", get(deps))
        .route("/ws/status", get(status_ws))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        api_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}/ws/status"),
        state,
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn get_settings(State(state): State<Arc<FakeState>>) -> Json<Value> {
    Json(state.settings.lock().unwrap().clone())
}

async fn save_settings(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    *state.settings.lock().unwrap() = body;
    Json(json!({ "status": "success" }))
}

async fn browse(Query(params): Query<HashMap<String, String>>) -> Response {
    let requested = params.get("path").map(String::as_str).unwrap_or(".");
    let current = match requested {
        "" | "." => "/footage",
        "/footage" | "/footage/" => "/footage",
        "/" => "/",
        _ => return detail(StatusCode::NOT_FOUND, "Path not found"),
    };

    let items = if current == "/" {
        json!([{ "name": "footage", "path": "/footage", "is_dir": true }])
    } else {
        json!([
            { "name": "shotA", "path": "/footage/shotA", "is_dir": true },
            { "name": "notes.txt", "path": "/footage/notes.txt", "is_dir": false,
              "size": 12, "extension": ".txt" },
        ])
    };
    let parent = if current == "/" { Value::Null } else { json!("/") };

    Json(json!({
        "current_path": current,
        "parent_path": parent,
        "items": items,
    }))
    .into_response()
}

async fn scan(Json(body): Json<Value>) -> Response {
    match body.get("path").and_then(Value::as_str) {
        None | Some("") => detail(StatusCode::BAD_REQUEST, "Path required"),
        Some("/footage/shotA") => Json(json!([{
            "head": "shotA.",
            "tail": ".exr",
            "padding": 4,
            "start": 1001,
            "end": 1240,
            "count": 240,
            "pattern": "shotA.%04d.exr",
            "range_string": "1001-1240",
        }]))
        .into_response(),
        Some(_) => Json(json!([])).into_response(),
    }
}

async fn convert(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    if state.busy.load(Ordering::SeqCst) {
        return detail(StatusCode::BAD_REQUEST, "A job is already running");
    }
    state.converts.lock().unwrap().push(body);
    Json(json!({ "status": "started" })).into_response()
}

async fn cancel(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state.cancels.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "cancelling" }))
}

async fn cleanup(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state.cleanups.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "cleanup_triggered" }))
}

async fn deps() -> Json<Value> {
    Json(json!({
        "ok": false,
        "issues": ["oiiotool not found in PATH"],
        "details": { "ffmpeg": "ffmpeg version 6.1" },
    }))
}

async fn status_ws(ws: WebSocketUpgrade, State(state): State<Arc<FakeState>>) -> Response {
    ws.on_upgrade(move |socket| serve_status(socket, state))
}

async fn serve_status(mut socket: WebSocket, state: Arc<FakeState>) {
    let index = state.ws_connections.fetch_add(1, Ordering::SeqCst);
    let session = state.ws_script.lock().unwrap().get(index).cloned();

    if let Some(session) = session {
        for frame in session.frames {
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        if session.close_after {
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    }

    // Hold the connection until the client goes away.
    while let Some(Ok(_)) = socket.recv().await {}
}
