// RTK GPS Settings Server
// Invoke API and WebSocket change feed over the JSON preference stores

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::{
    fs::{File, OpenOptions},
    io::{LineWriter, Write},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use rtkgps_settings::commands;
use rtkgps_settings::models::{PreferenceValue, StreamEndpoint};
use rtkgps_settings::services::{EventSink, JsonPreferences, PreferenceRepository, SETTINGS_RESET_EVENT};

const LOG_FILE_NAME: &str = "rtkgps-settings.log";

/// Startup configuration read from `RTKGPS_*` variables
#[derive(Debug, Clone, PartialEq)]
struct ServerConfig {
    data_dir: PathBuf,
    log_dir: PathBuf,
    address: SocketAddr,
    api_token: Option<String>,
    force_defaults: bool,
    log_level: LevelFilter,
}

impl ServerConfig {
    const DEFAULT_PORT: u16 = 8010;

    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank variables count as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = PathBuf::from(var("RTKGPS_DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let log_dir = var("RTKGPS_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));
        let host = var("RTKGPS_HOST")
            .and_then(|host| host.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = var("RTKGPS_PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(Self::DEFAULT_PORT);
        let force_defaults = matches!(
            var("RTKGPS_FORCE_DEFAULTS").map(|flag| flag.to_lowercase()).as_deref(),
            Some("1" | "true" | "yes" | "on")
        );
        let log_level = var("RTKGPS_LOG_LEVEL")
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info);

        Self {
            data_dir,
            log_dir,
            address: SocketAddr::new(host, port),
            api_token: var("RTKGPS_API_TOKEN"),
            force_defaults,
            log_level,
        }
    }
}

/// Appends `[date][time][target][level] message` lines to the service log
struct FileLogger {
    file: Mutex<LineWriter<File>>,
    level: LevelFilter,
}

impl FileLogger {
    fn install(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&config.log_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_dir.join(LOG_FILE_NAME))?;

        log::set_boxed_logger(Box::new(Self {
            file: Mutex::new(LineWriter::new(file)),
            level: config.log_level,
        }))?;
        log::set_max_level(config.log_level);
        Ok(())
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let stamp = Local::now().format("[%Y-%m-%d][%H:%M:%S]");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{stamp}[{}][{}] {}", record.target(), record.level(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Fans store events out to every connected WebSocket as JSON text frames
#[derive(Clone)]
struct ChangeFeed {
    frames: broadcast::Sender<String>,
}

impl ChangeFeed {
    fn new() -> Self {
        let (frames, _) = broadcast::channel(128);
        Self { frames }
    }
}

impl EventSink for ChangeFeed {
    fn emit(&self, event: &str, payload: Value) {
        let frame = json!({ "event": event, "payload": payload }).to_string();
        // Err only means nobody is listening
        let _ = self.frames.send(frame);
    }
}

#[derive(Clone)]
struct AppState {
    preferences: Arc<JsonPreferences>,
    feed: ChangeFeed,
    api_token: Option<Arc<str>>,
}

impl AppState {
    fn authorized(&self, presented: Option<&str>) -> bool {
        match &self.api_token {
            None => true,
            Some(token) => presented == Some(token.as_ref()),
        }
    }
}

/// Invoke payloads; the variant comes from the command name in the URL
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case", rename_all_fields = "camelCase")]
enum SettingsCommand {
    LoadSettings,
    SetDefaultValues {
        #[serde(default)]
        force: bool,
    },
    GetPreference {
        store: String,
        key: String,
    },
    GetPreferences {
        store: String,
    },
    SetPreference {
        store: String,
        key: String,
        /// Absent or null removes the key
        #[serde(default)]
        value: Option<PreferenceValue>,
    },
    GetStreamPath {
        role: String,
    },
    GetStreamSummary {
        role: String,
    },
    GetAllSummaries,
    EncodeStreamPath {
        stream_type: String,
        endpoint: StreamEndpoint,
    },
    DecodeStreamPath {
        stream_type: String,
        path: String,
    },
    SummarizeStreamPath {
        stream_type: String,
        path: String,
    },
}

impl SettingsCommand {
    fn parse(name: &str, payload: Value) -> Result<Self, String> {
        let mut fields = match payload {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => return Err(format!("Payload of '{name}' must be an object, got {other}")),
        };
        fields.insert("command".to_string(), Value::String(name.to_string()));
        serde_json::from_value(Value::Object(fields)).map_err(|e| format!("Invalid '{name}' request: {e}"))
    }

    fn run(self, repo: &dyn PreferenceRepository, feed: &dyn EventSink) -> Result<Value, String> {
        let data = match self {
            Self::LoadSettings => json!(commands::load_settings(repo)?),
            Self::SetDefaultValues { force } => {
                commands::set_default_values(repo, force)?;
                if force {
                    log::info!("Stream settings reset to factory defaults");
                    feed.emit(SETTINGS_RESET_EVENT, json!({}));
                }
                Value::Null
            }
            Self::GetPreference { store, key } => json!(commands::get_preference(repo, &store, &key)?),
            Self::GetPreferences { store } => json!(commands::get_preferences(repo, &store)?),
            Self::SetPreference { store, key, value } => {
                commands::set_preference(repo, &store, &key, value)?;
                Value::Null
            }
            Self::GetStreamPath { role } => json!(commands::get_stream_path(repo, &role)?),
            Self::GetStreamSummary { role } => json!(commands::get_stream_summary(repo, &role)?),
            Self::GetAllSummaries => json!(commands::get_all_summaries(repo)?),
            Self::EncodeStreamPath { stream_type, endpoint } => {
                json!(commands::encode_stream_path(&stream_type, &endpoint)?)
            }
            Self::DecodeStreamPath { stream_type, path } => {
                json!(commands::decode_stream_path(&stream_type, &path)?)
            }
            Self::SummarizeStreamPath { stream_type, path } => {
                json!(commands::summarize_stream_path(&stream_type, &path))
            }
        };
        Ok(data)
    }
}

#[derive(Serialize)]
struct InvokeResponse {
    ok: bool,
    data: Option<Value>,
    error: Option<String>,
}

enum ApiError {
    Unauthorized,
    Rejected(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Rejected(error) => (StatusCode::BAD_REQUEST, error),
        };
        let body = InvokeResponse {
            ok: false,
            data: None,
            error: Some(error),
        };
        (status, Json(body)).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();
    std::fs::create_dir_all(&config.data_dir)?;
    FileLogger::install(&config)?;

    let feed = ChangeFeed::new();
    let preferences = Arc::new(JsonPreferences::with_events(&config.data_dir, Arc::new(feed.clone())));
    commands::set_default_values(preferences.as_ref(), config.force_defaults)?;
    log::info!(
        "Preferences ready in {:?} (forced defaults: {})",
        preferences.dir(),
        config.force_defaults
    );

    let state = AppState {
        preferences,
        feed,
        api_token: config.api_token.map(Arc::from),
    };

    log::info!("RTK GPS settings server listening on http://{}", config.address);
    println!("RTK GPS settings server listening on http://{}", config.address);

    let listener = tokio::net::TcpListener::bind(config.address).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/invoke/:command", post(invoke))
        .route("/ws", get(change_feed))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "preferencesDir": state.preferences.dir() }))
}

async fn invoke(
    State(state): State<AppState>,
    Path(command): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    if !state.authorized(presented) {
        return Err(ApiError::Unauthorized);
    }

    let data = SettingsCommand::parse(&command, payload)
        .and_then(|request| request.run(state.preferences.as_ref(), &state.feed))
        .map_err(|e| {
            log::warn!("Command '{command}' failed: {e}");
            ApiError::Rejected(e)
        })?;

    Ok(Json(InvokeResponse {
        ok: true,
        data: Some(data),
        error: None,
    }))
}

#[derive(Deserialize)]
struct FeedQuery {
    token: Option<String>,
}

async fn change_feed(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Response {
    if !state.authorized(query.token.as_deref()) {
        return ApiError::Unauthorized.into_response();
    }
    let frames = state.feed.frames.subscribe();
    ws.on_upgrade(move |socket| forward_frames(socket, frames))
}

async fn forward_frames(mut socket: WebSocket, mut frames: broadcast::Receiver<String>) {
    loop {
        let frame = match frames.recv().await {
            Ok(frame) => frame,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::debug!("Change feed client skipped {skipped} events");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        if socket.send(Message::Text(frame)).await.is_err() {
            break;
        }
    }
}
