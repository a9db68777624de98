//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::app::AppState;
use crate::config::StepMode;
use crate::game::events::log_events;
use crate::game::{Intent, JoinError, Stepper};
use crate::util::time::uptime_secs;

/// Body sent instead of a snapshot once the requester is dead
pub const KILLED: &str = "killed";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.client_origin.as_deref());

    Router::new()
        .route("/health", get(health_handler))
        .route("/start", get(start_handler))
        .route("/update", post(update_handler))
        .route("/leave", post(leave_handler))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the browser client. `CLIENT_ORIGIN` may list several origins,
/// comma separated; without it any origin is accepted.
fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match client_origin {
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
                .collect();
            cors.allow_origin(allowed)
        }
        None => cors.allow_origin(Any),
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    tick: u64,
    players: usize,
    items: usize,
    projectiles: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let world = state.world.lock();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        tick: state.clock.tick(),
        players: world.player_count(),
        items: world.items().len(),
        projectiles: world.projectiles().len(),
    })
}

// ============================================================================
// Session endpoints
// ============================================================================

#[derive(Serialize)]
struct StartResponse {
    name: String,
    color: String,
    /// Terrain classes, `map[y][x]`
    map: Vec<Vec<u8>>,
}

async fn start_handler(State(state): State<AppState>) -> Result<Json<StartResponse>, AppError> {
    if !state.join_limiter.check_join() {
        return Err(AppError::RateLimited);
    }

    let now = state.clock.tick();
    let (identity, events) = {
        let mut world = state.world.lock();
        let identity = world.join(now)?;
        (identity, world.drain_events())
    };
    log_events(events);

    Ok(Json(StartResponse {
        name: identity.name,
        color: identity.color,
        map: state.terrain.rows().to_vec(),
    }))
}

/// Intent body. Everything but `name` is read leniently: a malformed value
/// only loses its own effect, never the whole request.
#[derive(Deserialize)]
struct UpdateRequest {
    name: String,
    #[serde(default)]
    direction: Value,
    #[serde(default)]
    actions: Value,
    #[serde(default, rename = "activeSlots")]
    active_slots: Value,
}

impl UpdateRequest {
    fn into_intent(self) -> Intent {
        let actions: Vec<&str> = self
            .actions
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let slots: Vec<bool> = self
            .active_slots
            .as_array()
            .map(|mask| mask.iter().map(truthy).collect())
            .unwrap_or_default();

        Intent::from_wire(self.name, self.direction.as_f64(), &actions, &slots)
    }
}

/// Browser clients send slot masks as bools or 0/1
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

async fn update_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Response {
    let intent = req.into_intent();
    let now = state.clock.tick();

    let (snapshot, events) = {
        let mut world = state.world.lock();
        let alive = world.apply_intent(&intent, now);
        // Dead clients that keep polling must not drive the simulation
        let events = match state.config.step_mode {
            StepMode::Request if alive => world.step(now),
            _ => world.drain_events(),
        };
        (world.snapshot(&intent.name, now), events)
    };
    log_events(events);

    match snapshot {
        Some(snapshot) => Json(snapshot).into_response(),
        None => KILLED.into_response(),
    }
}

#[derive(Deserialize)]
struct LeaveRequest {
    name: String,
}

async fn leave_handler(State(state): State<AppState>, Json(req): Json<LeaveRequest>) -> StatusCode {
    let events = {
        let mut world = state.world.lock();
        world.leave(&req.name);
        world.drain_events()
    };
    log_events(events);

    StatusCode::NO_CONTENT
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Too many join requests")]
    RateLimited,

    #[error(transparent)]
    Join(#[from] JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Join(JoinError::CatalogExhausted) => {
                warn!("Join refused: identity catalog exhausted");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}
