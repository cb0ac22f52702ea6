// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use fleetbook::AutomatedEvent;
use fleetbook_api::{
    ApiError, ApiResult, AuthenticatedActor, AutomatedEventRequest, BookingPolicyResponse,
    BookingResponse, CancelBookingRequest, CreateBookingRequest, EventResponse, FleetCatalog,
    ForceStatusRequest, InMemoryFleet, Orchestrator, OrchestratorConfig, Role,
    StatusHistoryResponse, SweepReport, UpdateBookingRequest, authenticate_stub, cancel_booking,
    collect_overdue_candidates, create_booking, force_status, get_audit_trail, get_booking, get_booking_policy,
    get_status_history, handle_automated_event, sweep_candidate, translate_persistence_error,
    update_booking,
};
use fleetbook_audit::{AuditEvent, Cause};
use fleetbook_domain::{Booking, BookingId, BookingPatch, BookingStatus};
use fleetbook_persistence::{Persistence, PersistencePool};
use live::{LiveEventBroadcaster, live_events_handler};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Fleetbook Server - HTTP server for the booking lifecycle orchestrator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "FLEETBOOK_DATABASE")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "FLEETBOOK_PORT", default_value_t = 3000)]
    port: u16,

    /// Most database connections open at once (file-backed databases only)
    #[arg(
        long,
        env = "FLEETBOOK_POOL_SIZE",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pool_size: u32,

    /// Seconds between overdue sweeps
    #[arg(
        long,
        env = "FLEETBOOK_SWEEP_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    sweep_interval_secs: i64,

    /// Minutes past the scheduled pickup before a booking is pickup-overdue
    #[arg(
        long,
        env = "FLEETBOOK_PICKUP_GRACE_MINS",
        default_value_t = 30,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pickup_grace_mins: i64,

    /// Minutes past the scheduled return before a rental is return-overdue
    #[arg(
        long,
        env = "FLEETBOOK_RETURN_GRACE_MINS",
        default_value_t = 60,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    return_grace_mins: i64,

    /// JSON file describing vehicle models, rates and units per station
    #[arg(long, env = "FLEETBOOK_FLEET_FILE")]
    fleet_file: Option<PathBuf>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// Connections to the booking store, one per request.
    pool: PersistencePool,
    /// Inventory and rate lookups.
    catalog: Arc<dyn FleetCatalog>,
    /// Live status fan-out; also the orchestrator's notifier.
    broadcaster: Arc<LiveEventBroadcaster>,
    config: OrchestratorConfig,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.broadcaster)
    }
}

impl AppState {
    /// Runs `f` on the blocking pool with a connection of its own.
    ///
    /// The connection is returned as soon as `f` finishes.
    async fn with_persistence<T, F>(&self, f: F) -> Result<T, HttpError>
    where
        F: FnOnce(&Self, &mut Persistence) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let app_state: Self = self.clone();
        let result: Result<T, ApiError> = tokio::task::spawn_blocking(move || {
            let mut persistence: Persistence = app_state
                .pool
                .checkout()
                .map_err(translate_persistence_error)?;
            f(&app_state, &mut persistence)
        })
        .await
        .map_err(|err| ApiError::Internal {
            message: format!("Store task failed: {err}"),
        })?;
        Ok(result?)
    }

    /// Runs `f` with an orchestrator over a connection of its own.
    async fn with_orchestrator<T, F>(&self, f: F) -> Result<T, HttpError>
    where
        F: FnOnce(&mut Orchestrator<'_>) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        self.with_persistence(move |app_state, persistence| {
            let mut orchestrator: Orchestrator<'_> = Orchestrator {
                persistence,
                catalog: app_state.catalog.as_ref(),
                notifier: app_state.broadcaster.as_ref(),
                config: &app_state.config,
            };
            f(&mut orchestrator)
        })
        .await
    }
}

/// Who is calling and why; carried in every write body.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorFields {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
}

/// API request for opening a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateBookingApiRequest {
    #[serde(flatten)]
    actor: ActorFields,
    #[serde(flatten)]
    booking: CreateBookingRequest,
}

/// API request for editing booking fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct UpdateBookingApiRequest {
    #[serde(flatten)]
    actor: ActorFields,
    version: i64,
    patch: BookingPatch,
}

/// API request for a staff status override.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ForceStatusApiRequest {
    #[serde(flatten)]
    actor: ActorFields,
    version: i64,
    target_status: BookingStatus,
}

/// API request for cancelling a booking.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CancelBookingApiRequest {
    #[serde(flatten)]
    actor: ActorFields,
    version: i64,
    reason: String,
}

/// API request delivering an automated event.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct AutomatedEventApiRequest {
    #[serde(flatten)]
    actor: ActorFields,
    event: AutomatedEvent,
}

/// Query parameters identifying the reader.
#[derive(Debug, Deserialize)]
struct ActorQuery {
    actor_id: String,
    actor_role: String,
}

/// API response for write operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookingWriteResponse {
    /// The booking after the commit.
    booking: BookingResponse,
    /// The event ID of the persisted audit event.
    event_id: Option<i64>,
}

impl From<ApiResult<BookingResponse>> for BookingWriteResponse {
    fn from(result: ApiResult<BookingResponse>) -> Self {
        Self {
            booking: result.response,
            event_id: result.audit_event.event_id,
        }
    }
}

/// Serializable representation of an `AuditEvent` for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditEventResponse {
    event_id: Option<i64>,
    actor_id: String,
    actor_kind: String,
    cause_id: String,
    cause_description: String,
    action_name: String,
    action_details: Option<String>,
    before_snapshot: String,
    after_snapshot: String,
}

impl From<&AuditEvent> for AuditEventResponse {
    fn from(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            actor_id: event.actor.id.clone(),
            actor_kind: event.actor.kind.as_str().to_string(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            action_name: event.action.name.clone(),
            action_details: event.action.details.clone(),
            before_snapshot: event.before.data.clone(),
            after_snapshot: event.after.data.clone(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Stable error kind, e.g. `field_locked`.
    error: String,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ConcurrentModification { .. } | ApiError::InventoryUnavailable { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::ScheduleRejected { .. }
            | ApiError::FieldLocked { .. }
            | ApiError::IllegalTransition { .. }
            | ApiError::OverrideNotPermitted { .. }
            | ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, HttpError> {
    let role: Role = actor_role.parse::<Role>().map_err(ApiError::from)?;
    Ok(authenticate_stub(actor_id.to_string(), role).map_err(ApiError::from)?)
}

impl ActorFields {
    fn authenticate(&self) -> Result<(AuthenticatedActor, Cause), HttpError> {
        let actor: AuthenticatedActor = authenticate(&self.actor_id, &self.actor_role)?;
        let cause: Cause = Cause::new(self.cause_id.clone(), self.cause_description.clone());
        Ok((actor, cause))
    }
}

/// Handler for POST `/bookings`.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateBookingApiRequest>,
) -> Result<(StatusCode, Json<BookingWriteResponse>), HttpError> {
    info!(
        actor_id = %req.actor.actor_id,
        renter_id = %req.booking.renter_id,
        vehicle_model_id = %req.booking.vehicle_model_id,
        "Handling create_booking request"
    );
    let (actor, cause) = req.actor.authenticate()?;
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let result: ApiResult<BookingResponse> = app_state
        .with_orchestrator(move |orchestrator| {
            create_booking(orchestrator, req.booking, &actor, cause, now)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Handler for GET `/bookings/{id}`.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Query(params): Query<ActorQuery>,
) -> Result<Json<BookingResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&params.actor_id, &params.actor_role)?;
    let response: BookingResponse = app_state
        .with_persistence(move |_, persistence| {
            get_booking(persistence, BookingId::new(booking_id), &actor)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for PATCH `/bookings/{id}`.
async fn handle_update_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<UpdateBookingApiRequest>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    info!(
        actor_id = %req.actor.actor_id,
        booking_id,
        version = req.version,
        "Handling update_booking request"
    );
    let (actor, cause) = req.actor.authenticate()?;
    let request: UpdateBookingRequest = UpdateBookingRequest {
        version: req.version,
        patch: req.patch,
    };
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let result: ApiResult<BookingResponse> = app_state
        .with_orchestrator(move |orchestrator| {
            update_booking(
                orchestrator,
                BookingId::new(booking_id),
                request,
                &actor,
                cause,
                now,
            )
        })
        .await?;

    Ok(Json(result.into()))
}

/// Handler for POST `/bookings/{id}/status`.
async fn handle_force_status(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<ForceStatusApiRequest>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    info!(
        actor_id = %req.actor.actor_id,
        booking_id,
        target = %req.target_status,
        "Handling force_status request"
    );
    let (actor, cause) = req.actor.authenticate()?;
    let request: ForceStatusRequest = ForceStatusRequest {
        version: req.version,
        target_status: req.target_status,
    };
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let result: ApiResult<BookingResponse> = app_state
        .with_orchestrator(move |orchestrator| {
            force_status(
                orchestrator,
                BookingId::new(booking_id),
                request,
                &actor,
                cause,
                now,
            )
        })
        .await?;

    Ok(Json(result.into()))
}

/// Handler for POST `/bookings/{id}/cancel`.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<CancelBookingApiRequest>,
) -> Result<Json<BookingWriteResponse>, HttpError> {
    info!(
        actor_id = %req.actor.actor_id,
        booking_id,
        "Handling cancel_booking request"
    );
    let (actor, cause) = req.actor.authenticate()?;
    let request: CancelBookingRequest = CancelBookingRequest {
        version: req.version,
        reason: req.reason,
    };
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let result: ApiResult<BookingResponse> = app_state
        .with_orchestrator(move |orchestrator| {
            cancel_booking(
                orchestrator,
                BookingId::new(booking_id),
                request,
                &actor,
                cause,
                now,
            )
        })
        .await?;

    Ok(Json(result.into()))
}

/// Handler for POST `/bookings/{id}/events`.
async fn handle_automated_event_request(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<AutomatedEventApiRequest>,
) -> Result<Json<EventResponse>, HttpError> {
    info!(
        actor_id = %req.actor.actor_id,
        booking_id,
        event = req.event.name(),
        "Handling automated event"
    );
    let (actor, cause) = req.actor.authenticate()?;
    let request: AutomatedEventRequest = AutomatedEventRequest { event: req.event };
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let response: EventResponse = app_state
        .with_orchestrator(move |orchestrator| {
            handle_automated_event(
                orchestrator,
                BookingId::new(booking_id),
                request,
                &actor,
                cause,
                now,
            )
        })
        .await?;

    Ok(Json(response))
}

/// Handler for GET `/bookings/{id}/history`.
async fn handle_get_status_history(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Query(params): Query<ActorQuery>,
) -> Result<Json<StatusHistoryResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&params.actor_id, &params.actor_role)?;
    let response: StatusHistoryResponse = app_state
        .with_persistence(move |_, persistence| {
            get_status_history(persistence, BookingId::new(booking_id), &actor)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{id}/policy`.
async fn handle_get_booking_policy(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Query(params): Query<ActorQuery>,
) -> Result<Json<BookingPolicyResponse>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&params.actor_id, &params.actor_role)?;
    let response: BookingPolicyResponse = app_state
        .with_persistence(move |_, persistence| {
            get_booking_policy(persistence, BookingId::new(booking_id), &actor)
        })
        .await?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{id}/audit`.
async fn handle_get_audit_trail(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Query(params): Query<ActorQuery>,
) -> Result<Json<Vec<AuditEventResponse>>, HttpError> {
    let actor: AuthenticatedActor = authenticate(&params.actor_id, &params.actor_role)?;
    let events: Vec<AuditEvent> = app_state
        .with_persistence(move |_, persistence| {
            get_audit_trail(persistence, BookingId::new(booking_id), &actor)
        })
        .await?;
    Ok(Json(events.iter().map(AuditEventResponse::from).collect()))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/bookings", post(handle_create_booking))
        .route(
            "/bookings/{id}",
            get(handle_get_booking).patch(handle_update_booking),
        )
        .route("/bookings/{id}/status", post(handle_force_status))
        .route("/bookings/{id}/events", post(handle_automated_event_request))
        .route("/bookings/{id}/cancel", post(handle_cancel_booking))
        .route("/bookings/{id}/history", get(handle_get_status_history))
        .route("/bookings/{id}/policy", get(handle_get_booking_policy))
        .route("/bookings/{id}/audit", get(handle_get_audit_trail))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

/// Runs one overdue sweep at the current time.
///
/// Candidates are read on one connection; each booking is then committed
/// on a fresh one, so requests interleave with the pass and a booking
/// changed in between is skipped by its version check.
async fn sweep_once(app_state: &AppState) -> SweepReport {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let candidates: Vec<Booking> = match app_state
        .with_orchestrator(move |orchestrator| collect_overdue_candidates(orchestrator, now))
        .await
    {
        Ok(candidates) => candidates,
        Err(err) => {
            error!(error = %err.message, "Overdue sweep could not load candidates");
            return SweepReport::default();
        }
    };

    let mut report: SweepReport = SweepReport {
        candidates: candidates.len(),
        ..SweepReport::default()
    };
    for booking in candidates {
        let booking_id: Option<BookingId> = booking.booking_id;
        let outcome: Result<SweepReport, HttpError> = app_state
            .with_orchestrator(move |orchestrator| {
                let mut outcome: SweepReport = SweepReport::default();
                sweep_candidate(orchestrator, &booking, now, &mut outcome);
                Ok(outcome)
            })
            .await;
        match outcome {
            Ok(outcome) => report.absorb(outcome),
            Err(err) => {
                warn!(error = %err.message, "Overdue sweep could not reach the store");
                report.failed.extend(booking_id);
            }
        }
    }
    report.log_summary();
    report
}

/// Sweeps for overdue bookings every `sweep_interval`, forever.
async fn run_sweep_loop(app_state: AppState) {
    let period: std::time::Duration = std::time::Duration::try_from(app_state.config.sweep_interval)
        .unwrap_or_else(|_| std::time::Duration::from_secs(60));
    info!(seconds = period.as_secs(), "Starting overdue sweep");

    let mut interval: tokio::time::Interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        sweep_once(&app_state).await;
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

fn load_fleet(path: Option<&PathBuf>) -> Result<InMemoryFleet, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        warn!("No fleet file given; every inventory check will fail");
        return Ok(InMemoryFleet::default());
    };
    let json: String = std::fs::read_to_string(path)?;
    let fleet: InMemoryFleet = InMemoryFleet::from_json(&json)?;
    info!(
        path = %path.display(),
        models = fleet.models.len(),
        units = fleet.units.len(),
        "Loaded fleet"
    );
    Ok(fleet)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Fleetbook Server");

    let pool: PersistencePool = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        PersistencePool::new_with_file(db_path, args.pool_size)?
    } else {
        info!("Using in-memory database");
        PersistencePool::new_in_memory()?
    };

    let config: OrchestratorConfig = OrchestratorConfig::default()
        .with_grace_minutes(args.pickup_grace_mins, args.return_grace_mins)
        .with_sweep_interval_secs(args.sweep_interval_secs);

    let app_state: AppState = AppState {
        pool,
        catalog: Arc::new(load_fleet(args.fleet_file.as_ref())?),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        config,
    };

    let sweeper: tokio::task::JoinHandle<()> = tokio::spawn(run_sweep_loop(app_state.clone()));
    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests;
