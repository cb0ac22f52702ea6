// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use crate::live::LiveEvent;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use fleetbook_domain::{Money, VehicleModelId};
use time::Duration;
use tokio::sync::broadcast;
use tower::ServiceExt;

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let pool: PersistencePool =
        PersistencePool::new_in_memory().expect("Failed to create in-memory persistence");
    let fleet: InMemoryFleet = InMemoryFleet::default()
        .with_model("compact-sedan", Money::new(900_000))
        .with_model("suv", Money::new(1_500_000))
        .with_unit("51A-123.45", "compact-sedan", "downtown")
        .with_unit("30K-111.11", "suv", "downtown");
    AppState {
        pool,
        catalog: Arc::new(fleet),
        broadcaster: Arc::new(LiveEventBroadcaster::new()),
        config: OrchestratorConfig::default(),
    }
}

fn actor_fields(actor_id: &str, role: &str) -> ActorFields {
    ActorFields {
        actor_id: actor_id.to_string(),
        actor_role: role.to_string(),
        cause_id: String::from("test-cause"),
        cause_description: String::from("Router test"),
    }
}

/// Pickup tomorrow, three days of unit 51A-123.45.
fn create_test_booking_request(actor_id: &str, role: &str) -> CreateBookingApiRequest {
    let pickup_at: OffsetDateTime = OffsetDateTime::now_utc() + Duration::days(1);
    CreateBookingApiRequest {
        actor: actor_fields(actor_id, role),
        booking: CreateBookingRequest {
            renter_id: String::from("renter-1"),
            station_id: String::from("downtown"),
            vehicle_model_id: String::from("compact-sedan"),
            vehicle_unit_id: Some(String::from("51A-123.45")),
            pickup_at,
            return_at: pickup_at + Duration::days(3),
        },
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> Response {
    let request: Request<Body> = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, Body::from))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

async fn create_booking_via_http(app: &Router) -> BookingResponse {
    let request: CreateBookingApiRequest = create_test_booking_request("staff-1", "staff");
    let response: Response = send(
        app,
        "POST",
        "/bookings",
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    read_json::<BookingWriteResponse>(response).await.booking
}

fn booking_uri(booking: &BookingResponse, suffix: &str) -> String {
    format!("/bookings/{}{suffix}", booking.booking_id.unwrap().value())
}

#[tokio::test]
async fn test_create_booking_returns_created() {
    let app: Router = build_router(create_test_app_state());
    let request: CreateBookingApiRequest = create_test_booking_request("renter-1", "renter");

    let response: Response = send(
        &app,
        "POST",
        "/bookings",
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::CREATED);
    let body: BookingWriteResponse = read_json(response).await;
    assert_eq!(body.booking.status, BookingStatus::PendingDepositPayment);
    assert_eq!(body.booking.version, 1);
    assert_eq!(body.booking.pricing.deposit, Money::new(810_000));
    assert!(body.event_id.is_some());
}

#[tokio::test]
async fn test_create_booking_with_past_pickup_is_unprocessable() {
    let app: Router = build_router(create_test_app_state());
    let mut request: CreateBookingApiRequest = create_test_booking_request("staff-1", "staff");
    request.booking.pickup_at = OffsetDateTime::now_utc() - Duration::hours(2);

    let response: Response = send(
        &app,
        "POST",
        "/bookings",
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "schedule_rejected");
}

#[tokio::test]
async fn test_create_booking_unknown_unit_conflicts() {
    let app: Router = build_router(create_test_app_state());
    let mut request: CreateBookingApiRequest = create_test_booking_request("staff-1", "staff");
    request.booking.vehicle_unit_id = Some(String::from("99X-000.00"));

    let response: Response = send(
        &app,
        "POST",
        "/bookings",
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "inventory_unavailable");
}

#[tokio::test]
async fn test_invalid_role_is_unauthenticated() {
    let app: Router = build_router(create_test_app_state());
    let request: CreateBookingApiRequest = create_test_booking_request("someone", "admin");

    let response: Response = send(
        &app,
        "POST",
        "/bookings",
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_booking_and_missing_booking() {
    let app: Router = build_router(create_test_app_state());
    let booking: BookingResponse = create_booking_via_http(&app).await;

    let response: Response = send(
        &app,
        "GET",
        &booking_uri(&booking, "?actor_id=renter-1&actor_role=renter"),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let fetched: BookingResponse = read_json(response).await;
    assert_eq!(fetched, booking);

    let other: Response = send(
        &app,
        "GET",
        &booking_uri(&booking, "?actor_id=renter-2&actor_role=renter"),
        None,
    )
    .await;
    assert_eq!(other.status(), HttpStatusCode::FORBIDDEN);

    let missing: Response = send(
        &app,
        "GET",
        "/bookings/9999?actor_id=staff-1&actor_role=staff",
        None,
    )
    .await;
    assert_eq!(missing.status(), HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_force_with_same_version_conflicts() {
    let app: Router = build_router(create_test_app_state());
    let booking: BookingResponse = create_booking_via_http(&app).await;
    let request: ForceStatusApiRequest = ForceStatusApiRequest {
        actor: actor_fields("staff-1", "staff"),
        version: 1,
        target_status: BookingStatus::PendingDepositConfirmation,
    };
    let body: String = serde_json::to_string(&request).unwrap();

    let first: Response = send(&app, "POST", &booking_uri(&booking, "/status"), Some(body.clone())).await;
    assert_eq!(first.status(), HttpStatusCode::OK);
    let forced: BookingWriteResponse = read_json(first).await;
    assert_eq!(forced.booking.version, 2);

    let second: Response = send(&app, "POST", &booking_uri(&booking, "/status"), Some(body)).await;
    assert_eq!(second.status(), HttpStatusCode::CONFLICT);
    let error: ErrorResponse = read_json(second).await;
    assert_eq!(error.error, "concurrent_modification");
}

#[tokio::test]
async fn test_update_locked_field_is_unprocessable() {
    let app: Router = build_router(create_test_app_state());
    let booking: BookingResponse = create_booking_via_http(&app).await;
    let event: AutomatedEventApiRequest = AutomatedEventApiRequest {
        actor: actor_fields("payments", "system"),
        event: AutomatedEvent::DepositConfirmed,
    };
    send(
        &app,
        "POST",
        &booking_uri(&booking, "/events"),
        Some(serde_json::to_string(&event).unwrap()),
    )
    .await;

    let request: UpdateBookingApiRequest = UpdateBookingApiRequest {
        actor: actor_fields("renter-1", "renter"),
        version: 2,
        patch: BookingPatch {
            vehicle_model_id: Some(VehicleModelId::new("suv")),
            ..BookingPatch::default()
        },
    };
    let response: Response = send(
        &app,
        "PATCH",
        &booking_uri(&booking, ""),
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "field_locked");
}

#[tokio::test]
async fn test_event_is_broadcast_to_live_clients() {
    let app_state: AppState = create_test_app_state();
    let mut rx: broadcast::Receiver<LiveEvent> = app_state.broadcaster.subscribe();
    let app: Router = build_router(app_state);
    let booking: BookingResponse = create_booking_via_http(&app).await;

    let event: AutomatedEventApiRequest = AutomatedEventApiRequest {
        actor: actor_fields("payments", "system"),
        event: AutomatedEvent::DepositConfirmed,
    };
    let response: Response = send(
        &app,
        "POST",
        &booking_uri(&booking, "/events"),
        Some(serde_json::to_string(&event).unwrap()),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: EventResponse = read_json(response).await;
    assert!(body.applied);

    match rx.try_recv() {
        Ok(LiveEvent::StatusChanged(notification)) => {
            assert_eq!(notification.booking_id, booking.booking_id.unwrap());
            assert_eq!(notification.to, BookingStatus::PendingDepositConfirmation);
        }
        other => panic!("Expected StatusChanged, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ignored_event_is_ok() {
    let app: Router = build_router(create_test_app_state());
    let booking: BookingResponse = create_booking_via_http(&app).await;
    let event: AutomatedEventApiRequest = AutomatedEventApiRequest {
        actor: actor_fields("payments", "system"),
        event: AutomatedEvent::FinalChargeIssued,
    };

    let response: Response = send(
        &app,
        "POST",
        &booking_uri(&booking, "/events"),
        Some(serde_json::to_string(&event).unwrap()),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: EventResponse = read_json(response).await;
    assert!(!body.applied);
    assert_eq!(body.booking.version, 1);
}

#[tokio::test]
async fn test_cancel_then_history_and_audit() {
    let app: Router = build_router(create_test_app_state());
    let booking: BookingResponse = create_booking_via_http(&app).await;
    let request: CancelBookingApiRequest = CancelBookingApiRequest {
        actor: actor_fields("renter-1", "renter"),
        version: 1,
        reason: String::from("Plans changed"),
    };

    let response: Response = send(
        &app,
        "POST",
        &booking_uri(&booking, "/cancel"),
        Some(serde_json::to_string(&request).unwrap()),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);

    let history: StatusHistoryResponse = read_json(
        send(
            &app,
            "GET",
            &booking_uri(&booking, "/history?actor_id=staff-1&actor_role=staff"),
            None,
        )
        .await,
    )
    .await;
    let statuses: Vec<BookingStatus> = history.entries.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        vec![BookingStatus::PendingDepositPayment, BookingStatus::Cancelled]
    );

    let audit: Vec<AuditEventResponse> = read_json(
        send(
            &app,
            "GET",
            &booking_uri(&booking, "/audit?actor_id=staff-1&actor_role=staff"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[1].action_name, "CancelBooking");
    assert_eq!(audit[1].action_details.as_deref(), Some("Plans changed"));
    assert_eq!(audit[1].actor_kind, "renter");
}

#[tokio::test]
async fn test_policy_endpoint() {
    let app: Router = build_router(create_test_app_state());
    let booking: BookingResponse = create_booking_via_http(&app).await;

    let policy: BookingPolicyResponse = read_json(
        send(
            &app,
            "GET",
            &booking_uri(&booking, "/policy?actor_id=staff-1&actor_role=staff"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(policy.status, BookingStatus::PendingDepositPayment);
    assert!(policy.capabilities.can_change_model.is_allowed());
    assert_eq!(
        policy.capabilities.available_overrides,
        vec![BookingStatus::PendingDepositConfirmation]
    );
}

#[tokio::test]
async fn test_sweep_once_leaves_fresh_bookings_alone() {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());
    let booking: BookingResponse = create_booking_via_http(&app).await;

    sweep_once(&app_state).await;

    let stored: BookingResponse = read_json(
        send(
            &app,
            "GET",
            &booking_uri(&booking, "?actor_id=staff-1&actor_role=staff"),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(stored.status, BookingStatus::PendingDepositPayment);
    assert_eq!(stored.version, 1);
}

/// Stores a booking created two days ago whose pickup was yesterday, and
/// walks it to `Pending_Vehicle_Pickup`.
fn store_backdated_awaiting_pickup(app_state: &AppState) -> BookingId {
    let mut persistence: Persistence = app_state.pool.checkout().unwrap();
    let mut orchestrator: Orchestrator<'_> = Orchestrator {
        persistence: &mut persistence,
        catalog: app_state.catalog.as_ref(),
        notifier: app_state.broadcaster.as_ref(),
        config: &app_state.config,
    };
    let created_at: OffsetDateTime = OffsetDateTime::now_utc() - Duration::days(2);
    let staff: AuthenticatedActor = authenticate_stub(String::from("staff-1"), Role::Staff).unwrap();
    let payments: AuthenticatedActor =
        authenticate_stub(String::from("payments"), Role::System).unwrap();
    let cause: Cause = Cause::new(String::from("test-cause"), String::from("Backdated"));

    let created: ApiResult<BookingResponse> = create_booking(
        &mut orchestrator,
        CreateBookingRequest {
            renter_id: String::from("renter-1"),
            station_id: String::from("downtown"),
            vehicle_model_id: String::from("compact-sedan"),
            vehicle_unit_id: Some(String::from("51A-123.45")),
            pickup_at: created_at + Duration::days(1),
            return_at: created_at + Duration::days(4),
        },
        &staff,
        cause.clone(),
        created_at,
    )
    .unwrap();
    let booking_id: BookingId = created.response.booking_id.unwrap();

    for event in [
        AutomatedEvent::DepositConfirmed,
        AutomatedEvent::PaymentConfirmed,
        AutomatedEvent::ContractSigned,
    ] {
        let response: EventResponse = handle_automated_event(
            &mut orchestrator,
            booking_id,
            AutomatedEventRequest { event },
            &payments,
            cause.clone(),
            created_at,
        )
        .unwrap();
        assert!(response.applied);
    }
    assert_eq!(
        persistence.get_booking(booking_id).unwrap().status,
        BookingStatus::PendingVehiclePickup
    );
    booking_id
}

#[tokio::test]
async fn test_sweep_once_marks_late_pickup_only_once() {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());
    let booking_id: BookingId = store_backdated_awaiting_pickup(&app_state);

    let first: SweepReport = sweep_once(&app_state).await;
    assert_eq!(first.candidates, 1);
    assert_eq!(first.marked, vec![booking_id]);

    let inspection: AutomatedEventApiRequest = AutomatedEventApiRequest {
        actor: actor_fields("inspection-app", "system"),
        event: AutomatedEvent::InspectionCompleted { extra_fees: None },
    };
    let response: Response = send(
        &app,
        "POST",
        &format!("/bookings/{}/events", booking_id.value()),
        Some(serde_json::to_string(&inspection).unwrap()),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let inspected: EventResponse = read_json(response).await;
    assert!(inspected.applied);
    assert_eq!(
        inspected.booking.status,
        BookingStatus::VehicleInspectedBeforePickup
    );

    let second: SweepReport = sweep_once(&app_state).await;
    assert_eq!(second, SweepReport::default());

    let stored: BookingResponse = read_json(
        send(
            &app,
            "GET",
            &format!(
                "/bookings/{}?actor_id=staff-1&actor_role=staff",
                booking_id.value()
            ),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(stored.status, BookingStatus::VehicleInspectedBeforePickup);
    assert_eq!(stored.version, inspected.booking.version);
}
