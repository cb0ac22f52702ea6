// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Mutex;

use crate::{
    ApiResult, AuthenticatedActor, AutomatedEventRequest, BookingResponse, CreateBookingRequest,
    EventResponse, ForceStatusRequest, InMemoryFleet, Orchestrator, OrchestratorConfig, Role,
    StatusNotification, StatusNotifier, create_booking, force_status, handle_automated_event,
};
use fleetbook::AutomatedEvent;
use fleetbook_audit::Cause;
use fleetbook_domain::{BookingId, BookingStatus, Money};
use fleetbook_persistence::Persistence;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub const fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 09:00 UTC)
}

pub fn staff() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("staff-123"), Role::Staff)
}

pub fn renter(id: &str) -> AuthenticatedActor {
    AuthenticatedActor::new(id.to_string(), Role::Renter)
}

pub fn system() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("payments"), Role::System)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn test_fleet() -> InMemoryFleet {
    InMemoryFleet::default()
        .with_model("compact-sedan", Money::new(900_000))
        .with_model("suv", Money::new(1_500_000))
        .with_unit("51A-123.45", "compact-sedan", "downtown")
        .with_unit("51A-678.90", "compact-sedan", "downtown")
        .with_unit("30K-111.11", "suv", "downtown")
        .with_unit("51A-555.55", "compact-sedan", "airport")
}

/// Pickup tomorrow, three-day rental of unit 51A-123.45 downtown.
pub fn create_test_request() -> CreateBookingRequest {
    let pickup_at: OffsetDateTime = test_now() + Duration::days(1);
    CreateBookingRequest {
        renter_id: String::from("renter-1"),
        station_id: String::from("downtown"),
        vehicle_model_id: String::from("compact-sedan"),
        vehicle_unit_id: Some(String::from("51A-123.45")),
        pickup_at,
        return_at: pickup_at + Duration::days(3),
    }
}

/// Records every notification it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<StatusNotification>>,
}

impl StatusNotifier for RecordingNotifier {
    fn status_changed(&self, notification: &StatusNotification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }
}

/// Owns everything an `Orchestrator` borrows.
pub struct TestHarness {
    pub persistence: Persistence,
    pub fleet: InMemoryFleet,
    pub notifier: RecordingNotifier,
    pub config: OrchestratorConfig,
}

impl TestHarness {
    pub fn setup() -> Self {
        Self {
            persistence: Persistence::new_in_memory().expect("Failed to create persistence"),
            fleet: test_fleet(),
            notifier: RecordingNotifier::default(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn orchestrator(&mut self) -> Orchestrator<'_> {
        Orchestrator {
            persistence: &mut self.persistence,
            catalog: &self.fleet,
            notifier: &self.notifier,
            config: &self.config,
        }
    }

    pub fn notifications(&self) -> Vec<StatusNotification> {
        self.notifier.notifications.lock().unwrap().clone()
    }

    /// Opens the standard test booking as staff and returns its id.
    pub fn create(&mut self) -> BookingId {
        let result: ApiResult<BookingResponse> = create_booking(
            &mut self.orchestrator(),
            create_test_request(),
            &staff(),
            create_test_cause(),
            test_now(),
        )
        .expect("Failed to create booking");
        result.response.booking_id.expect("Stored booking has an id")
    }

    /// Feeds an event as the payments system.
    pub fn event(&mut self, booking_id: BookingId, event: AutomatedEvent) -> EventResponse {
        handle_automated_event(
            &mut self.orchestrator(),
            booking_id,
            AutomatedEventRequest { event },
            &system(),
            create_test_cause(),
            test_now(),
        )
        .expect("Event should be accepted")
    }

    /// Forces a status as staff from the booking's stored version.
    pub fn force(&mut self, booking_id: BookingId, target: BookingStatus) -> BookingResponse {
        let version: i64 = self.persistence.get_booking(booking_id).unwrap().version;
        force_status(
            &mut self.orchestrator(),
            booking_id,
            ForceStatusRequest {
                version,
                target_status: target,
            },
            &staff(),
            create_test_cause(),
            test_now(),
        )
        .expect("Override should succeed")
        .response
    }

    /// Creates a booking and drives it to `CurrentlyRenting`.
    pub fn create_renting(&mut self) -> BookingId {
        let booking_id: BookingId = self.create();
        self.event(booking_id, AutomatedEvent::DepositConfirmed);
        self.event(booking_id, AutomatedEvent::PaymentConfirmed);
        self.event(booking_id, AutomatedEvent::ContractSigned);
        self.event(
            booking_id,
            AutomatedEvent::InspectionCompleted { extra_fees: None },
        );
        self.force(booking_id, BookingStatus::CurrentlyRenting);
        booking_id
    }
}
