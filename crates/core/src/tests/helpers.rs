// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ApplyContext, AutomatedEvent, EventOutcome, NewBooking, apply_event, open_booking};
use fleetbook_audit::{Actor, ActorKind, Cause};
use fleetbook_domain::{
    Booking, BookingId, BookingStatus, Money, RenterId, StationId, VehicleAssignment,
    VehicleModelId, VehicleUnitId,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("staff-123"), ActorKind::Staff)
}

pub fn create_system_actor() -> Actor {
    Actor::new(String::from("payments"), ActorKind::System)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Front desk request"))
}

pub const fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 09:00 UTC)
}

pub fn test_ctx() -> ApplyContext {
    ApplyContext::at(test_now())
}

pub fn create_test_request() -> NewBooking {
    let pickup_at: OffsetDateTime = test_now() + Duration::days(1);
    NewBooking {
        renter_id: RenterId::new("renter-1"),
        assignment: VehicleAssignment {
            vehicle_model_id: VehicleModelId::new("compact-sedan"),
            vehicle_unit_id: Some(VehicleUnitId::new("51A-123.45")),
            station_id: StationId::new("downtown"),
        },
        pickup_at,
        return_at: pickup_at + Duration::days(3),
        daily_rate: Money::new(900_000),
    }
}

/// A stored booking (id 1, version 1) in `PendingDepositPayment`.
pub fn create_test_booking() -> Booking {
    open_booking(
        create_test_request(),
        &test_ctx(),
        Actor::new(String::from("renter-1"), ActorKind::Renter),
        create_test_cause(),
    )
    .unwrap()
    .booking
    .with_id(BookingId::new(1))
}

/// Feeds an event that must apply and returns the resulting booking.
pub fn apply_event_ok(booking: &Booking, event: AutomatedEvent) -> Booking {
    match apply_event(
        booking,
        event,
        &test_ctx(),
        create_system_actor(),
        create_test_cause(),
    )
    .unwrap()
    {
        EventOutcome::Applied(result) => result.new_booking,
        EventOutcome::Ignored { event, status } => {
            panic!("event {event} unexpectedly ignored in {status}")
        }
    }
}

/// Drives a fresh booking to `status` along the automated path.
pub fn booking_in(status: BookingStatus) -> Booking {
    let mut booking: Booking = create_test_booking();
    let path: [(AutomatedEvent, BookingStatus); 4] = [
        (
            AutomatedEvent::DepositConfirmed,
            BookingStatus::PendingDepositConfirmation,
        ),
        (
            AutomatedEvent::PaymentConfirmed,
            BookingStatus::PendingContractSigning,
        ),
        (
            AutomatedEvent::ContractSigned,
            BookingStatus::PendingVehiclePickup,
        ),
        (
            AutomatedEvent::InspectionCompleted { extra_fees: None },
            BookingStatus::VehicleInspectedBeforePickup,
        ),
    ];
    for (event, reached) in path {
        if booking.status == status {
            return booking;
        }
        booking = apply_event_ok(&booking, event);
        assert_eq!(booking.status, reached);
    }
    assert_eq!(booking.status, status, "helper cannot reach {status}");
    booking
}
