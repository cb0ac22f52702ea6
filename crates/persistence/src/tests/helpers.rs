// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CommittedChange, Persistence};
use fleetbook::{
    ApplyContext, Command, NewBooking, OpeningResult, TransitionResult, apply, open_booking,
};
use fleetbook_audit::{Actor, ActorKind, Cause};
use fleetbook_domain::{
    Booking, BookingStatus, Money, RenterId, StationId, VehicleAssignment, VehicleModelId,
    VehicleUnitId,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("staff-123"), ActorKind::Staff)
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

pub fn create_test_opening() -> OpeningResult {
    open_booking(
        create_test_request(),
        &test_ctx(),
        Actor::new(String::from("renter-1"), ActorKind::Renter),
        create_test_cause(),
    )
    .expect("Valid booking request")
}

/// Stores a fresh booking and returns it with its assigned id.
pub fn store_test_booking(persistence: &mut Persistence) -> Booking {
    let stored: CommittedChange = persistence
        .insert_booking(&create_test_opening())
        .expect("Failed to insert booking");
    stored.booking
}

/// Builds a staff override from `booking`'s current version.
pub fn force_status(booking: &Booking, target: BookingStatus) -> TransitionResult {
    apply(
        booking,
        Command::ForceStatus {
            expected_version: booking.version,
            target,
        },
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    )
    .expect("Override should be permitted")
}
