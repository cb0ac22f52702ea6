// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Booking, Money, RenterId, ScheduleLimits, StationId, ValidatedSchedule, VehicleAssignment,
    VehicleModelId, VehicleUnitId, validate_schedule,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub const fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 09:00 UTC)
}

pub fn create_test_assignment() -> VehicleAssignment {
    VehicleAssignment {
        vehicle_model_id: VehicleModelId::new("compact-sedan"),
        vehicle_unit_id: Some(VehicleUnitId::new("51A-123.45")),
        station_id: StationId::new("downtown"),
    }
}

/// A three-day rental starting one day from `test_now()`.
pub fn create_test_schedule() -> ValidatedSchedule {
    let pickup_at: OffsetDateTime = test_now() + Duration::days(1);
    validate_schedule(
        pickup_at,
        pickup_at + Duration::days(3),
        test_now(),
        &ScheduleLimits::default(),
    )
    .unwrap()
}

pub fn create_test_booking() -> Booking {
    Booking::new(
        RenterId::new("renter-1"),
        create_test_assignment(),
        &create_test_schedule(),
        Money::new(900_000),
        test_now(),
        "renter-1",
    )
    .unwrap()
}
