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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod error;
mod field_policy;
mod override_gate;
mod pricing;
mod schedule;
mod status;
mod ticket;
mod transition;
mod types;

#[cfg(test)]
mod tests;

pub use booking::{Booking, BookingPatch, OverdueGrace, StatusChange, VehicleAssignment};
pub use error::{DomainError, ScheduleError};
pub use field_policy::{BookingField, FieldPolicy, check_patch};
pub use override_gate::{
    OVERRIDE_ALLOW_LIST, available_overrides, is_override_permitted, validate_override,
};
pub use pricing::{
    DEPOSIT_PERCENT, PricingBreakdown, PricingPhase, calculate_pricing, deposit_for,
};
pub use schedule::{
    ScheduleLimits, ValidatedSchedule, rental_days, validate_return_extension, validate_schedule,
};
pub use status::BookingStatus;
pub use ticket::{Ticket, TicketStatus};
pub use transition::{
    TransitionTrigger, is_legal_transition, next_in_sequence, validate_transition,
};
pub use types::{BookingId, Money, RenterId, StationId, VehicleModelId, VehicleUnitId};
