// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleetbook_audit::AuditEvent;
use fleetbook_domain::{
    Booking, BookingStatus, Money, OverdueGrace, RenterId, ScheduleLimits, StatusChange,
    VehicleAssignment,
};
use time::OffsetDateTime;

/// Ambient inputs of a transition: the clock and the configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyContext {
    /// The current wall-clock time.
    pub now: OffsetDateTime,
    /// Schedule limits used to validate rental windows.
    pub limits: ScheduleLimits,
    /// Grace periods applied to pickup and return deadlines.
    pub grace: OverdueGrace,
}

impl ApplyContext {
    /// Creates a context with default limits and grace periods.
    #[must_use]
    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            now,
            limits: ScheduleLimits::default(),
            grace: OverdueGrace::default(),
        }
    }
}

/// The inputs of a new booking, as supplied by checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub renter_id: RenterId,
    pub assignment: VehicleAssignment,
    pub pickup_at: OffsetDateTime,
    pub return_at: OffsetDateTime,
    /// The daily rate quoted for the reserved model.
    pub daily_rate: Money,
}

/// The result of opening a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningResult {
    /// The booking, not yet assigned an identifier.
    pub booking: Booking,
    /// The audit event recording the creation.
    pub audit_event: AuditEvent,
}

/// The result of a successful transition.
///
/// The store commits `new_booking`, `status_change` and `audit_event` as one
/// unit, conditional on the stored version still being `previous_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The booking after the transition.
    pub new_booking: Booking,
    /// The audit event recording the transition.
    pub audit_event: AuditEvent,
    /// The history entry appended, if the status changed.
    pub status_change: Option<StatusChange>,
    /// The version the transition was computed against.
    pub previous_version: i64,
}

/// The result of feeding an automated event to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event moved the booking.
    Applied(Box<TransitionResult>),
    /// The booking was not in a status the event presupposes.
    Ignored {
        /// The event name.
        event: &'static str,
        /// The booking's status when the event arrived.
        status: BookingStatus,
    },
}
