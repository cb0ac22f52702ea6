// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::field_policy::BookingField;
use crate::status::BookingStatus;
use crate::ticket::TicketStatus;
use thiserror::Error;

/// Rejections produced by the schedule validator.
///
/// Rules are checked in declaration order and the first violation wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ScheduleError {
    /// The pickup time precedes the current time.
    #[error("pickup time is in the past")]
    PickupInPast,
    /// The pickup time lies beyond the booking horizon.
    #[error("pickup time is too far in the future")]
    PickupTooFar,
    /// The return time is closer to pickup than the minimum rental window.
    #[error("return time is before the minimum rental window")]
    ReturnBeforeMinimumWindow,
    /// The return time lies beyond the maximum rental length.
    #[error("return time exceeds the maximum rental length")]
    ReturnTooFar,
}

impl ScheduleError {
    /// Returns the stable name of the rejection, used in API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PickupInPast => "PickupInPast",
            Self::PickupTooFar => "PickupTooFar",
            Self::ReturnBeforeMinimumWindow => "ReturnBeforeMinimumWindow",
            Self::ReturnTooFar => "ReturnTooFar",
        }
    }
}

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A proposed schedule was rejected.
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    /// A field may not be changed while the booking is in its current status.
    #[error("field '{field}' is locked while the booking is {status}")]
    FieldLocked {
        /// The first field the request tried to change.
        field: BookingField,
        /// The booking status that locks it.
        status: BookingStatus,
    },
    /// The requested status change is not part of the lifecycle.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        /// The current status.
        from: BookingStatus,
        /// The requested status.
        to: BookingStatus,
    },
    /// Operators may not force a booking into this status.
    #[error("status {status} cannot be set by manual override")]
    OverrideNotPermitted {
        /// The requested status.
        status: BookingStatus,
    },
    /// A status string did not name a booking status.
    #[error("invalid booking status: {0}")]
    InvalidBookingStatus(String),
    /// A field name did not name a patchable booking field.
    #[error("invalid booking field: {0}")]
    InvalidBookingField(String),
    /// A field update carried no changes.
    #[error("booking patch contains no changes")]
    EmptyPatch,
    /// A monetary computation overflowed.
    #[error("amount overflow while {operation}")]
    AmountOverflow {
        /// Description of the computation that failed.
        operation: String,
    },
    /// A monetary input was negative.
    #[error("{field} must not be negative, got {amount}")]
    NegativeAmount {
        /// The offending input.
        field: &'static str,
        /// The rejected amount.
        amount: i64,
    },
    /// A status string did not name a ticket status.
    #[error("invalid ticket status: {0}")]
    InvalidTicketStatus(String),
    /// The requested ticket status change is not permitted.
    #[error("invalid ticket transition from {from} to {to}")]
    InvalidTicketTransition {
        /// The current ticket status.
        from: TicketStatus,
        /// The requested ticket status.
        to: TicketStatus,
    },
}
