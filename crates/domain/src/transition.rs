// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The booking transition table.
//!
//! A transition is legal only if the target is the immediate successor of
//! the current status, or a side-branch status reached by the trigger that
//! owns it. Overdue states belong to the sweep, renter confirmation to
//! inspection events, and `Cancelled` to cancellation.

use crate::error::DomainError;
use crate::status::BookingStatus;
use serde::{Deserialize, Serialize};

/// What is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// A staff member forcing a status.
    ManualOverride,
    /// An external event (payment webhook, inspection outcome, return scan).
    AutomatedEvent,
    /// The periodic deadline sweep.
    OverdueSweep,
    /// A cancellation request.
    Cancellation,
}

impl TransitionTrigger {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ManualOverride => "manual_override",
            Self::AutomatedEvent => "automated_event",
            Self::OverdueSweep => "overdue_sweep",
            Self::Cancellation => "cancellation",
        }
    }
}

impl std::fmt::Display for TransitionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the status that follows `from` on the main chain.
///
/// For `PendingRenterConfirmation` the successor is that of the inspection
/// the booking came from, so `origin` must name it.
///
/// # Arguments
///
/// * `from` - The current status
/// * `origin` - The status held before entering `PendingRenterConfirmation`
#[must_use]
pub fn next_in_sequence(
    from: BookingStatus,
    origin: Option<BookingStatus>,
) -> Option<BookingStatus> {
    if from == BookingStatus::PendingRenterConfirmation {
        return match origin {
            Some(status) if status.is_inspection() => status.successor(),
            _ => None,
        };
    }
    from.successor()
}

/// Returns true if `trigger` may move a booking from `from` to `to`.
#[must_use]
pub fn is_legal_transition(
    from: BookingStatus,
    to: BookingStatus,
    trigger: TransitionTrigger,
    origin: Option<BookingStatus>,
) -> bool {
    if from.is_terminal() {
        return false;
    }

    match trigger {
        TransitionTrigger::ManualOverride => next_in_sequence(from, origin) == Some(to),
        TransitionTrigger::AutomatedEvent => {
            next_in_sequence(from, origin) == Some(to)
                || (from.is_inspection() && to == BookingStatus::PendingRenterConfirmation)
        }
        TransitionTrigger::OverdueSweep => matches!(
            (from, to),
            (
                BookingStatus::PendingVehiclePickup | BookingStatus::VehicleInspectedBeforePickup,
                BookingStatus::VehiclePickupOverdue
            ) | (
                BookingStatus::CurrentlyRenting,
                BookingStatus::VehicleReturnOverdue
            )
        ),
        TransitionTrigger::Cancellation => {
            to == BookingStatus::Cancelled && from.is_cancellable()
        }
    }
}

/// Validates a status change against the transition table.
///
/// # Arguments
///
/// * `from` - The current status
/// * `to` - The requested status
/// * `trigger` - What is requesting the change
/// * `origin` - The status held before entering `PendingRenterConfirmation`, if any
///
/// # Errors
///
/// Returns `DomainError::IllegalTransition` if the change is not in the table.
pub fn validate_transition(
    from: BookingStatus,
    to: BookingStatus,
    trigger: TransitionTrigger,
    origin: Option<BookingStatus>,
) -> Result<(), DomainError> {
    if is_legal_transition(from, to, trigger, origin) {
        Ok(())
    } else {
        Err(DomainError::IllegalTransition { from, to })
    }
}
