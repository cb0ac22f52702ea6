// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff status overrides.
//!
//! Only the human checkpoints of the lifecycle may be forced. Everything
//! else is reached through automated events or the deadline sweep.

use crate::error::DomainError;
use crate::status::BookingStatus;
use crate::transition::{TransitionTrigger, is_legal_transition, validate_transition};

/// The statuses an operator may force a booking into.
pub const OVERRIDE_ALLOW_LIST: [BookingStatus; 5] = [
    BookingStatus::PendingDepositConfirmation,
    BookingStatus::VehicleInspectedBeforePickup,
    BookingStatus::CurrentlyRenting,
    BookingStatus::PendingTotalPayment,
    BookingStatus::PendingTotalPaymentConfirmation,
];

/// Returns true if `target` is on the override allow-list.
#[must_use]
pub const fn is_override_permitted(target: BookingStatus) -> bool {
    matches!(
        target,
        BookingStatus::PendingDepositConfirmation
            | BookingStatus::VehicleInspectedBeforePickup
            | BookingStatus::CurrentlyRenting
            | BookingStatus::PendingTotalPayment
            | BookingStatus::PendingTotalPaymentConfirmation
    )
}

/// Validates a staff request to force `current` to `target`.
///
/// The allow-list is checked first, so a target outside it is rejected
/// whatever the current status is.
///
/// # Errors
///
/// Returns `DomainError::OverrideNotPermitted` for a target outside the
/// allow-list and `DomainError::IllegalTransition` for an allowed target
/// that is not the next step of the lifecycle.
pub fn validate_override(
    current: BookingStatus,
    target: BookingStatus,
    origin: Option<BookingStatus>,
) -> Result<(), DomainError> {
    if !is_override_permitted(target) {
        return Err(DomainError::OverrideNotPermitted { status: target });
    }
    validate_transition(current, target, TransitionTrigger::ManualOverride, origin)
}

/// Lists the statuses an operator could force from `current` right now.
#[must_use]
pub fn available_overrides(
    current: BookingStatus,
    origin: Option<BookingStatus>,
) -> Vec<BookingStatus> {
    OVERRIDE_ALLOW_LIST
        .into_iter()
        .filter(|target| {
            is_legal_transition(current, *target, TransitionTrigger::ManualOverride, origin)
        })
        .collect()
}
