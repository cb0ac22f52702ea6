// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for policy-aware UI gating.
//!
//! Capabilities combine the caller's role with the booking's field policy
//! and override gate. They are advisory only and do not replace the checks
//! made when a mutation is applied.

use fleetbook_domain::{Booking, BookingStatus, FieldPolicy, available_overrides};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticatedActor, Role};

/// Whether an action is currently permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Allowed,
    Denied,
}

impl Capability {
    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }

    /// Returns true if the action is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// What the caller may do to a booking right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCapabilities {
    pub can_edit_fields: Capability,
    pub can_change_model: Capability,
    pub can_change_unit: Capability,
    pub can_change_return: Capability,
    pub can_cancel: Capability,
    pub can_force_status: Capability,
    /// Statuses a staff override may move the booking to.
    pub available_overrides: Vec<BookingStatus>,
}

/// Computes the caller's capabilities on a booking.
///
/// Systems never edit or cancel; only staff see overrides.
#[must_use]
pub fn compute_booking_capabilities(
    actor: &AuthenticatedActor,
    booking: &Booking,
) -> BookingCapabilities {
    let editor: bool = match actor.role {
        Role::Staff => true,
        Role::Renter => booking.renter_id.value() == actor.id,
        Role::System => false,
    };
    let policy: FieldPolicy = booking.field_policy();
    let overrides: Vec<BookingStatus> = if actor.role == Role::Staff {
        available_overrides(booking.status, booking.renter_confirmation_origin())
    } else {
        Vec::new()
    };

    BookingCapabilities {
        can_edit_fields: Capability::from_bool(editor && policy.can_edit_at_all),
        can_change_model: Capability::from_bool(editor && policy.can_change_model),
        can_change_unit: Capability::from_bool(editor && policy.can_change_unit),
        can_change_return: Capability::from_bool(editor && policy.can_change_return),
        can_cancel: Capability::from_bool(editor && booking.status.is_cancellable()),
        can_force_status: Capability::from_bool(!overrides.is_empty()),
        available_overrides: overrides,
    }
}
