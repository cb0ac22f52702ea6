// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-status field mutability.
//!
//! Policies are pure predicates over the booking status. They are consulted
//! before any field mutation is committed.

use crate::booking::BookingPatch;
use crate::error::DomainError;
use crate::status::BookingStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A booking attribute an operator may try to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    StationId,
    VehicleModelId,
    VehicleUnitId,
    ScheduledPickupAt,
    ScheduledReturnAt,
}

impl BookingField {
    /// Every patchable field, in the order patches are checked.
    pub const ALL: [Self; 5] = [
        Self::StationId,
        Self::VehicleModelId,
        Self::VehicleUnitId,
        Self::ScheduledPickupAt,
        Self::ScheduledReturnAt,
    ];

    /// Returns the field name as it appears in requests and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StationId => "station_id",
            Self::VehicleModelId => "vehicle_model_id",
            Self::VehicleUnitId => "vehicle_unit_id",
            Self::ScheduledPickupAt => "scheduled_pickup_at",
            Self::ScheduledReturnAt => "scheduled_return_at",
        }
    }
}

impl FromStr for BookingField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| DomainError::InvalidBookingField(s.to_string()))
    }
}

impl std::fmt::Display for BookingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which booking fields may change in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FieldPolicy {
    /// The vehicle model may change (before any money has moved).
    pub can_change_model: bool,
    /// The vehicle unit, station and pickup time may change (before pickup).
    pub can_change_unit: bool,
    /// The return time may change (before pickup, or as a rental extension).
    pub can_change_return: bool,
    /// Any field may change at all.
    pub can_edit_at_all: bool,
}

impl FieldPolicy {
    /// Derives the policy for a booking status.
    #[must_use]
    pub const fn for_status(status: BookingStatus) -> Self {
        let can_edit_at_all: bool = !status.is_terminal();
        let can_change_model: bool = matches!(status, BookingStatus::PendingDepositPayment);
        let can_change_unit: bool = matches!(
            status,
            BookingStatus::PendingDepositPayment
                | BookingStatus::PendingDepositConfirmation
                | BookingStatus::PendingContractSigning
                | BookingStatus::PendingVehiclePickup
                | BookingStatus::VehicleInspectedBeforePickup
        );
        let can_change_return: bool =
            can_change_unit || matches!(status, BookingStatus::CurrentlyRenting);

        Self {
            can_change_model,
            can_change_unit,
            can_change_return,
            can_edit_at_all,
        }
    }

    /// Returns true if `field` may change under this policy.
    #[must_use]
    pub const fn allows(&self, field: BookingField) -> bool {
        if !self.can_edit_at_all {
            return false;
        }
        match field {
            BookingField::VehicleModelId => self.can_change_model,
            BookingField::StationId
            | BookingField::VehicleUnitId
            | BookingField::ScheduledPickupAt => self.can_change_unit,
            BookingField::ScheduledReturnAt => self.can_change_return,
        }
    }
}

/// Checks every field a patch touches against the policy of `status`.
///
/// The whole patch is rejected if any single field is locked; the first
/// locked field in [`BookingField::ALL`] order is reported.
///
/// # Errors
///
/// Returns `DomainError::EmptyPatch` for a patch with no changes and
/// `DomainError::FieldLocked` for a locked field.
pub fn check_patch(status: BookingStatus, patch: &BookingPatch) -> Result<(), DomainError> {
    let fields: Vec<BookingField> = patch.fields();
    if fields.is_empty() {
        return Err(DomainError::EmptyPatch);
    }

    let policy: FieldPolicy = FieldPolicy::for_status(status);
    match fields.into_iter().find(|field| !policy.allows(*field)) {
        Some(field) => Err(DomainError::FieldLocked { field, status }),
        None => Ok(()),
    }
}
