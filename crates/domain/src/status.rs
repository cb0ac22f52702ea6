// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking status states.
//!
//! The status set is closed. Every status carries its canonical text form,
//! which is what the store persists and what the HTTP surface exposes.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The lifecycle status of a booking.
///
/// The main chain runs from `PendingDepositPayment` to `Completed`. The
/// overdue states and `PendingRenterConfirmation` are side branches that
/// only automated triggers may enter. `Cancelled` and `Completed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Created; waiting for the renter to pay the deposit.
    #[serde(rename = "Pending_Deposit_Payment")]
    PendingDepositPayment,
    /// Deposit paid; waiting for staff to confirm it.
    #[serde(rename = "Pending_Deposit_Confirmation")]
    PendingDepositConfirmation,
    /// Deposit confirmed; waiting for the rental contract signature.
    #[serde(rename = "Pending_Contract_Signing")]
    PendingContractSigning,
    /// Contract signed; waiting for the renter to collect the vehicle.
    #[serde(rename = "Pending_Vehicle_Pickup")]
    PendingVehiclePickup,
    /// The vehicle passed its pre-pickup inspection.
    #[serde(rename = "Vehicle_Inspected_Before_Pickup")]
    VehicleInspectedBeforePickup,
    /// The renter has the vehicle.
    #[serde(rename = "Currently_Renting")]
    CurrentlyRenting,
    /// The vehicle is back at the station.
    #[serde(rename = "Vehicle_Returned")]
    VehicleReturned,
    /// The returned vehicle has been inspected.
    #[serde(rename = "Vehicle_Inspected_After_Pickup")]
    VehicleInspectedAfterPickup,
    /// Final billing has been triggered.
    #[serde(rename = "Pending_Total_Payment")]
    PendingTotalPayment,
    /// The final charge has been issued to the renter.
    #[serde(rename = "Total_Fees_Charged")]
    TotalFeesCharged,
    /// Final payment received; waiting for staff to confirm it.
    #[serde(rename = "Pending_Total_Payment_Confirmation")]
    PendingTotalPaymentConfirmation,
    /// Settled.
    #[serde(rename = "Completed")]
    Completed,
    /// Cancelled before pickup.
    #[serde(rename = "Cancelled")]
    Cancelled,
    /// The pickup deadline passed without the vehicle being collected.
    #[serde(rename = "Vehicle_Pickup_Overdue")]
    VehiclePickupOverdue,
    /// The return deadline passed while the vehicle was still out.
    #[serde(rename = "Vehicle_Return_Overdue")]
    VehicleReturnOverdue,
    /// An inspection outcome is waiting for the renter's acknowledgment.
    #[serde(rename = "Pending_Renter_Confirmation")]
    PendingRenterConfirmation,
}

impl BookingStatus {
    /// Every status, main chain first, then the side branches.
    pub const ALL: [Self; 16] = [
        Self::PendingDepositPayment,
        Self::PendingDepositConfirmation,
        Self::PendingContractSigning,
        Self::PendingVehiclePickup,
        Self::VehicleInspectedBeforePickup,
        Self::CurrentlyRenting,
        Self::VehicleReturned,
        Self::VehicleInspectedAfterPickup,
        Self::PendingTotalPayment,
        Self::TotalFeesCharged,
        Self::PendingTotalPaymentConfirmation,
        Self::Completed,
        Self::Cancelled,
        Self::VehiclePickupOverdue,
        Self::VehicleReturnOverdue,
        Self::PendingRenterConfirmation,
    ];

    /// Returns the canonical string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingDepositPayment => "Pending_Deposit_Payment",
            Self::PendingDepositConfirmation => "Pending_Deposit_Confirmation",
            Self::PendingContractSigning => "Pending_Contract_Signing",
            Self::PendingVehiclePickup => "Pending_Vehicle_Pickup",
            Self::VehicleInspectedBeforePickup => "Vehicle_Inspected_Before_Pickup",
            Self::CurrentlyRenting => "Currently_Renting",
            Self::VehicleReturned => "Vehicle_Returned",
            Self::VehicleInspectedAfterPickup => "Vehicle_Inspected_After_Pickup",
            Self::PendingTotalPayment => "Pending_Total_Payment",
            Self::TotalFeesCharged => "Total_Fees_Charged",
            Self::PendingTotalPaymentConfirmation => "Pending_Total_Payment_Confirmation",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::VehiclePickupOverdue => "Vehicle_Pickup_Overdue",
            Self::VehicleReturnOverdue => "Vehicle_Return_Overdue",
            Self::PendingRenterConfirmation => "Pending_Renter_Confirmation",
        }
    }

    /// Parses a status from its canonical string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidBookingStatus(s.to_string()))
    }

    /// Returns true if no transition may leave this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns true for the states only the overdue sweep may enter.
    #[must_use]
    pub const fn is_overdue(&self) -> bool {
        matches!(self, Self::VehiclePickupOverdue | Self::VehicleReturnOverdue)
    }

    /// Returns true for the two inspection checkpoints.
    #[must_use]
    pub const fn is_inspection(&self) -> bool {
        matches!(
            self,
            Self::VehicleInspectedBeforePickup | Self::VehicleInspectedAfterPickup
        )
    }

    /// Returns true if a booking in this status may still be cancelled.
    ///
    /// Cancellation is possible up to the pre-pickup inspection, and while a
    /// pickup is overdue.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::PendingDepositPayment
                | Self::PendingDepositConfirmation
                | Self::PendingContractSigning
                | Self::PendingVehiclePickup
                | Self::VehicleInspectedBeforePickup
                | Self::VehiclePickupOverdue
        )
    }

    /// Returns true if entering this status recomputes pricing.
    #[must_use]
    pub const fn is_pricing_boundary(&self) -> bool {
        matches!(
            self,
            Self::VehicleReturned | Self::VehicleInspectedAfterPickup | Self::TotalFeesCharged
        )
    }

    /// Returns the immediate successor of this status, if it has a fixed one.
    ///
    /// Overdue states resume the main chain at the step the deadline
    /// interrupted. `PendingRenterConfirmation` has no fixed successor; it
    /// resumes after the inspection it came from.
    #[must_use]
    pub const fn successor(&self) -> Option<Self> {
        match self {
            Self::PendingDepositPayment => Some(Self::PendingDepositConfirmation),
            Self::PendingDepositConfirmation => Some(Self::PendingContractSigning),
            Self::PendingContractSigning => Some(Self::PendingVehiclePickup),
            Self::PendingVehiclePickup | Self::VehiclePickupOverdue => {
                Some(Self::VehicleInspectedBeforePickup)
            }
            Self::VehicleInspectedBeforePickup => Some(Self::CurrentlyRenting),
            Self::CurrentlyRenting | Self::VehicleReturnOverdue => Some(Self::VehicleReturned),
            Self::VehicleReturned => Some(Self::VehicleInspectedAfterPickup),
            Self::VehicleInspectedAfterPickup => Some(Self::PendingTotalPayment),
            Self::PendingTotalPayment => Some(Self::TotalFeesCharged),
            Self::TotalFeesCharged => Some(Self::PendingTotalPaymentConfirmation),
            Self::PendingTotalPaymentConfirmation => Some(Self::Completed),
            Self::Completed | Self::Cancelled | Self::PendingRenterConfirmation => None,
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
