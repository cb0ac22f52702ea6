// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Automated lifecycle events.
//!
//! Each event presupposes one or more statuses and moves the booking to a
//! single deterministic next status. An event that arrives when the booking
//! is elsewhere is ignored rather than rejected.

use fleetbook_domain::{BookingStatus, Money, next_in_sequence};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An event reported by an external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AutomatedEvent {
    /// The payment gateway received the deposit.
    DepositConfirmed,
    /// A payment (deposit or final balance) was confirmed.
    PaymentConfirmed,
    /// The renter signed the rental contract.
    ContractSigned,
    /// A vehicle inspection finished.
    InspectionCompleted {
        /// Fees assessed by a post-return inspection.
        #[serde(default)]
        extra_fees: Option<Money>,
    },
    /// The vehicle was scanned back in at a station.
    VehicleReturned {
        /// When the vehicle was returned.
        #[serde(with = "time::serde::rfc3339")]
        returned_at: OffsetDateTime,
    },
    /// An inspection outcome needs the renter's acknowledgment.
    RenterConfirmationRequested,
    /// The renter acknowledged the inspection outcome.
    RenterConfirmed,
    /// Final billing charged the renter.
    FinalChargeIssued,
}

impl AutomatedEvent {
    /// Returns the event name used in audit records and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DepositConfirmed => "DepositConfirmed",
            Self::PaymentConfirmed => "PaymentConfirmed",
            Self::ContractSigned => "ContractSigned",
            Self::InspectionCompleted { .. } => "InspectionCompleted",
            Self::VehicleReturned { .. } => "VehicleReturned",
            Self::RenterConfirmationRequested => "RenterConfirmationRequested",
            Self::RenterConfirmed => "RenterConfirmed",
            Self::FinalChargeIssued => "FinalChargeIssued",
        }
    }

    /// Returns the status this event moves a booking to from `current`.
    ///
    /// `None` means the booking is not in a status the event presupposes.
    ///
    /// # Arguments
    ///
    /// * `current` - The booking's current status
    /// * `origin` - The status held before entering `PendingRenterConfirmation`
    #[must_use]
    pub fn target_for(
        &self,
        current: BookingStatus,
        origin: Option<BookingStatus>,
    ) -> Option<BookingStatus> {
        use BookingStatus as S;

        match (self, current) {
            (Self::DepositConfirmed, S::PendingDepositPayment) => {
                Some(S::PendingDepositConfirmation)
            }
            (Self::PaymentConfirmed, S::PendingDepositConfirmation) => {
                Some(S::PendingContractSigning)
            }
            (Self::PaymentConfirmed, S::PendingTotalPaymentConfirmation) => Some(S::Completed),
            (Self::ContractSigned, S::PendingContractSigning) => Some(S::PendingVehiclePickup),
            (
                Self::InspectionCompleted { .. },
                S::PendingVehiclePickup | S::VehiclePickupOverdue,
            ) => Some(S::VehicleInspectedBeforePickup),
            (Self::InspectionCompleted { .. }, S::VehicleReturned) => {
                Some(S::VehicleInspectedAfterPickup)
            }
            (Self::VehicleReturned { .. }, S::CurrentlyRenting | S::VehicleReturnOverdue) => {
                Some(S::VehicleReturned)
            }
            (
                Self::RenterConfirmationRequested,
                S::VehicleInspectedBeforePickup | S::VehicleInspectedAfterPickup,
            ) => Some(S::PendingRenterConfirmation),
            (Self::RenterConfirmed, S::PendingRenterConfirmation) => {
                next_in_sequence(current, origin)
            }
            (Self::FinalChargeIssued, S::PendingTotalPayment) => Some(S::TotalFeesCharged),
            _ => None,
        }
    }
}
