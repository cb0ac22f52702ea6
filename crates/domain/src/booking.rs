// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::field_policy::{BookingField, FieldPolicy};
use crate::pricing::{PricingBreakdown, PricingPhase, calculate_pricing};
use crate::schedule::{ValidatedSchedule, rental_days};
use crate::status::BookingStatus;
use crate::types::{BookingId, Money, RenterId, StationId, VehicleModelId, VehicleUnitId};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// The vehicle a booking reserves and where it is collected.
///
/// Whether the unit belongs to the model and sits at the station is decided
/// by the fleet inventory, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAssignment {
    pub vehicle_model_id: VehicleModelId,
    /// Unassigned until a physical vehicle is allocated.
    pub vehicle_unit_id: Option<VehicleUnitId>,
    pub station_id: StationId,
}

/// One entry of a booking's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// The status entered.
    pub status: BookingStatus,
    /// When the status was entered.
    #[serde(with = "time::serde::rfc3339")]
    pub changed_at: OffsetDateTime,
    /// Identifier of the actor that caused the change.
    pub changed_by: String,
}

/// A requested change to a booking's mutable fields.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPatch {
    pub station_id: Option<StationId>,
    pub vehicle_model_id: Option<VehicleModelId>,
    pub vehicle_unit_id: Option<VehicleUnitId>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_pickup_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_return_at: Option<OffsetDateTime>,
}

impl BookingPatch {
    /// Returns the fields this patch touches, in [`BookingField::ALL`] order.
    #[must_use]
    pub fn fields(&self) -> Vec<BookingField> {
        let touched: [(BookingField, bool); 5] = [
            (BookingField::StationId, self.station_id.is_some()),
            (BookingField::VehicleModelId, self.vehicle_model_id.is_some()),
            (BookingField::VehicleUnitId, self.vehicle_unit_id.is_some()),
            (
                BookingField::ScheduledPickupAt,
                self.scheduled_pickup_at.is_some(),
            ),
            (
                BookingField::ScheduledReturnAt,
                self.scheduled_return_at.is_some(),
            ),
        ];
        touched
            .into_iter()
            .filter_map(|(field, present)| present.then_some(field))
            .collect()
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.station_id.is_none()
            && self.vehicle_model_id.is_none()
            && self.vehicle_unit_id.is_none()
            && self.scheduled_pickup_at.is_none()
            && self.scheduled_return_at.is_none()
    }

    /// Returns true if the patch touches the vehicle assignment.
    #[must_use]
    pub const fn touches_assignment(&self) -> bool {
        self.station_id.is_some() || self.vehicle_model_id.is_some() || self.vehicle_unit_id.is_some()
    }

    /// Returns true if the patch touches the rental window.
    #[must_use]
    pub const fn touches_schedule(&self) -> bool {
        self.scheduled_pickup_at.is_some() || self.scheduled_return_at.is_some()
    }
}

/// How long after a deadline a booking is considered overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueGrace {
    /// Added to the scheduled pickup time.
    pub pickup: Duration,
    /// Added to the scheduled return time.
    pub return_: Duration,
}

impl Default for OverdueGrace {
    fn default() -> Self {
        Self {
            pickup: Duration::minutes(30),
            return_: Duration::minutes(60),
        }
    }
}

/// A vehicle-rental booking.
///
/// Monetary fields are derived from `daily_rate`, the rental window and,
/// after return, the extra fees. `version` starts at 1 and grows by one per
/// committed change. `status_history` is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// `None` until the store assigns an identifier.
    pub booking_id: Option<BookingId>,
    pub renter_id: RenterId,
    pub assignment: VehicleAssignment,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_pickup_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_return_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub actual_return_at: Option<OffsetDateTime>,
    /// The model's daily rate, captured when the model was last set.
    pub daily_rate: Money,
    pub pricing: PricingBreakdown,
    pub status: BookingStatus,
    pub version: i64,
    pub status_history: Vec<StatusChange>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Booking {
    /// Creates a booking in `PendingDepositPayment`.
    ///
    /// # Arguments
    ///
    /// * `renter_id` - The renter who owns the booking
    /// * `assignment` - The reserved model, optional unit and station
    /// * `schedule` - A validated rental window
    /// * `daily_rate` - The model's daily rate
    /// * `created_at` - Creation time, recorded as the first history entry
    /// * `created_by` - Identifier of the creating actor
    ///
    /// # Errors
    ///
    /// Returns an error if the pricing cannot be computed.
    pub fn new(
        renter_id: RenterId,
        assignment: VehicleAssignment,
        schedule: &ValidatedSchedule,
        daily_rate: Money,
        created_at: OffsetDateTime,
        created_by: &str,
    ) -> Result<Self, DomainError> {
        let pricing: PricingBreakdown =
            calculate_pricing(daily_rate, schedule.rental_days, PricingPhase::PreReturn)?;
        let status: BookingStatus = BookingStatus::PendingDepositPayment;

        Ok(Self {
            booking_id: None,
            renter_id,
            assignment,
            scheduled_pickup_at: schedule.pickup_at,
            scheduled_return_at: schedule.return_at,
            actual_return_at: None,
            daily_rate,
            pricing,
            status,
            version: 1,
            status_history: vec![StatusChange {
                status,
                changed_at: created_at,
                changed_by: created_by.to_string(),
            }],
            created_at,
        })
    }

    /// Returns a copy of this booking carrying the store-assigned identifier.
    #[must_use]
    pub fn with_id(self, booking_id: BookingId) -> Self {
        Self {
            booking_id: Some(booking_id),
            ..self
        }
    }

    /// Returns the billable day count of the current rental window.
    #[must_use]
    pub fn rental_days(&self) -> u32 {
        rental_days(self.scheduled_pickup_at, self.scheduled_return_at)
    }

    /// Returns the field policy for the current status.
    #[must_use]
    pub const fn field_policy(&self) -> FieldPolicy {
        FieldPolicy::for_status(self.status)
    }

    /// Returns the pricing phase implied by the booking's return state.
    #[must_use]
    pub const fn pricing_phase(&self) -> PricingPhase {
        if self.actual_return_at.is_some() {
            PricingPhase::PostReturn {
                extra_fees: self.pricing.extra_fees,
            }
        } else {
            PricingPhase::PreReturn
        }
    }

    /// Recomputes the derived monetary fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a computation overflows.
    pub fn reprice(&mut self) -> Result<(), DomainError> {
        self.pricing = calculate_pricing(self.daily_rate, self.rental_days(), self.pricing_phase())?;
        Ok(())
    }

    /// Returns the status the booking held before entering
    /// `PendingRenterConfirmation`.
    ///
    /// `None` while the booking is in any other status.
    #[must_use]
    pub fn renter_confirmation_origin(&self) -> Option<BookingStatus> {
        if self.status != BookingStatus::PendingRenterConfirmation {
            return None;
        }
        self.status_history
            .iter()
            .rev()
            .nth(1)
            .map(|change| change.status)
    }

    /// Appends a status change and moves the booking into `status`.
    ///
    /// Legality is the caller's responsibility.
    pub fn record_status(&mut self, status: BookingStatus, at: OffsetDateTime, by: &str) {
        self.status = status;
        self.status_history.push(StatusChange {
            status,
            changed_at: at,
            changed_by: by.to_string(),
        });
    }

    /// Returns the overdue status the booking should enter at `now`, if any.
    ///
    /// A booking waiting for pickup becomes pickup-overdue once
    /// `scheduled_pickup_at + grace.pickup` has passed. A rental in progress
    /// becomes return-overdue once `scheduled_return_at + grace.return_` has
    /// passed.
    ///
    /// Each deadline is marked at most once: a booking whose history already
    /// holds the overdue status has been handled late and is left alone.
    #[must_use]
    pub fn overdue_target(&self, now: OffsetDateTime, grace: &OverdueGrace) -> Option<BookingStatus> {
        let (deadline, target) = match self.status {
            BookingStatus::PendingVehiclePickup | BookingStatus::VehicleInspectedBeforePickup => (
                self.scheduled_pickup_at.checked_add(grace.pickup)?,
                BookingStatus::VehiclePickupOverdue,
            ),
            BookingStatus::CurrentlyRenting => (
                self.scheduled_return_at.checked_add(grace.return_)?,
                BookingStatus::VehicleReturnOverdue,
            ),
            _ => return None,
        };
        let already_marked: bool = self
            .status_history
            .iter()
            .any(|change| change.status == target);
        (now >= deadline && !already_marked).then_some(target)
    }
}
