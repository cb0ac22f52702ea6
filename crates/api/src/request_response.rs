// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use fleetbook::AutomatedEvent;
use fleetbook_domain::{
    Booking, BookingId, BookingPatch, BookingStatus, Money, PricingBreakdown, StatusChange,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::capabilities::BookingCapabilities;

/// API request to open a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub renter_id: String,
    pub station_id: String,
    pub vehicle_model_id: String,
    /// A specific unit; any unit of the model will do when absent.
    #[serde(default)]
    pub vehicle_unit_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub pickup_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub return_at: OffsetDateTime,
}

/// API request to edit a booking's assignment or schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    /// The version the caller last read.
    pub version: i64,
    pub patch: BookingPatch,
}

/// API request for a staff status override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceStatusRequest {
    /// The version the caller last read.
    pub version: i64,
    pub target_status: BookingStatus,
}

/// API request to cancel a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    /// The version the caller last read.
    pub version: i64,
    pub reason: String,
}

/// API request carrying an automated event.
///
/// Events carry no version; they apply to the booking as currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatedEventRequest {
    pub event: AutomatedEvent,
}

/// A booking as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking_id: Option<BookingId>,
    pub renter_id: String,
    pub station_id: String,
    pub vehicle_model_id: String,
    pub vehicle_unit_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_pickup_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_return_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub actual_return_at: Option<OffsetDateTime>,
    pub rental_days: u32,
    pub daily_rate: Money,
    pub pricing: PricingBreakdown,
    pub status: BookingStatus,
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id,
            renter_id: booking.renter_id.value().to_string(),
            station_id: booking.assignment.station_id.value().to_string(),
            vehicle_model_id: booking.assignment.vehicle_model_id.value().to_string(),
            vehicle_unit_id: booking
                .assignment
                .vehicle_unit_id
                .as_ref()
                .map(|unit| unit.value().to_string()),
            scheduled_pickup_at: booking.scheduled_pickup_at,
            scheduled_return_at: booking.scheduled_return_at,
            actual_return_at: booking.actual_return_at,
            rental_days: booking.rental_days(),
            daily_rate: booking.daily_rate,
            pricing: booking.pricing,
            status: booking.status,
            version: booking.version,
            created_at: booking.created_at,
        }
    }
}

/// API response for an automated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    /// False if the booking was not in a status the event presupposes.
    pub applied: bool,
    pub event: String,
    pub booking: BookingResponse,
    pub message: String,
}

/// API response listing a booking's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryResponse {
    pub booking_id: BookingId,
    /// Oldest first.
    pub entries: Vec<StatusChange>,
}

/// API response describing what the caller may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicyResponse {
    pub booking_id: BookingId,
    pub status: BookingStatus,
    pub version: i64,
    pub capabilities: BookingCapabilities,
}
