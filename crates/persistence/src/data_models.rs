// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their mapping to and from the domain.
//!
//! Timestamps are stored as RFC 3339 text and money as whole currency
//! units, matching `Money`.
//! Audit components are stored as JSON documents.

use diesel::prelude::*;
use fleetbook_audit::AuditEvent;
use fleetbook_domain::{
    Booking, BookingId, BookingStatus, Money, PricingBreakdown, RenterId, StationId,
    StatusChange, VehicleAssignment, VehicleModelId, VehicleUnitId,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{audit_events, booking_status_history, bookings};
use crate::error::PersistenceError;

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be expressed in RFC 3339.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns `CorruptRecord` naming the column if the text is not RFC 3339.
pub fn parse_timestamp(column: &str, text: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(text, &Rfc3339)
        .map_err(|e| PersistenceError::CorruptRecord(format!("{column} '{text}': {e}")))
}

fn parse_status(text: &str) -> Result<BookingStatus, PersistenceError> {
    text.parse::<BookingStatus>()
        .map_err(|e| PersistenceError::CorruptRecord(e.to_string()))
}

/// A booking row as read from the database.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookingRow {
    pub booking_id: i64,
    pub renter_id: String,
    pub station_id: String,
    pub vehicle_model_id: String,
    pub vehicle_unit_id: Option<String>,
    pub scheduled_pickup_at: String,
    pub scheduled_return_at: String,
    pub actual_return_at: Option<String>,
    pub daily_rate: i64,
    pub rental_subtotal: i64,
    pub deposit: i64,
    pub extra_fees: i64,
    pub total_payable: i64,
    pub status: String,
    pub version: i64,
    pub created_at: String,
}

impl BookingRow {
    /// Rebuilds the domain booking from this row and its ordered history.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` if a stored status or timestamp is malformed.
    pub fn into_booking(self, history: Vec<StatusHistoryRow>) -> Result<Booking, PersistenceError> {
        let status_history: Vec<StatusChange> = rebuild_history(self.booking_id, history)?;

        Ok(Booking {
            booking_id: Some(BookingId::new(self.booking_id)),
            renter_id: RenterId::new(&self.renter_id),
            assignment: VehicleAssignment {
                vehicle_model_id: VehicleModelId::new(&self.vehicle_model_id),
                vehicle_unit_id: self.vehicle_unit_id.as_deref().map(VehicleUnitId::new),
                station_id: StationId::new(&self.station_id),
            },
            scheduled_pickup_at: parse_timestamp(
                "scheduled_pickup_at",
                &self.scheduled_pickup_at,
            )?,
            scheduled_return_at: parse_timestamp(
                "scheduled_return_at",
                &self.scheduled_return_at,
            )?,
            actual_return_at: self
                .actual_return_at
                .as_deref()
                .map(|text| parse_timestamp("actual_return_at", text))
                .transpose()?,
            daily_rate: Money::new(self.daily_rate),
            pricing: PricingBreakdown {
                rental_subtotal: Money::new(self.rental_subtotal),
                deposit: Money::new(self.deposit),
                extra_fees: Money::new(self.extra_fees),
                total_payable: Money::new(self.total_payable),
            },
            status: parse_status(&self.status)?,
            version: self.version,
            status_history,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

/// The writable columns of a booking.
///
/// Used both for the initial insert and for version-checked updates;
/// `None` clears nullable columns.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub struct BookingRecord {
    pub renter_id: String,
    pub station_id: String,
    pub vehicle_model_id: String,
    pub vehicle_unit_id: Option<String>,
    pub scheduled_pickup_at: String,
    pub scheduled_return_at: String,
    pub actual_return_at: Option<String>,
    pub daily_rate: i64,
    pub rental_subtotal: i64,
    pub deposit: i64,
    pub extra_fees: i64,
    pub total_payable: i64,
    pub status: String,
    pub version: i64,
    pub created_at: String,
}

impl BookingRecord {
    /// Flattens a domain booking into its column values.
    ///
    /// # Errors
    ///
    /// Returns an error if a timestamp cannot be formatted.
    pub fn from_booking(booking: &Booking) -> Result<Self, PersistenceError> {
        Ok(Self {
            renter_id: booking.renter_id.value().to_string(),
            station_id: booking.assignment.station_id.value().to_string(),
            vehicle_model_id: booking.assignment.vehicle_model_id.value().to_string(),
            vehicle_unit_id: booking
                .assignment
                .vehicle_unit_id
                .as_ref()
                .map(|unit| unit.value().to_string()),
            scheduled_pickup_at: format_timestamp(booking.scheduled_pickup_at)?,
            scheduled_return_at: format_timestamp(booking.scheduled_return_at)?,
            actual_return_at: booking.actual_return_at.map(format_timestamp).transpose()?,
            daily_rate: booking.daily_rate.amount(),
            rental_subtotal: booking.pricing.rental_subtotal.amount(),
            deposit: booking.pricing.deposit.amount(),
            extra_fees: booking.pricing.extra_fees.amount(),
            total_payable: booking.pricing.total_payable.amount(),
            status: booking.status.as_str().to_string(),
            version: booking.version,
            created_at: format_timestamp(booking.created_at)?,
        })
    }
}

/// A status history row as read from the database.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = booking_status_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StatusHistoryRow {
    pub history_id: i64,
    pub booking_id: i64,
    pub sequence: i64,
    pub status: String,
    pub changed_at: String,
    pub changed_by: String,
}

impl StatusHistoryRow {
    /// Converts this row into a domain status change.
    ///
    /// The row must belong to `booking_id` and sit at `position` in the
    /// booking's history.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` if the row belongs to another booking, is out
    /// of sequence, or its status or timestamp is malformed.
    pub fn into_status_change(
        self,
        booking_id: i64,
        position: usize,
    ) -> Result<StatusChange, PersistenceError> {
        if self.booking_id != booking_id {
            return Err(PersistenceError::CorruptRecord(format!(
                "history row {} belongs to booking {}, not {booking_id}",
                self.history_id, self.booking_id
            )));
        }
        if usize::try_from(self.sequence).ok() != Some(position) {
            return Err(PersistenceError::CorruptRecord(format!(
                "history row {} of booking {booking_id} has sequence {}, expected {position}",
                self.history_id, self.sequence
            )));
        }
        Ok(StatusChange {
            status: parse_status(&self.status)?,
            changed_at: parse_timestamp("changed_at", &self.changed_at)?,
            changed_by: self.changed_by,
        })
    }
}

/// Rebuilds a booking's status history from rows ordered by sequence.
///
/// # Errors
///
/// Returns `CorruptRecord` if a row is foreign, missing or malformed.
pub fn rebuild_history(
    booking_id: i64,
    rows: Vec<StatusHistoryRow>,
) -> Result<Vec<StatusChange>, PersistenceError> {
    rows.into_iter()
        .enumerate()
        .map(|(position, row)| row.into_status_change(booking_id, position))
        .collect()
}

/// A status history entry to append.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booking_status_history)]
pub struct NewStatusHistoryRow {
    pub booking_id: i64,
    pub sequence: i64,
    pub status: String,
    pub changed_at: String,
    pub changed_by: String,
}

impl NewStatusHistoryRow {
    /// Builds the row for the history entry at position `sequence`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position or timestamp cannot be stored.
    pub fn new(
        booking_id: BookingId,
        sequence: usize,
        change: &StatusChange,
    ) -> Result<Self, PersistenceError> {
        let sequence: i64 = i64::try_from(sequence)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        Ok(Self {
            booking_id: booking_id.value(),
            sequence,
            status: change.status.as_str().to_string(),
            changed_at: format_timestamp(change.changed_at)?,
            changed_by: change.changed_by.clone(),
        })
    }
}

/// An audit event row as read from the database.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditEventRow {
    pub event_id: i64,
    pub booking_id: i64,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

impl AuditEventRow {
    /// Deserializes the stored audit components.
    ///
    /// # Errors
    ///
    /// Returns an error if any JSON column is malformed.
    pub fn into_audit_event(self) -> Result<AuditEvent, PersistenceError> {
        Ok(AuditEvent::new(
            Some(BookingId::new(self.booking_id)),
            serde_json::from_str(&self.actor_json)?,
            serde_json::from_str(&self.cause_json)?,
            serde_json::from_str(&self.action_json)?,
            serde_json::from_str(&self.before_snapshot_json)?,
            serde_json::from_str(&self.after_snapshot_json)?,
        )
        .with_event_id(self.event_id))
    }
}

/// An audit event to append.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEventRow {
    pub booking_id: i64,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

impl NewAuditEventRow {
    /// Serializes an audit event for the given booking.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn new(booking_id: BookingId, event: &AuditEvent) -> Result<Self, PersistenceError> {
        Ok(Self {
            booking_id: booking_id.value(),
            actor_json: serde_json::to_string(&event.actor)?,
            cause_json: serde_json::to_string(&event.cause)?,
            action_json: serde_json::to_string(&event.action)?,
            before_snapshot_json: serde_json::to_string(&event.before)?,
            after_snapshot_json: serde_json::to_string(&event.after)?,
        })
    }
}
