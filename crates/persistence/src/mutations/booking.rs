// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use fleetbook::{OpeningResult, TransitionResult};
use fleetbook_audit::AuditEvent;
use fleetbook_domain::{BookingId, StatusChange};
use tracing::{debug, info};

use super::audit::persist_audit_event;
use crate::CommittedChange;
use crate::data_models::{BookingRecord, NewStatusHistoryRow};
use crate::diesel_schema::{booking_status_history, bookings};
use crate::error::PersistenceError;

fn insert_status_change(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
    sequence: usize,
    change: &StatusChange,
) -> Result<(), PersistenceError> {
    let row: NewStatusHistoryRow = NewStatusHistoryRow::new(booking_id, sequence, change)?;
    diesel::insert_into(booking_status_history::table)
        .values(&row)
        .execute(conn)?;
    Ok(())
}

/// Stores a newly opened booking with its initial history and audit event.
///
/// The store assigns the booking identifier; the returned booking and
/// audit event carry it.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `opening` - The booking and audit event produced by the core
///
/// # Errors
///
/// Returns an error if any insert fails. Nothing is written in that case.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    opening: &OpeningResult,
) -> Result<CommittedChange, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let record: BookingRecord = BookingRecord::from_booking(&opening.booking)?;
        let booking_id: BookingId = BookingId::new(
            diesel::insert_into(bookings::table)
                .values(&record)
                .returning(bookings::booking_id)
                .get_result::<i64>(conn)?,
        );

        for (sequence, change) in opening.booking.status_history.iter().enumerate() {
            insert_status_change(conn, booking_id, sequence, change)?;
        }

        let audit_event: AuditEvent = opening.audit_event.clone().for_booking(booking_id);
        let event_id: i64 = persist_audit_event(conn, booking_id, &audit_event)?;

        info!(booking_id = booking_id.value(), event_id, "Stored new booking");

        Ok(CommittedChange {
            booking: opening.booking.clone().with_id(booking_id),
            audit_event: audit_event.with_event_id(event_id),
        })
    })
}

/// Commits a transition with an optimistic version check.
///
/// The booking row is only updated while its stored version still equals
/// `previous_version`. The row update, the history entry (if the status
/// changed) and the audit event are written in one transaction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `result` - The transition produced by the core
///
/// # Errors
///
/// Returns an error if:
/// - The booking was never stored
/// - The booking no longer exists
/// - Another commit advanced the version first
/// - Any write fails
pub fn commit_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<CommittedChange, PersistenceError> {
    let booking_id: BookingId = result
        .new_booking
        .booking_id
        .ok_or(PersistenceError::UnsavedBooking)?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let record: BookingRecord = BookingRecord::from_booking(&result.new_booking)?;
        let updated: usize = diesel::update(
            bookings::table
                .filter(bookings::booking_id.eq(booking_id.value()))
                .filter(bookings::version.eq(result.previous_version)),
        )
        .set(&record)
        .execute(conn)?;

        if updated == 0 {
            let exists: bool = diesel::select(diesel::dsl::exists(
                bookings::table.filter(bookings::booking_id.eq(booking_id.value())),
            ))
            .get_result(conn)?;
            if !exists {
                return Err(PersistenceError::BookingNotFound(booking_id));
            }
            debug!(
                booking_id = booking_id.value(),
                expected = result.previous_version,
                "Version check failed"
            );
            return Err(PersistenceError::ConcurrentModification {
                booking_id,
                expected: result.previous_version,
            });
        }

        if let Some(change) = &result.status_change {
            let sequence: usize = result.new_booking.status_history.len().saturating_sub(1);
            insert_status_change(conn, booking_id, sequence, change)?;
        }

        let audit_event: AuditEvent = result.audit_event.clone().for_booking(booking_id);
        let event_id: i64 = persist_audit_event(conn, booking_id, &audit_event)?;

        info!(
            booking_id = booking_id.value(),
            version = result.new_booking.version,
            status = %result.new_booking.status,
            action = %audit_event.action.name,
            "Committed booking change"
        );

        Ok(CommittedChange {
            booking: result.new_booking.clone(),
            audit_event: audit_event.with_event_id(event_id),
        })
    })
}

