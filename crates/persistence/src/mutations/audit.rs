// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use fleetbook_audit::AuditEvent;
use fleetbook_domain::BookingId;

use crate::data_models::NewAuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Appends an audit event and returns its assigned identifier.
///
/// Audit rows are never updated or deleted.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `booking_id` - The booking the event belongs to
/// * `event` - The audit event to persist
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let row: NewAuditEventRow = NewAuditEventRow::new(booking_id, event)?;
    let event_id: i64 = diesel::insert_into(audit_events::table)
        .values(&row)
        .returning(audit_events::event_id)
        .get_result(conn)?;
    Ok(event_id)
}
