// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use fleetbook_audit::AuditEvent;
use fleetbook_domain::BookingId;

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Returns every audit event recorded for a booking, in commit order.
///
/// # Errors
///
/// Returns an error if the query fails or a JSON column is malformed.
pub fn get_audit_events(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::booking_id.eq(booking_id.value()))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(AuditEventRow::into_audit_event)
        .collect()
}
