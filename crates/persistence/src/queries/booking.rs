// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use fleetbook_domain::{Booking, BookingId, BookingStatus, StatusChange};

use crate::data_models::{BookingRow, StatusHistoryRow, rebuild_history};
use crate::diesel_schema::{booking_status_history, bookings};
use crate::error::PersistenceError;

fn load_history_rows(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<StatusHistoryRow>, PersistenceError> {
    Ok(booking_status_history::table
        .filter(booking_status_history::booking_id.eq(booking_id))
        .order(booking_status_history::sequence.asc())
        .select(StatusHistoryRow::as_select())
        .load(conn)?)
}

fn load_booking_row(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<BookingRow, PersistenceError> {
    bookings::table
        .find(booking_id.value())
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::BookingNotFound(booking_id))
}

/// Loads a booking together with its full status history.
///
/// # Errors
///
/// Returns `BookingNotFound` if no such booking exists, or an error if a
/// stored row is malformed.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Booking, PersistenceError> {
    let row: BookingRow = load_booking_row(conn, booking_id)?;
    let history: Vec<StatusHistoryRow> = load_history_rows(conn, row.booking_id)?;
    row.into_booking(history)
}

/// Returns a booking's status history, oldest first.
///
/// # Errors
///
/// Returns `BookingNotFound` if no such booking exists.
pub fn get_status_history(
    conn: &mut SqliteConnection,
    booking_id: BookingId,
) -> Result<Vec<StatusChange>, PersistenceError> {
    let row: BookingRow = load_booking_row(conn, booking_id)?;
    let history: Vec<StatusHistoryRow> = load_history_rows(conn, row.booking_id)?;
    rebuild_history(row.booking_id, history)
}

/// Loads every booking currently in one of `statuses`, ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub fn list_bookings_in_statuses(
    conn: &mut SqliteConnection,
    statuses: &[BookingStatus],
) -> Result<Vec<Booking>, PersistenceError> {
    let names: Vec<&'static str> = statuses.iter().map(BookingStatus::as_str).collect();
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::status.eq_any(names))
        .order(bookings::booking_id.asc())
        .select(BookingRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            let history: Vec<StatusHistoryRow> = load_history_rows(conn, row.booking_id)?;
            row.into_booking(history)
        })
        .collect()
}
