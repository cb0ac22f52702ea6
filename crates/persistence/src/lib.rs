// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the fleetbook booking orchestrator.
//!
//! Bookings, their append-only status history and the audit log are stored
//! in `SQLite` through Diesel. Migrations are embedded in the binary and run
//! on every open.
//!
//! ## Optimistic concurrency
//!
//! Commits are compare-and-swap on the booking's `version` column. The
//! core checks the presented version against the loaded booking; the
//! store checks it again authoritatively with
//! `UPDATE ... WHERE booking_id = ? AND version = ?`. Zero affected rows
//! means another commit won the race and the whole transaction is
//! rolled back.
//!
//! ## Connections
//!
//! `PersistencePool` owns an r2d2 pool of connections to one database and
//! hands out a `Persistence` per unit of work. Nothing above the store
//! serializes callers; the version check is the only arbiter between
//! concurrent commits. A file-backed pool runs in WAL mode with a busy
//! timeout so writers queue inside `SQLite`.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory` hands every caller a distinct shared-cache
//! in-memory database so tests never observe each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use fleetbook::{OpeningResult, TransitionResult};
use fleetbook_audit::AuditEvent;
use fleetbook_domain::{Booking, BookingId, BookingStatus, StatusChange};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A booking change as it was written, with store-assigned identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedChange {
    /// The booking as stored, carrying its identifier.
    pub booking: Booking,
    /// The audit event as stored, carrying its event identifier.
    pub audit_event: AuditEvent,
}

/// A connection checked out of a `PersistencePool`.
pub type PooledSqliteConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// A pool of connections to one booking database.
///
/// Cloning is cheap; every clone shares the same connections.
#[derive(Clone)]
pub struct PersistencePool {
    pool: backend::SqlitePool,
}

impl std::fmt::Debug for PersistencePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistencePool")
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl PersistencePool {
    /// Creates a pool over a fresh shared-cache in-memory database.
    ///
    /// The pool holds a single connection. A shared-cache database locks
    /// whole tables, so a second connection would fail its writes rather
    /// than wait for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:fleetbook_mem_{db_id}?mode=memory&cache=shared");

        let pool: backend::SqlitePool = backend::build_pool(&shared_memory_url, 1, true)?;
        let mut conn: PooledSqliteConnection = pool.get()?;
        backend::run_migrations(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;
        drop(conn);

        Ok(Self { pool })
    }

    /// Creates a pool of up to `max_size` connections to a database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `max_size` - The most connections checked out at once
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P, max_size: u32) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let pool: backend::SqlitePool = backend::build_pool(path_str, max_size, false)?;
        let mut conn: PooledSqliteConnection = pool.get()?;
        backend::enable_wal_mode(&mut conn)?;
        backend::run_migrations(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;
        drop(conn);

        Ok(Self { pool })
    }

    /// Checks out a connection, waiting if every connection is in use.
    ///
    /// The connection returns to the pool when the `Persistence` is dropped.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseConnectionFailed` if no connection frees up in time.
    pub fn checkout(&self) -> Result<Persistence, PersistenceError> {
        Ok(Persistence {
            conn: self.pool.get()?,
        })
    }
}

/// Persistence adapter for bookings, status history and audit events.
pub struct Persistence {
    pub(crate) conn: PooledSqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives its own database instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        PersistencePool::new_in_memory()?.checkout()
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        PersistencePool::new_with_file(path, 1)?.checkout()
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if enforcement is off or the check fails.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Stores a newly opened booking, its first history entry and its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_booking(
        &mut self,
        opening: &OpeningResult,
    ) -> Result<CommittedChange, PersistenceError> {
        mutations::insert_booking(&mut self.conn, opening)
    }

    /// Commits a transition if the stored version still matches.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` if the stored version moved on,
    /// `BookingNotFound` if the booking does not exist, or an error if a
    /// write fails.
    pub fn commit_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<CommittedChange, PersistenceError> {
        mutations::commit_transition(&mut self.conn, result)
    }

    /// Loads a booking with its status history.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if the booking does not exist.
    pub fn get_booking(&mut self, booking_id: BookingId) -> Result<Booking, PersistenceError> {
        queries::get_booking(&mut self.conn, booking_id)
    }

    /// Returns a booking's status history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` if the booking does not exist.
    pub fn get_status_history(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Vec<StatusChange>, PersistenceError> {
        queries::get_status_history(&mut self.conn, booking_id)
    }

    /// Returns a booking's audit events in commit order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_audit_events(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::get_audit_events(&mut self.conn, booking_id)
    }

    /// Loads every booking currently in one of `statuses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings_in_statuses(
        &mut self,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::list_bookings_in_statuses(&mut self.conn, statuses)
    }
}
