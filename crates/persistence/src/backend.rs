// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` connection setup.
//!
//! Pool construction, migrations and PRAGMA configuration live
//! here. Booking queries and mutations stay in the Diesel DSL under
//! `queries/` and `mutations/`.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::Integer;
use diesel::{RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A pool of `SQLite` connections to one database.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Applies per-connection PRAGMAs as the pool opens each connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        Ok(())
    }
}

/// Row returned by `PRAGMA foreign_keys`.
///
/// Diesel has no PRAGMA DSL, so this is read with raw SQL.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Verifies that foreign key enforcement is enabled.
///
/// History and audit rows reference their booking; without enforcement
/// an orphaned row could be written.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` if the PRAGMA reports it off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let foreign_keys_enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<PragmaRow>(conn)?
        .foreign_keys;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    debug!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Opens a connection pool with `max_size` connections.
///
/// A pool that must outlive idle periods (an in-memory database vanishes
/// with its last connection) is built with `keep_open`, which holds every
/// connection open for the life of the pool.
///
/// # Arguments
///
/// * `database_url` - A file path or `SQLite` URI
/// * `max_size` - The most connections checked out at once
/// * `keep_open` - Never close idle connections
///
/// # Errors
///
/// Returns an error if the initial connections cannot be opened.
pub fn build_pool(
    database_url: &str,
    max_size: u32,
    keep_open: bool,
) -> Result<SqlitePool, PersistenceError> {
    info!(database_url, max_size, "Opening SQLite connection pool");

    let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(database_url);
    let mut builder: diesel::r2d2::Builder<ConnectionManager<SqliteConnection>> = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionPragmas));
    if keep_open {
        builder = builder
            .min_idle(Some(max_size))
            .idle_timeout(None)
            .max_lifetime(None);
    }
    Ok(builder.build(manager)?)
}

/// Applies pending migrations.
///
/// # Errors
///
/// Returns `MigrationFailed` if a migration cannot be applied.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    debug!("Migrations are up to date");
    Ok(())
}

/// Switches a file-backed database to write-ahead logging.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}
