// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleetbook_domain::{BookingId, BookingStatus, DomainError};
use thiserror::Error;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// The caller presented a version that is no longer current.
    #[error("booking was modified concurrently: expected version {expected}, found {actual}")]
    ConcurrentModification {
        /// The booking concerned, if stored.
        booking_id: Option<BookingId>,
        /// The version the caller presented.
        expected: i64,
        /// The version actually held.
        actual: i64,
    },
    /// A sweep asked to mark a booking overdue before its deadline passed.
    #[error("booking in status {status} is not overdue")]
    NotOverdue {
        /// The booking's current status.
        status: BookingStatus,
    },
}

