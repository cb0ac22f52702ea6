// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleetbook_domain::{BookingPatch, BookingStatus, Money};

/// A command represents caller intent against an existing booking as data only.
///
/// Every command carries the version the caller last read. A command applied
/// to a booking at any other version fails with `ConcurrentModification`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Change mutable booking fields.
    UpdateFields {
        /// The version the caller last read.
        expected_version: i64,
        /// The requested changes.
        patch: BookingPatch,
        /// The daily rate of the new model, when the patch changes the model.
        model_rate: Option<Money>,
    },
    /// Force the booking into a status (staff only).
    ForceStatus {
        /// The version the caller last read.
        expected_version: i64,
        /// The requested status.
        target: BookingStatus,
    },
    /// Cancel the booking.
    Cancel {
        /// The version the caller last read.
        expected_version: i64,
        /// Why the booking is being cancelled.
        reason: String,
    },
    /// Move the booking into the overdue status its passed deadline implies.
    MarkOverdue {
        /// The version the sweep read.
        expected_version: i64,
    },
}

impl Command {
    /// Returns the version the caller presented.
    #[must_use]
    pub const fn expected_version(&self) -> i64 {
        match self {
            Self::UpdateFields {
                expected_version, ..
            }
            | Self::ForceStatus {
                expected_version, ..
            }
            | Self::Cancel {
                expected_version, ..
            }
            | Self::MarkOverdue { expected_version } => *expected_version,
        }
    }

    /// Returns the audit action name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateFields { .. } => "UpdateFields",
            Self::ForceStatus { .. } => "ForceStatus",
            Self::Cancel { .. } => "CancelBooking",
            Self::MarkOverdue { .. } => "MarkOverdue",
        }
    }
}
