// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Status-changed notifications.
//!
//! Emitted after every committed status transition. Delivery is the
//! notifier's concern and must not block or fail the commit.

use fleetbook_domain::{Booking, BookingId, BookingStatus, StatusChange};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A committed status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotification {
    pub booking_id: BookingId,
    pub from: BookingStatus,
    pub to: BookingStatus,
    /// The booking version after the transition.
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub changed_at: OffsetDateTime,
    pub changed_by: String,
}

impl StatusNotification {
    /// Builds the notification for the newest history entry of `booking`.
    ///
    /// Returns `None` for unsaved bookings or when there is no prior status.
    #[must_use]
    pub fn for_transition(from: BookingStatus, booking: &Booking) -> Option<Self> {
        let booking_id: BookingId = booking.booking_id?;
        let change: &StatusChange = booking.status_history.last()?;
        Some(Self {
            booking_id,
            from,
            to: change.status,
            version: booking.version,
            changed_at: change.changed_at,
            changed_by: change.changed_by.clone(),
        })
    }
}

/// Receives status-changed notifications, fire-and-forget.
pub trait StatusNotifier: Send + Sync {
    /// Called once per committed status transition.
    fn status_changed(&self, notification: &StatusNotification);
}

/// A notifier that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl StatusNotifier for NoopNotifier {
    fn status_changed(&self, _notification: &StatusNotification) {}
}
