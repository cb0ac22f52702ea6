// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use fleetbook_domain::{Booking, BookingId, VehicleUnitId};
use serde::{Deserialize, Serialize};

/// The kind of entity performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// The customer who owns the booking.
    Renter,
    /// A staff member acting through the back office.
    Staff,
    /// An automated process (payment webhook, inspection system, deadline sweep).
    System,
}

impl ActorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Renter => "renter",
            Self::Staff => "staff",
            Self::System => "system",
        }
    }
}

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The kind of actor.
    pub kind: ActorKind,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `kind` - The kind of actor
    #[must_use]
    pub const fn new(id: String, kind: ActorKind) -> Self {
        Self { id, kind }
    }

    /// The actor used by the periodic overdue sweep.
    #[must_use]
    pub fn overdue_sweep() -> Self {
        Self::new(String::from("overdue-sweep"), ActorKind::System)
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, event ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`ForceStatus`", "`UpdateFields`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of a booking at a point in time.
///
/// Captures the status, version and the fields a transition may change, as
/// `key=value` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Captures the audited fields of a booking.
    #[must_use]
    pub fn of_booking(booking: &Booking) -> Self {
        let unit: &str = booking
            .assignment
            .vehicle_unit_id
            .as_ref()
            .map_or("none", VehicleUnitId::value);
        Self::new(format!(
            "status={} version={} model={} unit={} station={} pickup={} return={} total_payable={}",
            booking.status,
            booking.version,
            booking.assignment.vehicle_model_id,
            unit,
            booking.assignment.station_id,
            booking.scheduled_pickup_at.unix_timestamp(),
            booking.scheduled_return_at.unix_timestamp(),
            booking.pricing.total_payable,
        ))
    }
}

/// An immutable audit event representing a booking state transition.
///
/// Every committed change must produce exactly one audit event.
/// Audit events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The state before the transition (before)
/// - The state after the transition (after)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The identifier assigned by the store; `None` before persistence.
    pub event_id: Option<i64>,
    /// The booking this event concerns; `None` until the booking is stored.
    pub booking_id: Option<BookingId>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// Once created, an audit event is immutable.
    ///
    /// # Arguments
    ///
    /// * `booking_id` - The booking concerned, if already stored
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        booking_id: Option<BookingId>,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            booking_id,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns a copy of this event scoped to a stored booking.
    #[must_use]
    pub fn for_booking(self, booking_id: BookingId) -> Self {
        Self {
            booking_id: Some(booking_id),
            ..self
        }
    }

    /// Returns a copy of this event carrying its persisted identifier.
    #[must_use]
    pub fn with_event_id(self, event_id: i64) -> Self {
        Self {
            event_id: Some(event_id),
            ..self
        }
    }
}
