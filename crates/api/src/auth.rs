// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Real identity verification is out of scope; callers are trusted to
//! present their id and role, and `authenticate_stub` only checks that
//! the id is present.

use fleetbook_audit::{Actor, ActorKind};
use fleetbook_domain::Booking;

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Rental staff: may edit any booking and force statuses.
    Staff,
    /// A renter: may create, edit and cancel their own bookings.
    Renter,
    /// An integrated system (payments, inspection app, scheduler).
    ///
    /// Systems feed automated events and may read any booking.
    System,
}

impl Role {
    /// Returns the string representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Renter => "renter",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "staff" => Ok(Self::Staff),
            "renter" => Ok(Self::Renter),
            "system" => Ok(Self::System),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: '{s}'. Must be 'staff', 'renter' or 'system'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit `Actor`.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        let kind: ActorKind = match self.role {
            Role::Staff => ActorKind::Staff,
            Role::Renter => ActorKind::Renter,
            Role::System => ActorKind::System,
        };
        Actor::new(self.id.clone(), kind)
    }

    fn owns(&self, booking: &Booking) -> bool {
        booking.renter_id.value() == self.id
    }
}

/// Authenticates an actor by id and role.
///
/// # Errors
///
/// Returns an error if the actor id is empty.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role))
}

fn denied(action: &str, required_role: &str) -> AuthError {
    AuthError::Unauthorized {
        action: action.to_string(),
        required_role: required_role.to_string(),
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may open a booking for `renter_id`.
    ///
    /// Staff may book for anyone; renters only for themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a system or books for someone else.
    pub fn authorize_create_booking(
        actor: &AuthenticatedActor,
        renter_id: &str,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Staff => Ok(()),
            Role::Renter if actor.id == renter_id => Ok(()),
            Role::Renter | Role::System => Err(denied("create_booking", "Staff or owning Renter")),
        }
    }

    /// Checks if an actor may edit a booking's fields.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is staff or the booking's renter.
    pub fn authorize_update_booking(
        actor: &AuthenticatedActor,
        booking: &Booking,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Staff => Ok(()),
            Role::Renter if actor.owns(booking) => Ok(()),
            Role::Renter | Role::System => Err(denied("update_booking", "Staff or owning Renter")),
        }
    }

    /// Checks if an actor may force a booking's status.
    ///
    /// Only staff may force statuses.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not staff.
    pub fn authorize_force_status(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Staff => Ok(()),
            Role::Renter | Role::System => Err(denied("force_status", "Staff")),
        }
    }

    /// Checks if an actor may cancel a booking.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is staff or the booking's renter.
    pub fn authorize_cancel_booking(
        actor: &AuthenticatedActor,
        booking: &Booking,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Staff => Ok(()),
            Role::Renter if actor.owns(booking) => Ok(()),
            Role::Renter | Role::System => Err(denied("cancel_booking", "Staff or owning Renter")),
        }
    }

    /// Checks if an actor may feed automated events.
    ///
    /// Systems and staff (for inspections recorded at the counter) may.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a renter.
    pub fn authorize_automated_event(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::System | Role::Staff => Ok(()),
            Role::Renter => Err(denied("automated_event", "System or Staff")),
        }
    }

    /// Checks if an actor may read a booking, its history or its policy.
    ///
    /// # Errors
    ///
    /// Returns an error if a renter reads someone else's booking.
    pub fn authorize_read_booking(
        actor: &AuthenticatedActor,
        booking: &Booking,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Staff | Role::System => Ok(()),
            Role::Renter if actor.owns(booking) => Ok(()),
            Role::Renter => Err(denied("read_booking", "Staff, System or owning Renter")),
        }
    }
}
