// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use fleetbook::CoreError;
use fleetbook_domain::{BookingId, DomainError};
use fleetbook_persistence::PersistenceError;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain, core and persistence errors and
/// represent the API contract. Inner error types never cross this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The requested pickup/return window was rejected.
    #[error("Schedule rejected ({reason}): {message}")]
    ScheduleRejected {
        /// The schedule rule that failed.
        reason: String,
        /// A human-readable description.
        message: String,
    },
    /// A field is not editable in the booking's current status.
    #[error("Field '{field}' cannot be changed while the booking is {status}")]
    FieldLocked {
        /// The locked field.
        field: String,
        /// The booking's status.
        status: String,
    },
    /// The requested status change is not in the transition table.
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// The requested status is not on the manual override allow-list.
    #[error("Status {status} cannot be forced manually")]
    OverrideNotPermitted {
        /// The requested status.
        status: String,
    },
    /// Another commit changed the booking since the caller read it.
    #[error("Concurrent modification: {message}")]
    ConcurrentModification {
        /// The booking concerned, if it has been stored.
        booking_id: Option<i64>,
        /// A human-readable description.
        message: String,
    },
    /// The fleet cannot supply the requested vehicle.
    #[error("Vehicle unavailable: {message}")]
    InventoryUnavailable {
        /// The requested unit, if a specific unit was asked for.
        vehicle_unit_id: Option<String>,
        /// A human-readable description.
        message: String,
    },
    /// A domain rule was violated.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns a stable machine-readable name for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ResourceNotFound { .. } => "not_found",
            Self::ScheduleRejected { .. } => "schedule_rejected",
            Self::FieldLocked { .. } => "field_locked",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::OverrideNotPermitted { .. } => "override_not_permitted",
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::InventoryUnavailable { .. } => "inventory_unavailable",
            Self::DomainRuleViolation { .. } => "domain_rule_violation",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::Schedule(schedule_err) => ApiError::ScheduleRejected {
            reason: schedule_err.as_str().to_string(),
            message: schedule_err.to_string(),
        },
        DomainError::FieldLocked { field, status } => ApiError::FieldLocked {
            field: field.to_string(),
            status: status.to_string(),
        },
        DomainError::IllegalTransition { from, to } => ApiError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        },
        DomainError::OverrideNotPermitted { status } => ApiError::OverrideNotPermitted {
            status: status.to_string(),
        },
        DomainError::InvalidBookingStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown booking status '{value}'"),
        },
        DomainError::InvalidBookingField(value) => ApiError::InvalidInput {
            field: String::from("field"),
            message: format!("Unknown booking field '{value}'"),
        },
        DomainError::EmptyPatch => ApiError::InvalidInput {
            field: String::from("patch"),
            message: String::from("The update contains no changes"),
        },
        DomainError::NegativeAmount { field, amount } => ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("Amount must not be negative, got {amount}"),
        },
        DomainError::AmountOverflow { operation } => ApiError::DomainRuleViolation {
            rule: String::from("amount_range"),
            message: format!("Amount overflow while {operation}"),
        },
        DomainError::InvalidTicketStatus(value) => ApiError::InvalidInput {
            field: String::from("ticket_status"),
            message: format!("Unknown ticket status '{value}'"),
        },
        DomainError::InvalidTicketTransition { from, to } => ApiError::DomainRuleViolation {
            rule: String::from("ticket_transition"),
            message: format!("Ticket cannot move from {from} to {to}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ConcurrentModification {
            booking_id,
            expected,
            actual,
        } => ApiError::ConcurrentModification {
            booking_id: booking_id.as_ref().map(BookingId::value),
            message: format!(
                "Presented version {expected} but the booking is at version {actual}; reload and retry"
            ),
        },
        CoreError::NotOverdue { status } => ApiError::DomainRuleViolation {
            rule: String::from("overdue_deadline"),
            message: format!("Booking in {status} has not passed its deadline"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures surface as `Internal` without their inner detail.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::BookingNotFound(booking_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {booking_id} does not exist"),
        },
        PersistenceError::ConcurrentModification {
            booking_id,
            expected,
        } => ApiError::ConcurrentModification {
            booking_id: Some(booking_id.value()),
            message: format!(
                "Booking {booking_id} is no longer at version {expected}; reload and retry"
            ),
        },
        other => ApiError::Internal {
            message: format!("Storage failure: {other}"),
        },
    }
}
