// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Renter complaint tickets.
//!
//! A ticket follows a four-state workflow:
//! `Submitted → InReview → Resolved | Rejected`.

use crate::error::DomainError;
use crate::types::BookingId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The status of a complaint ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Submitted,
    InReview,
    Resolved,
    Rejected,
}

impl TicketStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::InReview => "InReview",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }

    /// Returns true if the ticket is closed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `Submitted` → `InReview`
    /// - `InReview` → `Resolved`
    /// - `InReview` → `Rejected`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Submitted, Self::InReview)
                | (Self::InReview, Self::Resolved | Self::Rejected)
        )
    }

    /// Validates a ticket status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTicketTransition` if the change is not permitted.
    pub const fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTicketTransition {
                from: *self,
                to: target,
            })
        }
    }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(Self::Submitted),
            "InReview" => Ok(Self::InReview),
            "Resolved" => Ok(Self::Resolved),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidTicketStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complaint raised by a renter against a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// The booking the complaint concerns.
    pub booking_id: BookingId,
    /// Free-text summary supplied by the renter.
    pub subject: String,
    /// Current workflow status.
    pub status: TicketStatus,
}

impl Ticket {
    /// Opens a new ticket in `Submitted`.
    #[must_use]
    pub const fn new(booking_id: BookingId, subject: String) -> Self {
        Self {
            booking_id,
            subject,
            status: TicketStatus::Submitted,
        }
    }

    /// Moves the ticket to `target`, returning the updated ticket.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTicketTransition` if the change is not permitted.
    pub fn transition_to(&self, target: TicketStatus) -> Result<Self, DomainError> {
        self.status.validate_transition(target)?;
        Ok(Self {
            status: target,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TicketStatus; 4] = [
        TicketStatus::Submitted,
        TicketStatus::InReview,
        TicketStatus::Resolved,
        TicketStatus::Rejected,
    ];

    #[test]
    fn test_ticket_status_string_round_trip() {
        for status in ALL {
            let parsed: Result<TicketStatus, DomainError> = status.as_str().parse();
            assert_eq!(parsed, Ok(status));
        }
        assert!(matches!(
            "Closed".parse::<TicketStatus>(),
            Err(DomainError::InvalidTicketStatus(_))
        ));
    }

    #[test]
    fn test_ticket_transition_table() {
        let legal: [(TicketStatus, TicketStatus); 3] = [
            (TicketStatus::Submitted, TicketStatus::InReview),
            (TicketStatus::InReview, TicketStatus::Resolved),
            (TicketStatus::InReview, TicketStatus::Rejected),
        ];

        for from in ALL {
            for to in ALL {
                let expected: bool = legal.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_terminal_ticket_rejects_reopen() {
        let result: Result<(), DomainError> =
            TicketStatus::Resolved.validate_transition(TicketStatus::InReview);
        assert!(matches!(
            result,
            Err(DomainError::InvalidTicketTransition {
                from: TicketStatus::Resolved,
                to: TicketStatus::InReview,
            })
        ));
        assert!(TicketStatus::Rejected.is_terminal());
        assert!(!TicketStatus::InReview.is_terminal());
    }

    #[test]
    fn test_ticket_walks_workflow() {
        let ticket: Ticket = Ticket::new(BookingId::new(7), String::from("Scratched door"));
        assert_eq!(ticket.status, TicketStatus::Submitted);

        let in_review: Ticket = match ticket.transition_to(TicketStatus::InReview) {
            Ok(t) => t,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(in_review.status, TicketStatus::InReview);
        assert_eq!(in_review.subject, "Scratched door");

        assert!(ticket.transition_to(TicketStatus::Resolved).is_err());
        assert!(in_review.transition_to(TicketStatus::Rejected).is_ok());
    }
}
