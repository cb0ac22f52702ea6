// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// The canonical numeric identifier of a booking.
///
/// Assigned by the store when the booking is first persisted and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(i64);

impl BookingId {
    /// Creates a new `BookingId`.
    ///
    /// # Arguments
    ///
    /// * `value` - The numeric identifier assigned by the store
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from its textual value.
            #[must_use]
            pub fn new(value: &str) -> Self {
                Self(value.to_string())
            }

            /// Returns the identifier value.
            #[must_use]
            pub fn value(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Reference to the customer who owns a booking.
    RenterId
);
string_id!(
    /// A pickup station.
    StationId
);
string_id!(
    /// A vehicle class (the commercial product the renter reserved).
    VehicleModelId
);
string_id!(
    /// A specific physical vehicle, identified at license-plate level.
    VehicleUnitId
);

/// An integral currency amount.
///
/// Amounts carry no minor units. All arithmetic is checked; an overflow is
/// reported as [`DomainError::AmountOverflow`] rather than wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the sum does not fit.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::AmountOverflow {
                operation: format!("adding {other} to {self}"),
            })
    }

    /// Multiplies the amount by a whole count (e.g. a number of rental days).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the product does not fit.
    pub fn checked_mul(self, count: u32) -> Result<Self, DomainError> {
        self.0
            .checked_mul(i64::from(count))
            .map(Self)
            .ok_or_else(|| DomainError::AmountOverflow {
                operation: format!("multiplying {self} by {count}"),
            })
    }

    /// Validates that the amount is not negative.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NegativeAmount` naming `field` if the amount is
    /// below zero.
    pub fn ensure_non_negative(self, field: &'static str) -> Result<Self, DomainError> {
        if self.is_negative() {
            return Err(DomainError::NegativeAmount {
                field,
                amount: self.0,
            });
        }
        Ok(self)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
