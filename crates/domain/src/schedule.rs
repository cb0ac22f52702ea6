// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rental window validation.
//!
//! The validator only rejects. It never clamps a pickup time to `now`;
//! callers that want that convenience resubmit with the adjusted value.

use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Business limits applied to a proposed rental window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLimits {
    /// How far ahead of `now` a pickup may be scheduled.
    pub max_pickup_lead: Duration,
    /// The shortest permitted rental.
    pub min_rental: Duration,
    /// The longest permitted rental.
    pub max_rental: Duration,
}

impl ScheduleLimits {
    /// Creates a new set of limits.
    ///
    /// # Arguments
    ///
    /// * `max_pickup_lead` - Maximum distance between `now` and pickup
    /// * `min_rental` - Minimum distance between pickup and return
    /// * `max_rental` - Maximum distance between pickup and return
    #[must_use]
    pub const fn new(max_pickup_lead: Duration, min_rental: Duration, max_rental: Duration) -> Self {
        Self {
            max_pickup_lead,
            min_rental,
            max_rental,
        }
    }
}

impl Default for ScheduleLimits {
    fn default() -> Self {
        Self::new(Duration::days(5), Duration::hours(1), Duration::days(30))
    }
}

/// A rental window that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSchedule {
    /// Scheduled pickup time.
    pub pickup_at: OffsetDateTime,
    /// Scheduled return time.
    pub return_at: OffsetDateTime,
    /// Billable rental days.
    pub rental_days: u32,
}

/// Validates a proposed rental window.
///
/// Rules are checked in order and the first violation is returned:
/// 1. pickup must not precede `now`
/// 2. pickup must not exceed `now + max_pickup_lead`
/// 3. return must be at least `min_rental` after pickup
/// 4. return must not exceed `max_rental` after pickup
///
/// # Arguments
///
/// * `pickup_at` - Proposed pickup time
/// * `return_at` - Proposed return time
/// * `now` - The current wall-clock time
/// * `limits` - The limits to apply
///
/// # Errors
///
/// Returns the `ScheduleError` for the first rule the window violates.
pub fn validate_schedule(
    pickup_at: OffsetDateTime,
    return_at: OffsetDateTime,
    now: OffsetDateTime,
    limits: &ScheduleLimits,
) -> Result<ValidatedSchedule, ScheduleError> {
    if pickup_at < now {
        return Err(ScheduleError::PickupInPast);
    }

    if let Some(horizon) = now.checked_add(limits.max_pickup_lead)
        && pickup_at > horizon
    {
        return Err(ScheduleError::PickupTooFar);
    }

    validate_return_extension(pickup_at, return_at, limits)
}

/// Validates a rental window without the pickup rules.
///
/// Used when the return time of a rental already in progress is moved; the
/// pickup is in the past by then.
///
/// # Errors
///
/// Returns `ReturnBeforeMinimumWindow` or `ReturnTooFar`.
pub fn validate_return_extension(
    pickup_at: OffsetDateTime,
    return_at: OffsetDateTime,
    limits: &ScheduleLimits,
) -> Result<ValidatedSchedule, ScheduleError> {
    let span: Duration = return_at - pickup_at;

    if span < limits.min_rental {
        return Err(ScheduleError::ReturnBeforeMinimumWindow);
    }

    if span > limits.max_rental {
        return Err(ScheduleError::ReturnTooFar);
    }

    Ok(ValidatedSchedule {
        pickup_at,
        return_at,
        rental_days: rental_days(pickup_at, return_at),
    })
}

/// Computes the billable day count of a rental window.
///
/// Any started 24-hour block counts as a full day, with a minimum of one.
#[must_use]
pub fn rental_days(pickup_at: OffsetDateTime, return_at: OffsetDateTime) -> u32 {
    let span: Duration = return_at - pickup_at;
    let mut days: i64 = span.whole_days();
    if span > Duration::days(days) {
        days += 1;
    }
    u32::try_from(days.max(1)).unwrap_or(u32::MAX)
}
