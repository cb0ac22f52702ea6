// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking price derivation.
//!
//! Pricing is a pure function of the daily rate, the rental day count and
//! the pricing phase. Recomputing with the same inputs always yields the
//! same breakdown.

use crate::error::DomainError;
use crate::types::Money;
use serde::{Deserialize, Serialize};

/// Share of the rental subtotal collected up front, in percent.
pub const DEPOSIT_PERCENT: i64 = 30;

/// Which amount is currently payable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PricingPhase {
    /// Before the vehicle is returned; the deposit is due.
    PreReturn,
    /// After the vehicle is returned; the full balance is due.
    PostReturn {
        /// Fees assessed at the post-return inspection.
        extra_fees: Money,
    },
}

/// The derived monetary figures of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// `daily_rate * rental_days`.
    pub rental_subtotal: Money,
    /// The subtotal share collected up front.
    pub deposit: Money,
    /// Fees assessed after return; zero before.
    pub extra_fees: Money,
    /// The amount currently due.
    pub total_payable: Money,
}

/// Computes the deposit for a subtotal, rounding half up.
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` if the intermediate product
/// overflows, or `DomainError::NegativeAmount` for a negative subtotal.
pub fn deposit_for(rental_subtotal: Money) -> Result<Money, DomainError> {
    let subtotal: i64 = rental_subtotal
        .ensure_non_negative("rental_subtotal")?
        .amount();

    subtotal
        .checked_mul(DEPOSIT_PERCENT)
        .and_then(|scaled| scaled.checked_add(50))
        .map(|scaled| Money::new(scaled / 100))
        .ok_or_else(|| DomainError::AmountOverflow {
            operation: format!("computing the deposit for {rental_subtotal}"),
        })
}

/// Derives the pricing breakdown of a booking.
///
/// # Arguments
///
/// * `daily_rate` - The rate of the reserved vehicle model
/// * `rental_days` - Billable days from the validated schedule
/// * `phase` - Whether the vehicle has been returned yet
///
/// # Errors
///
/// Returns an error if an input amount is negative or a computation
/// overflows.
pub fn calculate_pricing(
    daily_rate: Money,
    rental_days: u32,
    phase: PricingPhase,
) -> Result<PricingBreakdown, DomainError> {
    let rental_subtotal: Money = daily_rate
        .ensure_non_negative("daily_rate")?
        .checked_mul(rental_days)?;
    let deposit: Money = deposit_for(rental_subtotal)?;

    match phase {
        PricingPhase::PreReturn => Ok(PricingBreakdown {
            rental_subtotal,
            deposit,
            extra_fees: Money::ZERO,
            total_payable: deposit,
        }),
        PricingPhase::PostReturn { extra_fees } => {
            let extra_fees: Money = extra_fees.ensure_non_negative("extra_fees")?;
            Ok(PricingBreakdown {
                rental_subtotal,
                deposit,
                extra_fees,
                total_payable: rental_subtotal.checked_add(extra_fees)?,
            })
        }
    }
}
