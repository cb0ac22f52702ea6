// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The overdue sweep.
//!
//! A single pass loads every booking waiting on a pickup or return, marks
//! those whose deadline (plus grace) has passed, and commits each with the
//! usual version check. A deadline is marked at most once. A booking that changed since it was loaded is
//! skipped; any other failure is logged and the pass moves on.

use fleetbook::{Command, TransitionResult, apply};
use fleetbook_audit::{Actor, Cause};
use fleetbook_domain::{Booking, BookingId, BookingStatus, OverdueGrace};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::handlers::Orchestrator;

/// Statuses that carry a pickup or return deadline.
pub const SWEEP_STATUSES: [BookingStatus; 3] = [
    BookingStatus::PendingVehiclePickup,
    BookingStatus::VehicleInspectedBeforePickup,
    BookingStatus::CurrentlyRenting,
];

/// The outcome of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Bookings found past their deadline.
    pub candidates: usize,
    /// Bookings moved to an overdue status.
    pub marked: Vec<BookingId>,
    /// Bookings another actor changed first.
    pub skipped: Vec<BookingId>,
    /// Bookings whose commit failed for another reason.
    pub failed: Vec<BookingId>,
}

/// Loads the bookings whose deadline has passed at `now`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn collect_overdue_candidates(
    orchestrator: &mut Orchestrator<'_>,
    now: OffsetDateTime,
) -> Result<Vec<Booking>, ApiError> {
    let grace: OverdueGrace = orchestrator.config.grace;
    let waiting: Vec<Booking> = orchestrator
        .persistence
        .list_bookings_in_statuses(&SWEEP_STATUSES)
        .map_err(translate_persistence_error)?;
    Ok(waiting
        .into_iter()
        .filter(|booking| booking.overdue_target(now, &grace).is_some())
        .collect())
}

/// Marks one booking overdue as the sweep actor.
///
/// # Errors
///
/// Returns an error if the booking is not overdue, has no id, or the
/// commit fails (including `ConcurrentModification` on a lost race).
pub fn mark_overdue(
    orchestrator: &mut Orchestrator<'_>,
    booking: &Booking,
    now: OffsetDateTime,
) -> Result<Booking, ApiError> {
    let result: TransitionResult = apply(
        booking,
        Command::MarkOverdue {
            expected_version: booking.version,
        },
        &orchestrator.config.context_at(now),
        Actor::overdue_sweep(),
        Cause::new(
            String::from("overdue-sweep"),
            String::from("Pickup or return deadline passed"),
        ),
    )
    .map_err(translate_core_error)?;

    Ok(orchestrator.commit(booking.status, &result)?.booking)
}

/// Attempts to mark one candidate and records the outcome in `report`.
///
/// Callers that release the store between bookings call this once per
/// candidate; `report.candidates` is left to them.
pub fn sweep_candidate(
    orchestrator: &mut Orchestrator<'_>,
    booking: &Booking,
    now: OffsetDateTime,
    report: &mut SweepReport,
) {
    let Some(booking_id) = booking.booking_id else {
        return;
    };
    match mark_overdue(orchestrator, booking, now) {
        Ok(marked) => {
            info!(
                booking_id = booking_id.value(),
                status = %marked.status,
                "Marked booking overdue"
            );
            report.marked.push(booking_id);
        }
        Err(ApiError::ConcurrentModification { .. }) => {
            debug!(
                booking_id = booking_id.value(),
                "Booking changed during sweep, skipping"
            );
            report.skipped.push(booking_id);
        }
        Err(err) => {
            warn!(booking_id = booking_id.value(), error = %err, "Overdue sweep failed for booking");
            report.failed.push(booking_id);
        }
    }
}

/// Attempts to mark each candidate, collecting the outcome per booking.
pub fn process_overdue_candidates(
    orchestrator: &mut Orchestrator<'_>,
    candidates: &[Booking],
    now: OffsetDateTime,
) -> SweepReport {
    let mut report: SweepReport = SweepReport {
        candidates: candidates.len(),
        ..SweepReport::default()
    };
    for booking in candidates {
        sweep_candidate(orchestrator, booking, now, &mut report);
    }
    report
}

impl SweepReport {
    /// Folds the per-booking outcomes of `other` into this report.
    pub fn absorb(&mut self, other: Self) {
        self.marked.extend(other.marked);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// Logs the totals of a finished pass that found any candidates.
    pub fn log_summary(&self) {
        if self.candidates > 0 {
            info!(
                candidates = self.candidates,
                marked = self.marked.len(),
                skipped = self.skipped.len(),
                failed = self.failed.len(),
                "Overdue sweep finished"
            );
        }
    }
}

/// Runs one full sweep pass.
///
/// # Errors
///
/// Returns an error only if the candidates cannot be loaded; per-booking
/// failures are reported in the returned `SweepReport`.
pub fn run_overdue_sweep(
    orchestrator: &mut Orchestrator<'_>,
    now: OffsetDateTime,
) -> Result<SweepReport, ApiError> {
    let candidates: Vec<Booking> = collect_overdue_candidates(orchestrator, now)?;
    let report: SweepReport = process_overdue_candidates(orchestrator, &candidates, now);
    report.log_summary();
    Ok(report)
}
