// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::event::AutomatedEvent;
use crate::state::{ApplyContext, EventOutcome, NewBooking, OpeningResult, TransitionResult};
use fleetbook_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use fleetbook_domain::{
    Booking, BookingField, BookingPatch, BookingStatus, DomainError, Money, StatusChange,
    TransitionTrigger, ValidatedSchedule, check_patch, validate_override, validate_return_extension,
    validate_schedule, validate_transition,
};
use time::OffsetDateTime;

/// Opens a new booking in `PendingDepositPayment`.
///
/// # Arguments
///
/// * `request` - Renter, assignment, requested window and quoted rate
/// * `ctx` - Clock and limits
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the schedule is rejected or pricing overflows.
pub fn open_booking(
    request: NewBooking,
    ctx: &ApplyContext,
    actor: Actor,
    cause: Cause,
) -> Result<OpeningResult, CoreError> {
    let schedule: ValidatedSchedule =
        validate_schedule(request.pickup_at, request.return_at, ctx.now, &ctx.limits)
            .map_err(DomainError::Schedule)?;

    let booking: Booking = Booking::new(
        request.renter_id,
        request.assignment,
        &schedule,
        request.daily_rate,
        ctx.now,
        &actor.id,
    )?;

    let action: Action = Action::new(
        String::from("CreateBooking"),
        Some(format!(
            "Opened booking for renter {} ({} days)",
            booking.renter_id, schedule.rental_days
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        None,
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("status=none")),
        StateSnapshot::of_booking(&booking),
    );

    Ok(OpeningResult {
        booking,
        audit_event,
    })
}

/// Applies a command to a booking, producing the next booking and an audit event.
///
/// The input booking is not modified. The presented version is checked
/// before anything else; the store checks it again when committing.
///
/// # Arguments
///
/// * `booking` - The booking as last loaded
/// * `command` - The command to apply
/// * `ctx` - Clock and limits
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The presented version is stale
/// - The command violates the field policy, override gate or transition table
/// - A new schedule is rejected
pub fn apply(
    booking: &Booking,
    command: Command,
    ctx: &ApplyContext,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    ensure_version(booking, command.expected_version())?;
    let origin: Option<BookingStatus> = booking.renter_confirmation_origin();
    let name: &'static str = command.name();

    match command {
        Command::UpdateFields {
            patch, model_rate, ..
        } => update_fields(booking, &patch, model_rate, ctx, actor, cause),
        Command::ForceStatus { target, .. } => {
            validate_override(booking.status, target, origin)?;
            let action: Action = Action::new(
                String::from(name),
                Some(format!("Forced {} -> {target}", booking.status)),
            );
            commit_status(booking, target, ctx, actor, cause, action)
        }
        Command::Cancel { reason, .. } => {
            validate_transition(
                booking.status,
                BookingStatus::Cancelled,
                TransitionTrigger::Cancellation,
                None,
            )?;
            let action: Action = Action::new(String::from(name), Some(reason));
            commit_status(booking, BookingStatus::Cancelled, ctx, actor, cause, action)
        }
        Command::MarkOverdue { .. } => {
            let target: BookingStatus = booking
                .overdue_target(ctx.now, &ctx.grace)
                .ok_or(CoreError::NotOverdue {
                    status: booking.status,
                })?;
            validate_transition(booking.status, target, TransitionTrigger::OverdueSweep, None)?;
            let action: Action = Action::new(
                String::from(name),
                Some(format!("Deadline passed in {}", booking.status)),
            );
            commit_status(booking, target, ctx, actor, cause, action)
        }
    }
}

/// Feeds an automated event to a booking.
///
/// Events carry no caller version. The transition is computed against the
/// booking as loaded, and the store's version check rejects it if another
/// actor committed in between.
///
/// # Errors
///
/// Returns an error if the event payload is invalid or repricing overflows.
pub fn apply_event(
    booking: &Booking,
    event: AutomatedEvent,
    ctx: &ApplyContext,
    actor: Actor,
    cause: Cause,
) -> Result<EventOutcome, CoreError> {
    let origin: Option<BookingStatus> = booking.renter_confirmation_origin();
    let Some(target) = event.target_for(booking.status, origin) else {
        return Ok(EventOutcome::Ignored {
            event: event.name(),
            status: booking.status,
        });
    };
    validate_transition(
        booking.status,
        target,
        TransitionTrigger::AutomatedEvent,
        origin,
    )?;

    let mut staged: Booking = booking.clone();
    match event {
        AutomatedEvent::VehicleReturned { returned_at } => {
            staged.actual_return_at = Some(returned_at);
        }
        AutomatedEvent::InspectionCompleted {
            extra_fees: Some(fees),
        } if booking.status == BookingStatus::VehicleReturned => {
            staged.pricing.extra_fees = fees.ensure_non_negative("extra_fees")?;
        }
        _ => {}
    }

    let action: Action = Action::new(
        String::from(event.name()),
        Some(format!("{} -> {target}", booking.status)),
    );
    let mut result: TransitionResult = commit_status(&staged, target, ctx, actor, cause, action)?;
    result.audit_event.before = StateSnapshot::of_booking(booking);
    Ok(EventOutcome::Applied(Box::new(result)))
}

fn ensure_version(booking: &Booking, expected: i64) -> Result<(), CoreError> {
    if booking.version != expected {
        return Err(CoreError::ConcurrentModification {
            booking_id: booking.booking_id,
            expected,
            actual: booking.version,
        });
    }
    Ok(())
}

/// Records a status change, reprices at pricing boundaries and bumps the version.
fn commit_status(
    booking: &Booking,
    target: BookingStatus,
    ctx: &ApplyContext,
    actor: Actor,
    cause: Cause,
    action: Action,
) -> Result<TransitionResult, CoreError> {
    let mut new_booking: Booking = booking.clone();
    new_booking.record_status(target, ctx.now, &actor.id);
    if target.is_pricing_boundary() {
        new_booking.reprice()?;
    }
    new_booking.version += 1;

    let status_change: Option<StatusChange> = new_booking.status_history.last().cloned();
    let audit_event: AuditEvent = AuditEvent::new(
        booking.booking_id,
        actor,
        cause,
        action,
        StateSnapshot::of_booking(booking),
        StateSnapshot::of_booking(&new_booking),
    );

    Ok(TransitionResult {
        new_booking,
        audit_event,
        status_change,
        previous_version: booking.version,
    })
}

fn update_fields(
    booking: &Booking,
    patch: &BookingPatch,
    model_rate: Option<Money>,
    ctx: &ApplyContext,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    check_patch(booking.status, patch)?;

    let mut new_booking: Booking = booking.clone();
    let mut needs_repricing: bool = false;

    if patch.touches_schedule() {
        let pickup_at: OffsetDateTime = patch
            .scheduled_pickup_at
            .unwrap_or(booking.scheduled_pickup_at);
        let return_at: OffsetDateTime = patch
            .scheduled_return_at
            .unwrap_or(booking.scheduled_return_at);
        // A moved pickup is a new window; a moved return alone is an extension.
        let schedule: ValidatedSchedule = if patch.scheduled_pickup_at.is_some() {
            validate_schedule(pickup_at, return_at, ctx.now, &ctx.limits)
        } else {
            validate_return_extension(pickup_at, return_at, &ctx.limits)
        }
        .map_err(DomainError::Schedule)?;

        new_booking.scheduled_pickup_at = schedule.pickup_at;
        new_booking.scheduled_return_at = schedule.return_at;
        needs_repricing = true;
    }

    if let Some(station_id) = &patch.station_id {
        new_booking.assignment.station_id = station_id.clone();
    }
    if let Some(unit_id) = &patch.vehicle_unit_id {
        new_booking.assignment.vehicle_unit_id = Some(unit_id.clone());
    }
    if let Some(model_id) = &patch.vehicle_model_id {
        new_booking.assignment.vehicle_model_id = model_id.clone();
    }
    if let Some(rate) = model_rate {
        new_booking.daily_rate = rate.ensure_non_negative("daily_rate")?;
        needs_repricing = true;
    }

    if needs_repricing {
        new_booking.reprice()?;
    }
    new_booking.version += 1;

    let fields: Vec<&'static str> = patch.fields().iter().map(BookingField::as_str).collect();
    let action: Action = Action::new(String::from("UpdateFields"), Some(fields.join(",")));
    let audit_event: AuditEvent = AuditEvent::new(
        booking.booking_id,
        actor,
        cause,
        action,
        StateSnapshot::of_booking(booking),
        StateSnapshot::of_booking(&new_booking),
    );

    Ok(TransitionResult {
        new_booking,
        audit_event,
        status_change: None,
        previous_version: booking.version,
    })
}
