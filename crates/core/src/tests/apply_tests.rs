// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    booking_in, create_system_actor, create_test_actor, create_test_booking, create_test_cause,
    test_ctx,
};
use crate::{ApplyContext, Command, CoreError, TransitionResult, apply};
use fleetbook_audit::Actor;
use fleetbook_domain::{
    Booking, BookingField, BookingPatch, BookingStatus, DomainError, Money, ScheduleError,
    VehicleModelId, VehicleUnitId,
};
use time::{Duration, OffsetDateTime};

fn force(booking: &Booking, target: BookingStatus) -> Result<TransitionResult, CoreError> {
    apply(
        booking,
        Command::ForceStatus {
            expected_version: booking.version,
            target,
        },
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    )
}

fn update(booking: &Booking, patch: BookingPatch) -> Result<TransitionResult, CoreError> {
    update_with_rate(booking, patch, None)
}

fn update_with_rate(
    booking: &Booking,
    patch: BookingPatch,
    model_rate: Option<Money>,
) -> Result<TransitionResult, CoreError> {
    apply(
        booking,
        Command::UpdateFields {
            expected_version: booking.version,
            patch,
            model_rate,
        },
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    )
}

fn cancel(booking: &Booking) -> Result<TransitionResult, CoreError> {
    apply(
        booking,
        Command::Cancel {
            expected_version: booking.version,
            reason: String::from("Renter changed plans"),
        },
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    )
}

fn model_patch() -> BookingPatch {
    BookingPatch {
        vehicle_model_id: Some(VehicleModelId::new("suv")),
        ..BookingPatch::default()
    }
}

#[test]
fn test_model_change_reprices_with_new_rate() {
    let booking: Booking = create_test_booking();

    let result: TransitionResult =
        update_with_rate(&booking, model_patch(), Some(Money::new(1_000_000))).unwrap();

    let updated: &Booking = &result.new_booking;
    assert_eq!(updated.assignment.vehicle_model_id, VehicleModelId::new("suv"));
    assert_eq!(updated.daily_rate, Money::new(1_000_000));
    assert_eq!(updated.pricing.rental_subtotal, Money::new(3_000_000));
    assert_eq!(updated.pricing.deposit, Money::new(900_000));
    assert_eq!(updated.version, 2);
    assert_eq!(result.previous_version, 1);
    assert_eq!(result.status_change, None);
    assert_eq!(updated.status_history.len(), 1);
    assert_eq!(result.audit_event.action.name, "UpdateFields");
    assert_eq!(
        result.audit_event.action.details,
        Some(String::from("vehicle_model_id"))
    );
}

#[test]
fn test_input_booking_is_not_modified() {
    let booking: Booking = create_test_booking();
    let before: Booking = booking.clone();

    let result = force(&booking, BookingStatus::PendingDepositConfirmation);
    assert!(result.is_ok());

    assert_eq!(booking, before);
}

#[test]
fn test_stale_version_is_rejected_early() {
    let booking: Booking = create_test_booking();

    let result = apply(
        &booking,
        Command::ForceStatus {
            expected_version: 7,
            target: BookingStatus::PendingDepositConfirmation,
        },
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    );

    assert_eq!(
        result,
        Err(CoreError::ConcurrentModification {
            booking_id: booking.booking_id,
            expected: 7,
            actual: 1,
        })
    );
}

#[test]
fn test_concurrent_force_requests_second_loses() {
    let mut booking: Booking = create_test_booking();
    for unit in ["51A-000.01", "51A-000.02"] {
        let patch: BookingPatch = BookingPatch {
            vehicle_unit_id: Some(VehicleUnitId::new(unit)),
            ..BookingPatch::default()
        };
        booking = update(&booking, patch).unwrap().new_booking;
    }
    assert_eq!(booking.version, 3);

    let command: Command = Command::ForceStatus {
        expected_version: 3,
        target: BookingStatus::PendingDepositConfirmation,
    };

    let first: TransitionResult = apply(
        &booking,
        command.clone(),
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(first.new_booking.version, 4);

    let second = apply(
        &first.new_booking,
        command,
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    );
    assert!(matches!(
        second,
        Err(CoreError::ConcurrentModification {
            expected: 3,
            actual: 4,
            ..
        })
    ));
}

#[test]
fn test_force_status_appends_history_and_bumps_version() {
    let booking: Booking = create_test_booking();

    let result: TransitionResult = force(&booking, BookingStatus::PendingDepositConfirmation).unwrap();

    assert_eq!(
        result.new_booking.status,
        BookingStatus::PendingDepositConfirmation
    );
    assert_eq!(result.new_booking.version, 2);
    assert_eq!(result.new_booking.status_history.len(), 2);
    let change = result.status_change.unwrap();
    assert_eq!(change.status, BookingStatus::PendingDepositConfirmation);
    assert_eq!(change.changed_by, "staff-123");
    assert_eq!(result.audit_event.action.name, "ForceStatus");
    assert_eq!(result.audit_event.booking_id, booking.booking_id);
}

#[test]
fn test_force_to_overdue_state_not_permitted() {
    let booking: Booking = booking_in(BookingStatus::PendingVehiclePickup);

    let result = force(&booking, BookingStatus::VehiclePickupOverdue);
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::OverrideNotPermitted {
            status: BookingStatus::VehiclePickupOverdue,
        }))
    );
}

#[test]
fn test_force_to_non_successor_is_illegal() {
    let booking: Booking = create_test_booking();

    let result = force(&booking, BookingStatus::CurrentlyRenting);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::IllegalTransition {
            from: BookingStatus::PendingDepositPayment,
            to: BookingStatus::CurrentlyRenting,
        }))
    ));
}

#[test]
fn test_cancel_before_pickup() {
    let booking: Booking = booking_in(BookingStatus::PendingContractSigning);

    let result: TransitionResult = cancel(&booking).unwrap();

    assert_eq!(result.new_booking.status, BookingStatus::Cancelled);
    assert_eq!(
        result.new_booking.status_history.len(),
        booking.status_history.len() + 1
    );
    assert_eq!(result.audit_event.action.name, "CancelBooking");
    assert_eq!(
        result.audit_event.action.details,
        Some(String::from("Renter changed plans"))
    );
}

#[test]
fn test_cancel_while_renting_is_illegal() {
    let booking: Booking = booking_in(BookingStatus::VehicleInspectedBeforePickup);
    let renting: Booking = force(&booking, BookingStatus::CurrentlyRenting)
        .unwrap()
        .new_booking;

    let result = cancel(&renting);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::IllegalTransition {
            to: BookingStatus::Cancelled,
            ..
        }))
    ));
}

#[test]
fn test_cancelled_booking_rejects_every_mutation() {
    let cancelled: Booking = cancel(&create_test_booking()).unwrap().new_booking;

    let result = update(&cancelled, model_patch());
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::FieldLocked {
            field: BookingField::VehicleModelId,
            status: BookingStatus::Cancelled,
        }))
    ));

    let result = force(&cancelled, BookingStatus::PendingDepositConfirmation);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::IllegalTransition { .. }
        ))
    ));

    let result = cancel(&cancelled);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::IllegalTransition { .. }
        ))
    ));
}

#[test]
fn test_empty_patch_is_rejected() {
    let booking: Booking = create_test_booking();
    let result = update(&booking, BookingPatch::default());
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::EmptyPatch))
    );
}

#[test]
fn test_moving_pickup_revalidates_whole_window() {
    let booking: Booking = create_test_booking();
    let patch: BookingPatch = BookingPatch {
        scheduled_pickup_at: Some(test_ctx().now - Duration::minutes(1)),
        ..BookingPatch::default()
    };

    let result = update(&booking, patch);
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::Schedule(
            ScheduleError::PickupInPast
        )))
    );
}

#[test]
fn test_return_extension_while_renting_reprices() {
    let booking: Booking = booking_in(BookingStatus::VehicleInspectedBeforePickup);
    let renting: Booking = force(&booking, BookingStatus::CurrentlyRenting)
        .unwrap()
        .new_booking;
    let new_return: OffsetDateTime = renting.scheduled_return_at + Duration::days(1);
    let patch: BookingPatch = BookingPatch {
        scheduled_return_at: Some(new_return),
        ..BookingPatch::default()
    };

    let result: TransitionResult = update(&renting, patch).unwrap();

    assert_eq!(result.new_booking.scheduled_return_at, new_return);
    assert_eq!(result.new_booking.rental_days(), 4);
    assert_eq!(
        result.new_booking.pricing.rental_subtotal,
        Money::new(3_600_000)
    );
    assert_eq!(result.new_booking.pricing.deposit, Money::new(1_080_000));
}

#[test]
fn test_pickup_locked_while_renting() {
    let booking: Booking = booking_in(BookingStatus::VehicleInspectedBeforePickup);
    let renting: Booking = force(&booking, BookingStatus::CurrentlyRenting)
        .unwrap()
        .new_booking;
    let patch: BookingPatch = BookingPatch {
        scheduled_pickup_at: Some(renting.scheduled_pickup_at + Duration::hours(1)),
        ..BookingPatch::default()
    };

    let result = update(&renting, patch);
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::FieldLocked {
            field: BookingField::ScheduledPickupAt,
            status: BookingStatus::CurrentlyRenting,
        }))
    ));
}

#[test]
fn test_mark_overdue_after_pickup_deadline() {
    let booking: Booking = booking_in(BookingStatus::PendingVehiclePickup);
    let ctx: ApplyContext =
        ApplyContext::at(booking.scheduled_pickup_at + Duration::minutes(31));

    let result: TransitionResult = apply(
        &booking,
        Command::MarkOverdue {
            expected_version: booking.version,
        },
        &ctx,
        Actor::overdue_sweep(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.new_booking.status, BookingStatus::VehiclePickupOverdue);
    assert_eq!(result.audit_event.actor.id, "overdue-sweep");
}

#[test]
fn test_mark_overdue_before_deadline_is_rejected() {
    let booking: Booking = booking_in(BookingStatus::PendingVehiclePickup);

    let result = apply(
        &booking,
        Command::MarkOverdue {
            expected_version: booking.version,
        },
        &test_ctx(),
        create_system_actor(),
        create_test_cause(),
    );

    assert_eq!(
        result,
        Err(CoreError::NotOverdue {
            status: BookingStatus::PendingVehiclePickup,
        })
    );
}
