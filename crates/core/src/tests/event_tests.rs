// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    apply_event_ok, booking_in, create_system_actor, create_test_actor, create_test_booking,
    create_test_cause, test_ctx, test_now,
};
use crate::{AutomatedEvent, Command, CoreError, EventOutcome, apply, apply_event};
use fleetbook_domain::{Booking, BookingStatus, DomainError, Money};
use time::{Duration, OffsetDateTime};

fn force(booking: &Booking, target: BookingStatus) -> Booking {
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
    .unwrap()
    .new_booking
}

fn renting() -> Booking {
    force(
        &booking_in(BookingStatus::VehicleInspectedBeforePickup),
        BookingStatus::CurrentlyRenting,
    )
}

fn returned_at() -> OffsetDateTime {
    test_now() + Duration::days(4)
}

fn returned() -> Booking {
    apply_event_ok(
        &renting(),
        AutomatedEvent::VehicleReturned {
            returned_at: returned_at(),
        },
    )
}

#[test]
fn test_event_in_wrong_status_is_ignored() {
    let booking: Booking = create_test_booking();

    let outcome: EventOutcome = apply_event(
        &booking,
        AutomatedEvent::ContractSigned,
        &test_ctx(),
        create_system_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Ignored {
            event: "ContractSigned",
            status: BookingStatus::PendingDepositPayment,
        }
    );
}

#[test]
fn test_duplicate_event_is_ignored() {
    let booking: Booking = apply_event_ok(&create_test_booking(), AutomatedEvent::DepositConfirmed);

    let outcome: EventOutcome = apply_event(
        &booking,
        AutomatedEvent::DepositConfirmed,
        &test_ctx(),
        create_system_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert!(matches!(outcome, EventOutcome::Ignored { .. }));
}

#[test]
fn test_events_on_terminal_booking_are_ignored() {
    let booking: Booking = apply(
        &create_test_booking(),
        Command::Cancel {
            expected_version: 1,
            reason: String::from("duplicate booking"),
        },
        &test_ctx(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_booking;

    for event in [
        AutomatedEvent::DepositConfirmed,
        AutomatedEvent::PaymentConfirmed,
        AutomatedEvent::RenterConfirmed,
        AutomatedEvent::FinalChargeIssued,
    ] {
        let outcome: EventOutcome = apply_event(
            &booking,
            event,
            &test_ctx(),
            create_system_actor(),
            create_test_cause(),
        )
        .unwrap();
        assert!(matches!(
            outcome,
            EventOutcome::Ignored {
                status: BookingStatus::Cancelled,
                ..
            }
        ));
    }
}

#[test]
fn test_applied_event_records_audit_and_history() {
    let booking: Booking = create_test_booking();

    let outcome: EventOutcome = apply_event(
        &booking,
        AutomatedEvent::DepositConfirmed,
        &test_ctx(),
        create_system_actor(),
        create_test_cause(),
    )
    .unwrap();

    let EventOutcome::Applied(result) = outcome else {
        panic!("expected the event to apply");
    };
    assert_eq!(
        result.new_booking.status,
        BookingStatus::PendingDepositConfirmation
    );
    assert_eq!(result.previous_version, 1);
    assert_eq!(result.new_booking.version, 2);
    assert_eq!(result.audit_event.action.name, "DepositConfirmed");
    assert_eq!(result.audit_event.actor.id, "payments");
    assert!(
        result
            .audit_event
            .before
            .data
            .starts_with("status=Pending_Deposit_Payment")
    );
}

#[test]
fn test_vehicle_returned_sets_actual_return_and_reprices() {
    let booking: Booking = returned();

    assert_eq!(booking.status, BookingStatus::VehicleReturned);
    assert_eq!(booking.actual_return_at, Some(returned_at()));
    assert_eq!(booking.pricing.extra_fees, Money::ZERO);
    assert_eq!(booking.pricing.total_payable, Money::new(2_700_000));
}

#[test]
fn test_post_return_inspection_applies_extra_fees() {
    let booking: Booking = apply_event_ok(
        &returned(),
        AutomatedEvent::InspectionCompleted {
            extra_fees: Some(Money::new(100_000)),
        },
    );

    assert_eq!(booking.status, BookingStatus::VehicleInspectedAfterPickup);
    assert_eq!(booking.pricing.rental_subtotal, Money::new(2_700_000));
    assert_eq!(booking.pricing.deposit, Money::new(810_000));
    assert_eq!(booking.pricing.extra_fees, Money::new(100_000));
    assert_eq!(booking.pricing.total_payable, Money::new(2_800_000));
}

#[test]
fn test_negative_extra_fees_rejected() {
    let result = apply_event(
        &returned(),
        AutomatedEvent::InspectionCompleted {
            extra_fees: Some(Money::new(-1)),
        },
        &test_ctx(),
        create_system_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::NegativeAmount { .. }))
    ));
}

#[test]
fn test_renter_confirmation_round_trip_before_pickup() {
    let inspected: Booking = booking_in(BookingStatus::VehicleInspectedBeforePickup);

    let pending: Booking = apply_event_ok(&inspected, AutomatedEvent::RenterConfirmationRequested);
    assert_eq!(pending.status, BookingStatus::PendingRenterConfirmation);
    assert_eq!(
        pending.renter_confirmation_origin(),
        Some(BookingStatus::VehicleInspectedBeforePickup)
    );

    let confirmed: Booking = apply_event_ok(&pending, AutomatedEvent::RenterConfirmed);
    assert_eq!(confirmed.status, BookingStatus::CurrentlyRenting);
}

#[test]
fn test_renter_confirmation_round_trip_after_return() {
    let inspected: Booking = apply_event_ok(
        &returned(),
        AutomatedEvent::InspectionCompleted { extra_fees: None },
    );

    let pending: Booking = apply_event_ok(&inspected, AutomatedEvent::RenterConfirmationRequested);
    let confirmed: Booking = apply_event_ok(&pending, AutomatedEvent::RenterConfirmed);

    assert_eq!(confirmed.status, BookingStatus::PendingTotalPayment);
}

#[test]
fn test_overdue_bookings_resume_through_events() {
    let waiting: Booking = booking_in(BookingStatus::PendingVehiclePickup);
    let ctx = crate::ApplyContext::at(waiting.scheduled_pickup_at + Duration::hours(1));
    let overdue: Booking = apply(
        &waiting,
        Command::MarkOverdue {
            expected_version: waiting.version,
        },
        &ctx,
        create_system_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_booking;
    assert_eq!(overdue.status, BookingStatus::VehiclePickupOverdue);

    let inspected: Booking = apply_event_ok(
        &overdue,
        AutomatedEvent::InspectionCompleted { extra_fees: None },
    );
    assert_eq!(inspected.status, BookingStatus::VehicleInspectedBeforePickup);
}

#[test]
fn test_final_charge_reaches_total_fees_charged() {
    let inspected: Booking = apply_event_ok(
        &returned(),
        AutomatedEvent::InspectionCompleted {
            extra_fees: Some(Money::new(50_000)),
        },
    );
    let billing: Booking = force(&inspected, BookingStatus::PendingTotalPayment);

    let charged: Booking = apply_event_ok(&billing, AutomatedEvent::FinalChargeIssued);

    assert_eq!(charged.status, BookingStatus::TotalFeesCharged);
    assert_eq!(charged.pricing.total_payable, Money::new(2_750_000));
}

#[test]
fn test_event_name_and_unmatched_target() {
    let event: AutomatedEvent = AutomatedEvent::InspectionCompleted {
        extra_fees: Some(Money::new(5)),
    };
    assert_eq!(event.name(), "InspectionCompleted");
    assert_eq!(
        AutomatedEvent::InspectionCompleted { extra_fees: None }.target_for(
            BookingStatus::CurrentlyRenting,
            None
        ),
        None
    );
}
