// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every mutation follows the same path: authorize, load the booking,
//! apply the command in the core, consult the fleet catalog if the
//! assignment changed, commit with the version check, then notify.

use fleetbook::{
    ApplyContext, Command, EventOutcome, NewBooking, OpeningResult, TransitionResult, apply,
    apply_event, open_booking,
};
use fleetbook_audit::{AuditEvent, Cause};
use fleetbook_domain::{
    Booking, BookingId, BookingStatus, DomainError, Money, RenterId, StationId, StatusChange,
    VehicleAssignment, VehicleModelId, VehicleUnitId, validate_schedule,
};
use fleetbook_persistence::{CommittedChange, Persistence};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::capabilities::compute_booking_capabilities;
use crate::catalog::FleetCatalog;
use crate::config::OrchestratorConfig;
use crate::error::{ApiError, translate_core_error, translate_domain_error, translate_persistence_error};
use crate::notify::{StatusNotification, StatusNotifier};
use crate::request_response::{
    AutomatedEventRequest, BookingPolicyResponse, BookingResponse, CancelBookingRequest,
    CreateBookingRequest, EventResponse, ForceStatusRequest, StatusHistoryResponse,
    UpdateBookingRequest,
};

/// The collaborators a mutation needs.
pub struct Orchestrator<'a> {
    /// The booking store.
    pub persistence: &'a mut Persistence,
    /// Inventory and rate lookups.
    pub catalog: &'a dyn FleetCatalog,
    /// Receives status-changed notifications.
    pub notifier: &'a dyn StatusNotifier,
    /// Limits, grace periods and sweep cadence.
    pub config: &'a OrchestratorConfig,
}

impl Orchestrator<'_> {
    fn load(&mut self, booking_id: BookingId) -> Result<Booking, ApiError> {
        self.persistence
            .get_booking(booking_id)
            .map_err(translate_persistence_error)
    }

    /// Commits a transition and, if the status moved, notifies.
    pub(crate) fn commit(
        &mut self,
        from: BookingStatus,
        result: &TransitionResult,
    ) -> Result<CommittedChange, ApiError> {
        let committed: CommittedChange = self
            .persistence
            .commit_transition(result)
            .map_err(translate_persistence_error)?;

        if result.status_change.is_some()
            && let Some(notification) = StatusNotification::for_transition(from, &committed.booking)
        {
            self.notifier.status_changed(&notification);
        }
        Ok(committed)
    }

    fn ensure_available(&self, assignment: &VehicleAssignment) -> Result<(), ApiError> {
        if self.catalog.is_available(assignment) {
            return Ok(());
        }
        Err(ApiError::InventoryUnavailable {
            vehicle_unit_id: assignment
                .vehicle_unit_id
                .as_ref()
                .map(|unit| unit.value().to_string()),
            message: format!(
                "No {} available at station {}",
                assignment.vehicle_unit_id.as_ref().map_or_else(
                    || assignment.vehicle_model_id.value().to_string(),
                    |unit| format!("unit {unit} of {}", assignment.vehicle_model_id),
                ),
                assignment.station_id
            ),
        })
    }
}

/// The result of an API operation that includes both the response and the audit event.
///
/// This ensures that successful API operations always produce an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult<T> {
    /// The API response.
    pub response: T,
    /// The audit event generated by this operation.
    pub audit_event: AuditEvent,
}

impl ApiResult<BookingResponse> {
    fn from_committed(committed: CommittedChange) -> Self {
        Self {
            response: BookingResponse::from(&committed.booking),
            audit_event: committed.audit_event,
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("must not be empty"),
        });
    }
    Ok(())
}

/// Opens a booking in `Pending_Deposit_Payment`.
///
/// The window is validated first, then the fleet is asked for the
/// assignment and the model's daily rate.
///
/// # Arguments
///
/// * `orchestrator` - Store, catalog, notifier and configuration
/// * `request` - The requested renter, assignment and window
/// * `authenticated_actor` - The caller
/// * `cause` - The cause or reason for this action
/// * `now` - The current time
///
/// # Errors
///
/// Returns an error if:
/// - The caller may not book for this renter
/// - An identifier is empty
/// - The window is rejected
/// - The fleet cannot supply the assignment
/// - The store fails
pub fn create_booking(
    orchestrator: &mut Orchestrator<'_>,
    request: CreateBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ApiResult<BookingResponse>, ApiError> {
    AuthorizationService::authorize_create_booking(authenticated_actor, &request.renter_id)?;
    require_non_empty("renter_id", &request.renter_id)?;
    require_non_empty("station_id", &request.station_id)?;
    require_non_empty("vehicle_model_id", &request.vehicle_model_id)?;

    let ctx: ApplyContext = orchestrator.config.context_at(now);
    validate_schedule(request.pickup_at, request.return_at, now, &ctx.limits)
        .map_err(|e| translate_domain_error(DomainError::Schedule(e)))?;

    let assignment: VehicleAssignment = VehicleAssignment {
        vehicle_model_id: VehicleModelId::new(&request.vehicle_model_id),
        vehicle_unit_id: request.vehicle_unit_id.as_deref().map(VehicleUnitId::new),
        station_id: StationId::new(&request.station_id),
    };
    orchestrator.ensure_available(&assignment)?;
    let daily_rate: Money = orchestrator
        .catalog
        .daily_rate(&assignment.vehicle_model_id)
        .ok_or_else(|| ApiError::InventoryUnavailable {
            vehicle_unit_id: request.vehicle_unit_id.clone(),
            message: format!("Model {} is not offered", assignment.vehicle_model_id),
        })?;

    let opening: OpeningResult = open_booking(
        NewBooking {
            renter_id: RenterId::new(&request.renter_id),
            assignment,
            pickup_at: request.pickup_at,
            return_at: request.return_at,
            daily_rate,
        },
        &ctx,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let committed: CommittedChange = orchestrator
        .persistence
        .insert_booking(&opening)
        .map_err(translate_persistence_error)?;

    info!(
        booking_id = ?committed.booking.booking_id,
        renter_id = %request.renter_id,
        total_payable = %committed.booking.pricing.total_payable,
        "Opened booking"
    );

    Ok(ApiResult::from_committed(committed))
}

/// Edits a booking's assignment or schedule.
///
/// Field updates bump the version but do not change status, so they
/// neither append history nor notify.
///
/// # Errors
///
/// Returns an error if:
/// - The booking does not exist or the caller may not edit it
/// - The presented version is stale
/// - A touched field is locked in the current status
/// - A new window is rejected
/// - The fleet cannot supply the new assignment
pub fn update_booking(
    orchestrator: &mut Orchestrator<'_>,
    booking_id: BookingId,
    request: UpdateBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ApiResult<BookingResponse>, ApiError> {
    let booking: Booking = orchestrator.load(booking_id)?;
    AuthorizationService::authorize_update_booking(authenticated_actor, &booking)?;

    let touches_assignment: bool = request.patch.touches_assignment();
    let model_rate: Option<Money> = request
        .patch
        .vehicle_model_id
        .as_ref()
        .and_then(|model| orchestrator.catalog.daily_rate(model));

    let result: TransitionResult = apply(
        &booking,
        Command::UpdateFields {
            expected_version: request.version,
            patch: request.patch,
            model_rate,
        },
        &orchestrator.config.context_at(now),
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    if touches_assignment {
        orchestrator.ensure_available(&result.new_booking.assignment)?;
    }

    let committed: CommittedChange = orchestrator.commit(booking.status, &result)?;
    info!(
        booking_id = booking_id.value(),
        version = committed.booking.version,
        "Updated booking fields"
    );
    Ok(ApiResult::from_committed(committed))
}

/// Forces a booking's status on behalf of staff.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not staff
/// - The booking does not exist
/// - The presented version is stale
/// - The target is not on the override allow-list or not the next status
pub fn force_status(
    orchestrator: &mut Orchestrator<'_>,
    booking_id: BookingId,
    request: ForceStatusRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ApiResult<BookingResponse>, ApiError> {
    AuthorizationService::authorize_force_status(authenticated_actor)?;
    let booking: Booking = orchestrator.load(booking_id)?;

    let result: TransitionResult = apply(
        &booking,
        Command::ForceStatus {
            expected_version: request.version,
            target: request.target_status,
        },
        &orchestrator.config.context_at(now),
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let committed: CommittedChange = orchestrator.commit(booking.status, &result)?;
    info!(
        booking_id = booking_id.value(),
        from = %booking.status,
        to = %committed.booking.status,
        actor_id = %authenticated_actor.id,
        "Forced booking status"
    );
    Ok(ApiResult::from_committed(committed))
}

/// Cancels a booking.
///
/// # Errors
///
/// Returns an error if:
/// - The booking does not exist or the caller may not cancel it
/// - The presented version is stale
/// - The booking is past the point where it can be cancelled
pub fn cancel_booking(
    orchestrator: &mut Orchestrator<'_>,
    booking_id: BookingId,
    request: CancelBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ApiResult<BookingResponse>, ApiError> {
    let booking: Booking = orchestrator.load(booking_id)?;
    AuthorizationService::authorize_cancel_booking(authenticated_actor, &booking)?;

    let result: TransitionResult = apply(
        &booking,
        Command::Cancel {
            expected_version: request.version,
            reason: request.reason,
        },
        &orchestrator.config.context_at(now),
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let committed: CommittedChange = orchestrator.commit(booking.status, &result)?;
    info!(
        booking_id = booking_id.value(),
        from = %booking.status,
        "Cancelled booking"
    );
    Ok(ApiResult::from_committed(committed))
}

/// Feeds an automated event to a booking.
///
/// An event that does not fit the booking's status is reported with
/// `applied: false` rather than as an error.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is a renter
/// - The booking does not exist
/// - The payload is invalid
/// - Another commit landed between load and commit
pub fn handle_automated_event(
    orchestrator: &mut Orchestrator<'_>,
    booking_id: BookingId,
    request: AutomatedEventRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<EventResponse, ApiError> {
    AuthorizationService::authorize_automated_event(authenticated_actor)?;
    let booking: Booking = orchestrator.load(booking_id)?;
    let event_name: &'static str = request.event.name();

    let outcome: EventOutcome = apply_event(
        &booking,
        request.event,
        &orchestrator.config.context_at(now),
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    match outcome {
        EventOutcome::Ignored { event, status } => {
            info!(
                booking_id = booking_id.value(),
                event,
                status = %status,
                "Ignored automated event"
            );
            Ok(EventResponse {
                applied: false,
                event: event.to_string(),
                booking: BookingResponse::from(&booking),
                message: format!("{event} does not apply while the booking is {status}"),
            })
        }
        EventOutcome::Applied(result) => {
            let committed: CommittedChange = orchestrator.commit(booking.status, &result)?;
            debug!(
                booking_id = booking_id.value(),
                event = event_name,
                to = %committed.booking.status,
                "Applied automated event"
            );
            Ok(EventResponse {
                applied: true,
                event: event_name.to_string(),
                message: format!("{} -> {}", booking.status, committed.booking.status),
                booking: BookingResponse::from(&committed.booking),
            })
        }
    }
}

/// Reads a booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the caller may not read it.
pub fn get_booking(
    persistence: &mut Persistence,
    booking_id: BookingId,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    let booking: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_read_booking(authenticated_actor, &booking)?;
    Ok(BookingResponse::from(&booking))
}

/// Reads a booking's status history, oldest first.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the caller may not read it.
pub fn get_status_history(
    persistence: &mut Persistence,
    booking_id: BookingId,
    authenticated_actor: &AuthenticatedActor,
) -> Result<StatusHistoryResponse, ApiError> {
    let booking: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_read_booking(authenticated_actor, &booking)?;
    let entries: Vec<StatusChange> = booking.status_history;
    Ok(StatusHistoryResponse {
        booking_id,
        entries,
    })
}

/// Reads what the caller may change on a booking in its current status.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the caller may not read it.
pub fn get_booking_policy(
    persistence: &mut Persistence,
    booking_id: BookingId,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingPolicyResponse, ApiError> {
    let booking: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_read_booking(authenticated_actor, &booking)?;
    Ok(BookingPolicyResponse {
        booking_id,
        status: booking.status,
        version: booking.version,
        capabilities: compute_booking_capabilities(authenticated_actor, &booking),
    })
}

/// Reads a booking's audit trail, oldest first.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the caller may not read it.
pub fn get_audit_trail(
    persistence: &mut Persistence,
    booking_id: BookingId,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<AuditEvent>, ApiError> {
    let booking: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_read_booking(authenticated_actor, &booking)?;
    persistence
        .get_audit_events(booking_id)
        .map_err(translate_persistence_error)
}
