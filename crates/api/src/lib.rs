// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the fleetbook booking orchestrator.
//!
//! Handlers translate requests into core commands, consult the fleet
//! catalog, commit through the store and emit status notifications.
//! Errors from inner layers are translated into `ApiError` explicitly.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod catalog;
mod config;
mod error;
mod handlers;
mod notify;
mod request_response;
mod sweep;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use capabilities::{BookingCapabilities, Capability, compute_booking_capabilities};
pub use catalog::{FleetCatalog, FleetModel, FleetUnit, InMemoryFleet};
pub use config::OrchestratorConfig;
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    ApiResult, Orchestrator, cancel_booking, create_booking, force_status, get_audit_trail,
    get_booking, get_booking_policy, get_status_history, handle_automated_event, update_booking,
};
pub use notify::{NoopNotifier, StatusNotification, StatusNotifier};
pub use request_response::{
    AutomatedEventRequest, BookingPolicyResponse, BookingResponse, CancelBookingRequest,
    CreateBookingRequest, EventResponse, ForceStatusRequest, StatusHistoryResponse,
    UpdateBookingRequest,
};
pub use sweep::{
    SWEEP_STATUSES, SweepReport, collect_overdue_candidates, mark_overdue,
    process_overdue_candidates, run_overdue_sweep, sweep_candidate,
};
