// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read paths.

pub mod audit;
pub mod booking;

pub use audit::get_audit_events;
pub use booking::{get_booking, get_status_history, list_bookings_in_statuses};
