// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write paths. Every function here runs inside a caller-owned
//! transaction or opens its own.

pub mod audit;
pub mod booking;

pub use audit::persist_audit_event;
pub use booking::{commit_transition, insert_booking};
