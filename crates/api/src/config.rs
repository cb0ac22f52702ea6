// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleetbook::ApplyContext;
use fleetbook_domain::{OverdueGrace, ScheduleLimits};
use time::{Duration, OffsetDateTime};

/// Tunable orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Rental window limits.
    pub limits: ScheduleLimits,
    /// Grace periods before a booking counts as overdue.
    pub grace: OverdueGrace,
    /// Time between overdue sweeps.
    pub sweep_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            limits: ScheduleLimits::default(),
            grace: OverdueGrace::default(),
            sweep_interval: Duration::seconds(60),
        }
    }
}

impl OrchestratorConfig {
    /// Sets the pickup and return grace periods in minutes.
    #[must_use]
    pub const fn with_grace_minutes(mut self, pickup: i64, return_: i64) -> Self {
        self.grace = OverdueGrace {
            pickup: Duration::minutes(pickup),
            return_: Duration::minutes(return_),
        };
        self
    }

    /// Sets the sweep interval in seconds.
    #[must_use]
    pub const fn with_sweep_interval_secs(mut self, seconds: i64) -> Self {
        self.sweep_interval = Duration::seconds(seconds);
        self
    }

    /// Builds the transition context for the given instant.
    #[must_use]
    pub const fn context_at(&self, now: OffsetDateTime) -> ApplyContext {
        ApplyContext {
            now,
            limits: self.limits,
            grace: self.grace,
        }
    }
}
