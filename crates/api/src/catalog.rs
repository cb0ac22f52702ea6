// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fleet catalog: the inventory collaborator.
//!
//! The orchestrator asks the catalog whether an assignment can be served
//! and what a model costs per day. The catalog owns vehicles; it knows
//! nothing about booking states.

use fleetbook_domain::{Money, StationId, VehicleAssignment, VehicleModelId, VehicleUnitId};
use serde::{Deserialize, Serialize};

/// Inventory and rate lookups consulted before any assignment change.
pub trait FleetCatalog: Send + Sync {
    /// Returns the daily rate of a model, or `None` if the model is unknown.
    fn daily_rate(&self, vehicle_model_id: &VehicleModelId) -> Option<Money>;

    /// Returns true if the station can supply the assignment.
    ///
    /// Without a specific unit, any in-service unit of the model at the
    /// station satisfies the check.
    fn is_available(&self, assignment: &VehicleAssignment) -> bool;
}

/// A model offered by the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetModel {
    pub vehicle_model_id: VehicleModelId,
    pub daily_rate: Money,
}

const fn in_service_default() -> bool {
    true
}

/// A physical vehicle parked at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetUnit {
    pub vehicle_unit_id: VehicleUnitId,
    pub vehicle_model_id: VehicleModelId,
    pub station_id: StationId,
    /// Units out of service are never offered.
    #[serde(default = "in_service_default")]
    pub in_service: bool,
}

/// A catalog held in memory, typically loaded from a JSON fleet file.
///
/// ```json
/// {
///   "models": [{ "vehicle_model_id": "compact-sedan", "daily_rate": 900000 }],
///   "units": [{ "vehicle_unit_id": "51A-123.45", "vehicle_model_id": "compact-sedan", "station_id": "downtown" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryFleet {
    #[serde(default)]
    pub models: Vec<FleetModel>,
    #[serde(default)]
    pub units: Vec<FleetUnit>,
}

impl InMemoryFleet {
    /// Parses a fleet description.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a fleet.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a model with its daily rate.
    #[must_use]
    pub fn with_model(mut self, vehicle_model_id: &str, daily_rate: Money) -> Self {
        self.models.push(FleetModel {
            vehicle_model_id: VehicleModelId::new(vehicle_model_id),
            daily_rate,
        });
        self
    }

    /// Adds an in-service unit of a model at a station.
    #[must_use]
    pub fn with_unit(mut self, vehicle_unit_id: &str, vehicle_model_id: &str, station_id: &str) -> Self {
        self.units.push(FleetUnit {
            vehicle_unit_id: VehicleUnitId::new(vehicle_unit_id),
            vehicle_model_id: VehicleModelId::new(vehicle_model_id),
            station_id: StationId::new(station_id),
            in_service: true,
        });
        self
    }
}

impl FleetCatalog for InMemoryFleet {
    fn daily_rate(&self, vehicle_model_id: &VehicleModelId) -> Option<Money> {
        self.models
            .iter()
            .find(|model| &model.vehicle_model_id == vehicle_model_id)
            .map(|model| model.daily_rate)
    }

    fn is_available(&self, assignment: &VehicleAssignment) -> bool {
        if self.daily_rate(&assignment.vehicle_model_id).is_none() {
            return false;
        }
        self.units.iter().any(|unit| {
            unit.in_service
                && unit.vehicle_model_id == assignment.vehicle_model_id
                && unit.station_id == assignment.station_id
                && assignment
                    .vehicle_unit_id
                    .as_ref()
                    .is_none_or(|wanted| wanted == &unit.vehicle_unit_id)
        })
    }
}
