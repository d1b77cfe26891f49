//! Client vehicles.

use serde::{Deserialize, Serialize};

use servicelane_core::{UserId, VehicleId};

use crate::repository::Entity;

/// A vehicle registered to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<VehicleId>,
    pub client_id: UserId,
    pub make: String,
    pub model: String,
    pub year: i32,
    /// Unique across the collection; empty when the vehicle is unregistered.
    pub license_plate: String,
}

impl Vehicle {
    /// One-line display form, e.g. "2019 Toyota Corolla - ABC123".
    #[must_use]
    pub fn full_info(&self) -> String {
        format!(
            "{} {} {} - {}",
            self.year, self.make, self.model, self.license_plate
        )
    }
}

impl Entity for Vehicle {
    type Id = VehicleId;
    const COLLECTION: &'static str = "vehicles";

    fn id(&self) -> Option<VehicleId> {
        self.id
    }
}
