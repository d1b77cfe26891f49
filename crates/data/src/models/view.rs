//! Display read model for service requests.
//!
//! The persisted [`ServiceRequest`] carries foreign keys only. Screens want
//! names: who the client is, which vehicle, what work was asked for. The
//! enrichment join here produces that projection from materialized entity
//! lists without touching the transport, so the domain entity never grows
//! display fields.

use std::collections::HashMap;

use servicelane_core::{OfferingId, ServiceRequestId, UserId, VehicleId};

use super::{RequestItem, ServiceOffering, ServiceRequest, User, Vehicle};

/// Fallback label when the client referent cannot be resolved.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

/// Fallback label when the vehicle referent cannot be resolved.
pub const UNKNOWN_VEHICLE: &str = "Unknown Vehicle";

/// A service request joined with its display data.
#[derive(Debug, Clone)]
pub struct RequestView {
    pub request: ServiceRequest,
    pub client_name: String,
    pub vehicle_info: String,
    /// Comma-joined offering names from the request's line items; `None`
    /// when the request has no items.
    pub service_description: Option<String>,
}

impl RequestView {
    /// Case-insensitive match against the display fields, used by the
    /// screens' live search boxes.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.client_name.to_lowercase().contains(&term)
            || self.vehicle_info.to_lowercase().contains(&term)
            || self
                .service_description
                .as_ref()
                .is_some_and(|description| description.to_lowercase().contains(&term))
    }
}

/// Join requests with their referents into display views.
///
/// Missing referents degrade to the `Unknown *` labels instead of failing;
/// reporting and screens must render even when the data is incomplete.
#[must_use]
pub fn enrich(
    requests: &[ServiceRequest],
    users: &[User],
    vehicles: &[Vehicle],
    items: &[RequestItem],
    offerings: &[ServiceOffering],
) -> Vec<RequestView> {
    let user_names: HashMap<UserId, &str> = users
        .iter()
        .filter_map(|user| user.id.map(|id| (id, user.full_name.as_str())))
        .collect();

    let vehicle_info: HashMap<VehicleId, String> = vehicles
        .iter()
        .filter_map(|vehicle| vehicle.id.map(|id| (id, vehicle.full_info())))
        .collect();

    let offering_names: HashMap<OfferingId, &str> = offerings
        .iter()
        .filter_map(|offering| offering.id.map(|id| (id, offering.name.as_str())))
        .collect();

    let mut descriptions: HashMap<ServiceRequestId, String> = HashMap::new();
    for item in items {
        let name = offering_names
            .get(&item.service_id)
            .copied()
            .map_or_else(|| format!("Service #{}", item.service_id), str::to_owned);
        descriptions
            .entry(item.service_request_id)
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(&name);
            })
            .or_insert(name);
    }

    requests
        .iter()
        .map(|request| {
            let client_name = user_names
                .get(&request.client_id)
                .copied()
                .unwrap_or(UNKNOWN_CLIENT)
                .to_owned();

            let vehicle = vehicle_info
                .get(&request.vehicle_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_VEHICLE.to_owned());

            let service_description = request.id.and_then(|id| descriptions.get(&id).cloned());

            RequestView {
                request: request.clone(),
                client_name,
                vehicle_info: vehicle,
                service_description,
            }
        })
        .collect()
}
