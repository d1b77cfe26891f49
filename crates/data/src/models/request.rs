//! Service requests, the central workflow entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use servicelane_core::{Money, RequestStatus, ServiceRequestId, ShopId, UserId, VehicleId};

use crate::repository::Entity;

/// A client's request for work on one of their vehicles.
///
/// Only persisted columns live here; display projections (client name,
/// vehicle info, service description) belong to
/// [`crate::models::RequestView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ServiceRequestId>,
    pub client_id: UserId,
    pub vehicle_id: VehicleId,
    pub shop_id: ShopId,
    /// Assigned when a mechanic accepts the request.
    pub mechanic_id: Option<UserId>,
    /// Absent on rows created before status tracking; reported as "Unknown".
    #[serde(default)]
    pub status: Option<RequestStatus>,
    pub total_price_estimated: Money,
    /// Set once the final invoice amount is known.
    pub total_price_final: Option<Money>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ServiceRequest {
    type Id = ServiceRequestId;
    const COLLECTION: &'static str = "service_requests";

    fn id(&self) -> Option<ServiceRequestId> {
        self.id
    }
}
