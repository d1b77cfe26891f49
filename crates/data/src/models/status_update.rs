//! Status update audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use servicelane_core::{RequestStatus, ServiceRequestId, StatusUpdateId, UserId};

use crate::repository::Entity;

/// One entry in a service request's append-only audit trail.
///
/// Updates are only ever created, never edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<StatusUpdateId>,
    pub service_request_id: ServiceRequestId,
    /// The status being announced.
    pub status: RequestStatus,
    pub note: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Entity for ServiceStatusUpdate {
    type Id = StatusUpdateId;
    const COLLECTION: &'static str = "service_status_updates";

    fn id(&self) -> Option<StatusUpdateId> {
        self.id
    }
}
