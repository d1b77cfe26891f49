//! Payments raised for completed work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use servicelane_core::{Money, PaymentId, PaymentStatus, ServiceRequestId};

use crate::repository::Entity;

/// A payment raised when a service request reaches Completed.
///
/// Created with the request's estimated total and `Pending` status; the
/// payment collaborator later marks it Completed or Failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PaymentId>,
    pub service_request_id: ServiceRequestId,
    pub amount: Money,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for Payment {
    type Id = PaymentId;
    const COLLECTION: &'static str = "payments";

    fn id(&self) -> Option<PaymentId> {
        self.id
    }
}
