//! Service request operations and the lifecycle workflow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use servicelane_core::{
    PaymentStatus, RequestAction, RequestStatus, ServiceRequestId, ShopId, UserId, UserRole,
};

use crate::models::{
    MechanicShop, Payment, RequestItem, RequestView, ServiceOffering, ServiceRequest, User,
    Vehicle, view,
};
use crate::repository::{FilterOp, Repository};
use crate::transport::Transport;

use super::ServiceError;

/// Facade over the `service_requests` collection plus the lifecycle rules
/// that govern it.
#[derive(Clone)]
pub struct RequestService {
    repo: Repository<ServiceRequest>,
    users: Repository<User>,
    vehicles: Repository<Vehicle>,
    shops: Repository<MechanicShop>,
    items: Repository<RequestItem>,
    offerings: Repository<ServiceOffering>,
    payments: Repository<Payment>,
}

impl RequestService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
            users: Repository::new(Arc::clone(transport)),
            vehicles: Repository::new(Arc::clone(transport)),
            shops: Repository::new(Arc::clone(transport)),
            items: Repository::new(Arc::clone(transport)),
            offerings: Repository::new(Arc::clone(transport)),
            payments: Repository::new(Arc::clone(transport)),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetch a request by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn get(&self, id: ServiceRequestId) -> Result<Option<ServiceRequest>, ServiceError> {
        Ok(self.repo.get(id).await?)
    }

    /// Fetch every request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all(&self) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    /// Every request submitted by a client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_client(&self, client_id: UserId) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.repo.find_by("client_id", client_id).await?)
    }

    /// Every request assigned to a mechanic.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_mechanic(
        &self,
        mechanic_id: UserId,
    ) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.repo.find_by("mechanic_id", mechanic_id).await?)
    }

    /// Every request routed to a shop.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_shop(&self, shop_id: ShopId) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.repo.find_by("shop_id", shop_id).await?)
    }

    /// Every request in the given status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.repo.find_by("status", status).await?)
    }

    /// Requests awaiting triage.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn pending(&self) -> Result<Vec<ServiceRequest>, ServiceError> {
        self.by_status(RequestStatus::Pending).await
    }

    /// Requests currently being worked on.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn in_progress(&self) -> Result<Vec<ServiceRequest>, ServiceError> {
        self.by_status(RequestStatus::InProgress).await
    }

    /// Requests whose work is done.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn completed(&self) -> Result<Vec<ServiceRequest>, ServiceError> {
        self.by_status(RequestStatus::Completed).await
    }

    /// Requests created within the inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.repo.get_by_range("created_at", start, end).await?)
    }

    /// The most recently created requests, newest first.
    ///
    /// Fetches the whole collection ordered by creation date and slices off
    /// the top; costs O(collection size) per call.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ServiceRequest>, ServiceError> {
        let mut requests = self
            .repo
            .filter_and_order("id", FilterOp::Gte, 0_i64, "created_at", false)
            .await?;
        requests.truncate(limit);
        Ok(requests)
    }

    /// Join requests with their display data.
    ///
    /// Fetches the referent collections once and performs the join in
    /// memory; missing referents degrade to "Unknown" labels.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if any referent fetch fails.
    pub async fn enrich(
        &self,
        requests: &[ServiceRequest],
    ) -> Result<Vec<RequestView>, ServiceError> {
        let users = self.users.get_all().await?;
        let vehicles = self.vehicles.get_all().await?;
        let items = self.items.get_all().await?;
        let offerings = self.offerings.get_all().await?;

        Ok(view::enrich(requests, &users, &vehicles, &items, &offerings))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Submit a new request on behalf of a client.
    ///
    /// Verifies that the client, vehicle, and shop referents exist, then
    /// persists the request in Pending status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::MissingReference` naming the absent referent.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn submit(&self, mut request: ServiceRequest) -> Result<ServiceRequest, ServiceError> {
        if self.users.get(request.client_id).await?.is_none() {
            return Err(ServiceError::MissingReference("client"));
        }
        if self.vehicles.get(request.vehicle_id).await?.is_none() {
            return Err(ServiceError::MissingReference("vehicle"));
        }
        if self.shops.get(request.shop_id).await?.is_none() {
            return Err(ServiceError::MissingReference("mechanic shop"));
        }

        request.status = Some(RequestStatus::Pending);
        Ok(self.repo.create(&request).await?)
    }

    /// Assign a mechanic to a pending request.
    ///
    /// Two explicit effects of one operation: the mechanic reference is set
    /// and the request moves to In Progress.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the request is absent,
    /// `ServiceError::MissingReference` if the mechanic is absent or not a
    /// mechanic, and `ServiceError::InvalidTransition` if the request is not
    /// Pending.
    #[instrument(skip(self))]
    pub async fn assign_mechanic(
        &self,
        request_id: ServiceRequestId,
        mechanic_id: UserId,
    ) -> Result<ServiceRequest, ServiceError> {
        let mut request = self.load(request_id).await?;
        let next = require_transition(&request, RequestAction::Accept)?;

        let mechanic = self
            .users
            .get(mechanic_id)
            .await?
            .filter(|user| user.role == UserRole::Mechanic)
            .ok_or(ServiceError::MissingReference("mechanic"))?;

        request.mechanic_id = mechanic.id;
        request.status = Some(next);
        Ok(self.repo.update(request_id, &request).await?)
    }

    /// Reject a pending request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the request is absent, or
    /// `ServiceError::InvalidTransition` if it is not Pending.
    #[instrument(skip(self))]
    pub async fn reject(&self, request_id: ServiceRequestId) -> Result<ServiceRequest, ServiceError> {
        self.apply(request_id, RequestAction::Reject).await
    }

    /// Complete an in-progress request.
    ///
    /// On success a payment is raised for the estimated total in Pending
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the request is absent, or
    /// `ServiceError::InvalidTransition` if it is not In Progress.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<ServiceRequest, ServiceError> {
        let request = self.apply(request_id, RequestAction::Complete).await?;

        let payment = Payment {
            id: None,
            service_request_id: request_id,
            amount: request.total_price_estimated,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };
        self.payments.create(&payment).await?;

        Ok(request)
    }

    /// Cancel a request from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the request is absent, or
    /// `ServiceError::InvalidTransition` if it already reached a terminal
    /// state.
    #[instrument(skip(self))]
    pub async fn cancel(&self, request_id: ServiceRequestId) -> Result<ServiceRequest, ServiceError> {
        self.apply(request_id, RequestAction::Cancel).await
    }

    /// Move a request directly to `status`, validating the transition.
    ///
    /// Only edges in the lifecycle table are accepted; anything else fails
    /// rather than silently overwriting the stored status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the request is absent, or
    /// `ServiceError::InvalidTransition` if no lifecycle action leads from
    /// the current status to `status`.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        request_id: ServiceRequestId,
        status: RequestStatus,
    ) -> Result<ServiceRequest, ServiceError> {
        let mut request = self.load(request_id).await?;

        let current = request.status;
        let action = current
            .and_then(|current| action_to(current, status))
            .ok_or_else(|| ServiceError::InvalidTransition {
                status: status_label(current),
                action: format!("set status to {status}"),
            })?;

        if action == RequestAction::Complete {
            return self.complete(request_id).await;
        }

        request.status = Some(status);
        Ok(self.repo.update(request_id, &request).await?)
    }

    async fn apply(
        &self,
        request_id: ServiceRequestId,
        action: RequestAction,
    ) -> Result<ServiceRequest, ServiceError> {
        let mut request = self.load(request_id).await?;
        let next = require_transition(&request, action)?;

        request.status = Some(next);
        Ok(self.repo.update(request_id, &request).await?)
    }

    async fn load(&self, request_id: ServiceRequestId) -> Result<ServiceRequest, ServiceError> {
        self.repo
            .get(request_id)
            .await?
            .ok_or(ServiceError::NotFound("service request"))
    }
}

/// Validate an action against the request's current status, returning the
/// status it leads to.
fn require_transition(
    request: &ServiceRequest,
    action: RequestAction,
) -> Result<RequestStatus, ServiceError> {
    let Some(current) = request.status else {
        return Err(ServiceError::InvalidTransition {
            status: status_label(None),
            action: action.to_string(),
        });
    };

    current
        .transition(action)
        .ok_or_else(|| ServiceError::InvalidTransition {
            status: current.to_string(),
            action: action.to_string(),
        })
}

/// The lifecycle action that moves `current` to `target`, if one exists.
fn action_to(current: RequestStatus, target: RequestStatus) -> Option<RequestAction> {
    [
        RequestAction::Accept,
        RequestAction::Reject,
        RequestAction::Complete,
        RequestAction::Cancel,
    ]
    .into_iter()
    .find(|action| current.transition(*action) == Some(target))
}

fn status_label(status: Option<RequestStatus>) -> String {
    status.map_or_else(|| "Unknown".to_owned(), |status| status.to_string())
}
