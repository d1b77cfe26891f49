//! Status update audit trail operations.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use servicelane_core::{RequestStatus, ServiceRequestId, UserId};

use crate::models::{ServiceRequest, ServiceStatusUpdate, User};
use crate::repository::{FilterOp, Repository};
use crate::transport::Transport;

use super::ServiceError;

/// Facade over the `service_status_updates` collection.
///
/// The trail is append-only; there are no update or delete operations here.
#[derive(Clone)]
pub struct StatusUpdateService {
    repo: Repository<ServiceStatusUpdate>,
    requests: Repository<ServiceRequest>,
    users: Repository<User>,
}

impl StatusUpdateService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
            requests: Repository::new(Arc::clone(transport)),
            users: Repository::new(Arc::clone(transport)),
        }
    }

    /// Every update for a request, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_request(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<Vec<ServiceStatusUpdate>, ServiceError> {
        Ok(self
            .repo
            .filter_and_order("service_request_id", FilterOp::Eq, request_id, "created_at", false)
            .await?)
    }

    /// The most recent update for a request, if any.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn latest(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<Option<ServiceStatusUpdate>, ServiceError> {
        Ok(self.by_request(request_id).await?.into_iter().next())
    }

    /// Every update authored by a user.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_author(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ServiceStatusUpdate>, ServiceError> {
        Ok(self.repo.find_by("created_by", user_id).await?)
    }

    /// Append a status update to a request's trail.
    ///
    /// The parent request and the author must exist. The parent's current
    /// status is deliberately not consulted - the trail records what was
    /// announced, not what the lifecycle permits.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::MissingReference` naming the absent referent.
    #[instrument(skip(self, note))]
    pub async fn record(
        &self,
        request_id: ServiceRequestId,
        status: RequestStatus,
        note: Option<String>,
        created_by: UserId,
    ) -> Result<ServiceStatusUpdate, ServiceError> {
        if self.requests.get(request_id).await?.is_none() {
            return Err(ServiceError::MissingReference("service request"));
        }
        if self.users.get(created_by).await?.is_none() {
            return Err(ServiceError::MissingReference("author"));
        }

        let update = ServiceStatusUpdate {
            id: None,
            service_request_id: request_id,
            status,
            note,
            created_by,
            created_at: Utc::now(),
        };
        Ok(self.repo.create(&update).await?)
    }

    /// Case-insensitive search over update notes.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn search_notes(&self, term: &str) -> Result<Vec<ServiceStatusUpdate>, ServiceError> {
        Ok(self.repo.search("note", term).await?)
    }
}
