//! Request line item operations.

use std::sync::Arc;

use tracing::instrument;

use servicelane_core::{RequestItemId, ServiceRequestId};

use crate::models::{RequestItem, ServiceRequest};
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Facade over the `service_request_items` collection.
#[derive(Clone)]
pub struct RequestItemService {
    repo: Repository<RequestItem>,
    requests: Repository<ServiceRequest>,
}

impl RequestItemService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
            requests: Repository::new(Arc::clone(transport)),
        }
    }

    /// Every line item on a request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_request(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<Vec<RequestItem>, ServiceError> {
        Ok(self.repo.find_by("service_request_id", request_id).await?)
    }

    /// Add a line item to an existing request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::MissingReference` if the parent request is
    /// absent.
    #[instrument(skip(self, item), fields(request_id = %item.service_request_id))]
    pub async fn add(&self, item: RequestItem) -> Result<RequestItem, ServiceError> {
        if self.requests.get(item.service_request_id).await?.is_none() {
            return Err(ServiceError::MissingReference("service request"));
        }

        Ok(self.repo.create(&item).await?)
    }

    /// Approve a proposed line item.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the item is absent.
    #[instrument(skip(self))]
    pub async fn approve(&self, id: RequestItemId) -> Result<RequestItem, ServiceError> {
        let mut item = self
            .repo
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("request item"))?;

        item.approved = true;
        Ok(self.repo.update(id, &item).await?)
    }
}
