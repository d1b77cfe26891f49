//! Payment operations.

use std::sync::Arc;

use tracing::instrument;

use servicelane_core::{PaymentId, PaymentStatus, ServiceRequestId};

use crate::models::Payment;
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Facade over the `payments` collection.
///
/// Payments are raised by [`super::RequestService::complete`]; this service
/// reads them back and settles them.
#[derive(Clone)]
pub struct PaymentService {
    repo: Repository<Payment>,
}

impl PaymentService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
        }
    }

    /// Fetch a payment by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, ServiceError> {
        Ok(self.repo.get(id).await?)
    }

    /// Every payment, regardless of status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all(&self) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    /// Every settled payment; the reporting engine's revenue input.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn completed(&self) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.repo.find_by("status", PaymentStatus::Completed).await?)
    }

    /// Every payment raised for a request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_request(
        &self,
        request_id: ServiceRequestId,
    ) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.repo.find_by("service_request_id", request_id).await?)
    }

    /// Mark a pending payment as settled.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the payment is absent, or
    /// `ServiceError::InvalidTransition` if it is not Pending.
    #[instrument(skip(self))]
    pub async fn mark_completed(&self, id: PaymentId) -> Result<Payment, ServiceError> {
        self.settle(id, PaymentStatus::Completed, "complete payment").await
    }

    /// Mark a pending payment as failed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the payment is absent, or
    /// `ServiceError::InvalidTransition` if it is not Pending.
    #[instrument(skip(self))]
    pub async fn mark_failed(&self, id: PaymentId) -> Result<Payment, ServiceError> {
        self.settle(id, PaymentStatus::Failed, "fail payment").await
    }

    async fn settle(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        action: &str,
    ) -> Result<Payment, ServiceError> {
        let mut payment = self
            .repo
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("payment"))?;

        if payment.status != PaymentStatus::Pending {
            return Err(ServiceError::InvalidTransition {
                status: payment.status.to_string(),
                action: action.to_owned(),
            });
        }

        payment.status = status;
        Ok(self.repo.update(id, &payment).await?)
    }
}
