//! Service catalog operations.

use std::sync::Arc;

use servicelane_core::OfferingId;

use crate::models::ServiceOffering;
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Facade over the `services` catalog collection.
#[derive(Clone)]
pub struct OfferingService {
    repo: Repository<ServiceOffering>,
}

impl OfferingService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
        }
    }

    /// Fetch an offering by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn get(&self, id: OfferingId) -> Result<Option<ServiceOffering>, ServiceError> {
        Ok(self.repo.get(id).await?)
    }

    /// The whole catalog, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all_by_name(&self) -> Result<Vec<ServiceOffering>, ServiceError> {
        Ok(self.repo.get_all_ordered("name", true).await?)
    }

    /// Case-insensitive search over offering names.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<ServiceOffering>, ServiceError> {
        Ok(self.repo.search("name", term).await?)
    }
}
