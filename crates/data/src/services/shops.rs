//! Mechanic shop operations.

use std::sync::Arc;

use servicelane_core::ShopId;

use crate::models::MechanicShop;
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Fields the shop search box matches against.
const SEARCH_FIELDS: &[&str] = &["name", "city", "address"];

/// Facade over the `mechanic_shops` collection.
#[derive(Clone)]
pub struct ShopService {
    repo: Repository<MechanicShop>,
}

impl ShopService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
        }
    }

    /// Fetch a shop by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn get(&self, id: ShopId) -> Result<Option<MechanicShop>, ServiceError> {
        Ok(self.repo.get(id).await?)
    }

    /// Every shop in a city.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_city(&self, city: &str) -> Result<Vec<MechanicShop>, ServiceError> {
        Ok(self.repo.find_by("city", city).await?)
    }

    /// Case-insensitive search over shop names.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<MechanicShop>, ServiceError> {
        Ok(self.repo.search("name", term).await?)
    }

    /// Case-insensitive search across name, city, and address.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<MechanicShop>, ServiceError> {
        Ok(self.repo.search_multiple(term, SEARCH_FIELDS).await?)
    }

    /// All shops ordered alphabetically by name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all_by_name(&self) -> Result<Vec<MechanicShop>, ServiceError> {
        Ok(self.repo.get_all_ordered("name", true).await?)
    }

    /// All shops ordered alphabetically by city.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all_by_city(&self) -> Result<Vec<MechanicShop>, ServiceError> {
        Ok(self.repo.get_all_ordered("city", true).await?)
    }
}
