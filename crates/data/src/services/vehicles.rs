//! Vehicle operations.

use std::sync::Arc;

use tracing::instrument;

use servicelane_core::{UserId, VehicleId};

use crate::models::{User, Vehicle};
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Fields the vehicle search box matches against.
const SEARCH_FIELDS: &[&str] = &["make", "model", "license_plate"];

/// Facade over the `vehicles` collection.
#[derive(Clone)]
pub struct VehicleService {
    repo: Repository<Vehicle>,
    users: Repository<User>,
}

impl VehicleService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            repo: Repository::new(Arc::clone(transport)),
            users: Repository::new(Arc::clone(transport)),
        }
    }

    /// Fetch a vehicle by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn get(&self, id: VehicleId) -> Result<Option<Vehicle>, ServiceError> {
        Ok(self.repo.get(id).await?)
    }

    /// Fetch every vehicle.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn all(&self) -> Result<Vec<Vehicle>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    /// Every vehicle registered to a client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_client(&self, client_id: UserId) -> Result<Vec<Vehicle>, ServiceError> {
        Ok(self.repo.find_by("client_id", client_id).await?)
    }

    /// Every vehicle of a given make.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_make(&self, make: &str) -> Result<Vec<Vehicle>, ServiceError> {
        Ok(self.repo.find_by("make", make).await?)
    }

    /// Vehicles with model years in the inclusive range.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn by_year_range(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<Vehicle>, ServiceError> {
        Ok(self.repo.get_by_range("year", start_year, end_year).await?)
    }

    /// Find a vehicle by its license plate.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn find_by_license_plate(
        &self,
        license_plate: &str,
    ) -> Result<Option<Vehicle>, ServiceError> {
        Ok(self.repo.find_one_by("license_plate", license_plate).await?)
    }

    /// Whether a license plate is already registered.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, ServiceError> {
        Ok(self.repo.exists_by("license_plate", license_plate).await?)
    }

    /// Case-insensitive search across make, model, and license plate.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Vehicle>, ServiceError> {
        Ok(self.repo.search_multiple(term, SEARCH_FIELDS).await?)
    }

    /// Register a vehicle for a client.
    ///
    /// The owning client must exist, and a non-empty license plate must not
    /// already be registered.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::MissingReference` if the client is absent, or
    /// `ServiceError::Duplicate` if the plate is taken.
    #[instrument(skip(self, vehicle), fields(client_id = %vehicle.client_id))]
    pub async fn register(&self, vehicle: Vehicle) -> Result<Vehicle, ServiceError> {
        if self.users.get(vehicle.client_id).await?.is_none() {
            return Err(ServiceError::MissingReference("client"));
        }

        if !vehicle.license_plate.is_empty()
            && self.license_plate_exists(&vehicle.license_plate).await?
        {
            return Err(ServiceError::Duplicate {
                field: "license_plate",
                value: vehicle.license_plate,
            });
        }

        Ok(self.repo.create(&vehicle).await?)
    }
}
