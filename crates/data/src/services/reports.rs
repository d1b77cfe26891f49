//! Dashboard assembly: fetch, enrich, aggregate.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{instrument, warn};

use servicelane_core::{PaymentStatus, UserId, UserRole};

use crate::models::{
    Payment, RequestItem, ServiceOffering, ServiceRequest, User, Vehicle, view,
};
use crate::reporting::DashboardReport;
use crate::repository::Repository;
use crate::transport::Transport;

use super::ServiceError;

/// Gathers the materialized inputs the reporting engine needs and builds
/// the dashboard in one pass.
///
/// The user directory is the one input allowed to fail: without it the
/// report still renders, with "Unknown" client labels and id-derived
/// mechanic labels. Every other fetch failure propagates.
#[derive(Clone)]
pub struct ReportingService {
    requests: Repository<ServiceRequest>,
    payments: Repository<Payment>,
    users: Repository<User>,
    vehicles: Repository<Vehicle>,
    items: Repository<RequestItem>,
    offerings: Repository<ServiceOffering>,
}

impl ReportingService {
    pub(crate) fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            requests: Repository::new(Arc::clone(transport)),
            payments: Repository::new(Arc::clone(transport)),
            users: Repository::new(Arc::clone(transport)),
            vehicles: Repository::new(Arc::clone(transport)),
            items: Repository::new(Arc::clone(transport)),
            offerings: Repository::new(Arc::clone(transport)),
        }
    }

    /// Build the admin dashboard from current backend state.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if requests, payments, vehicles, items, or the
    /// catalog cannot be fetched. A failed user directory fetch degrades the
    /// labels instead of failing the report.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardReport, ServiceError> {
        let requests = self.requests.get_all().await?;
        let payments = self
            .payments
            .find_by("status", PaymentStatus::Completed)
            .await?;

        let users = match self.users.get_all().await {
            Ok(users) => Some(users),
            Err(error) => {
                warn!(%error, "user directory unavailable, rendering degraded labels");
                None
            }
        };

        let vehicles = self.vehicles.get_all().await?;
        let items = self.items.get_all().await?;
        let offerings = self.offerings.get_all().await?;

        let views = view::enrich(
            &requests,
            users.as_deref().unwrap_or(&[]),
            &vehicles,
            &items,
            &offerings,
        );

        let mechanic_names: Option<HashMap<UserId, String>> = users.map(|users| {
            users
                .into_iter()
                .filter(|user| user.role == UserRole::Mechanic)
                .filter_map(|user| user.id.map(|id| (id, user.full_name)))
                .collect()
        });

        Ok(DashboardReport::build(
            &requests,
            &views,
            &payments,
            mechanic_names.as_ref(),
            Utc::now().date_naive(),
        ))
    }
}
