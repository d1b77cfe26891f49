//! Domain-named service facades, one per entity type.
//!
//! Each service is a thin combination of repository primitives plus the
//! invariant checks that belong at this boundary: referenced entities must
//! exist, unique fields are pre-checked, and status-changing operations are
//! validated against the lifecycle transition table.
//!
//! Services are stateless; [`Services`] wires one shared instance of each
//! over a single transport at startup and hands them out by reference.
//! There is no hidden global state - whoever needs a service gets it passed
//! in.

pub mod items;
pub mod offerings;
pub mod payments;
pub mod reports;
pub mod requests;
pub mod shops;
pub mod status_updates;
pub mod users;
pub mod vehicles;

use std::sync::Arc;

use thiserror::Error;

use crate::config::BackendConfig;
use crate::repository::RepositoryError;
use crate::transport::{HttpTransport, Transport, TransportError};

pub use items::RequestItemService;
pub use offerings::OfferingService;
pub use payments::PaymentService;
pub use reports::ReportingService;
pub use requests::RequestService;
pub use shops::ShopService;
pub use status_updates::StatusUpdateService;
pub use users::UserService;
pub use vehicles::VehicleService;

/// Errors surfaced at the entity-service boundary.
///
/// Repository errors propagate unchanged unless the service can add domain
/// context; an error is never downgraded to a successful-looking empty
/// result.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An id-addressed entity was absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique field is already taken. Raised by the service pre-check;
    /// the backend's own constraint violation arrives as
    /// [`RepositoryError::Duplicate`] instead.
    #[error("{field} already in use: {value}")]
    Duplicate {
        field: &'static str,
        value: String,
    },

    /// A referenced entity does not exist.
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),

    /// A status-changing operation was attempted from a disallowed state.
    #[error("cannot {action} from status {status}")]
    InvalidTransition {
        status: String,
        action: String,
    },

    /// Underlying repository failure, unchanged.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Shared handle to every entity service, constructed once at startup.
///
/// Cloning is cheap; all clones share the same transport connection. This is
/// the process-wide "one instance per entity" the application relies on,
/// made explicit instead of living in lazily-initialized globals.
#[derive(Clone)]
pub struct Services {
    inner: Arc<ServicesInner>,
}

struct ServicesInner {
    users: UserService,
    vehicles: VehicleService,
    shops: ShopService,
    offerings: OfferingService,
    requests: RequestService,
    items: RequestItemService,
    status_updates: StatusUpdateService,
    payments: PaymentService,
    reports: ReportingService,
}

impl Services {
    /// Connect to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the HTTP transport cannot be built.
    pub fn connect(config: &BackendConfig) -> Result<Self, TransportError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(transport))
    }

    /// Build the service set over an explicit transport.
    ///
    /// Tests use this with an in-memory transport; production callers
    /// normally go through [`Self::connect`].
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ServicesInner {
                users: UserService::new(&transport),
                vehicles: VehicleService::new(&transport),
                shops: ShopService::new(&transport),
                offerings: OfferingService::new(&transport),
                requests: RequestService::new(&transport),
                items: RequestItemService::new(&transport),
                status_updates: StatusUpdateService::new(&transport),
                payments: PaymentService::new(&transport),
                reports: ReportingService::new(&transport),
            }),
        }
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    #[must_use]
    pub fn vehicles(&self) -> &VehicleService {
        &self.inner.vehicles
    }

    #[must_use]
    pub fn shops(&self) -> &ShopService {
        &self.inner.shops
    }

    #[must_use]
    pub fn offerings(&self) -> &OfferingService {
        &self.inner.offerings
    }

    #[must_use]
    pub fn requests(&self) -> &RequestService {
        &self.inner.requests
    }

    #[must_use]
    pub fn items(&self) -> &RequestItemService {
        &self.inner.items
    }

    #[must_use]
    pub fn status_updates(&self) -> &StatusUpdateService {
        &self.inner.status_updates
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentService {
        &self.inner.payments
    }

    #[must_use]
    pub fn reports(&self) -> &ReportingService {
        &self.inner.reports
    }
}
