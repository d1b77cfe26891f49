//! The shop's service catalog.

use serde::{Deserialize, Serialize};

use servicelane_core::{Money, OfferingId};

use crate::repository::Entity;

/// A service the shop offers, e.g. "Oil & Filters" or "Brakes".
///
/// Request items reference offerings by id; the read model joins the names
/// back in for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<OfferingId>,
    pub name: String,
    /// Standard price before inspection adjustments.
    pub base_price: Money,
}

impl Entity for ServiceOffering {
    type Id = OfferingId;
    const COLLECTION: &'static str = "services";

    fn id(&self) -> Option<OfferingId> {
        self.id
    }
}
