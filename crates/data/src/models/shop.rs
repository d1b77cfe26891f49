//! Mechanic shops.

use serde::{Deserialize, Serialize};

use servicelane_core::ShopId;

use crate::repository::Entity;

/// A physical shop location that service requests are routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicShop {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ShopId>,
    pub name: String,
    pub city: String,
    pub address: String,
}

impl Entity for MechanicShop {
    type Id = ShopId;
    const COLLECTION: &'static str = "mechanic_shops";

    fn id(&self) -> Option<ShopId> {
        self.id
    }
}
