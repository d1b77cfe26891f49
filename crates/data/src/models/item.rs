//! Line items on a service request.

use serde::{Deserialize, Serialize};

use servicelane_core::{Money, OfferingId, RequestItemId, ServiceRequestId};

use crate::repository::Entity;

/// One line of work on a service request: an offering, a quantity, and the
/// estimated/final price per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestItemId>,
    pub service_request_id: ServiceRequestId,
    pub service_id: OfferingId,
    pub quantity: i64,
    pub price_estimated: Money,
    /// Set when the mechanic finalizes the line.
    pub price_final: Option<Money>,
    /// Where the line came from, e.g. "client" or "inspection".
    pub source: String,
    #[serde(rename = "is_approved")]
    pub approved: bool,
}

impl RequestItem {
    /// Estimated line total: unit estimate times quantity.
    #[must_use]
    pub fn total_estimated(&self) -> Money {
        self.price_estimated * self.quantity
    }

    /// Final line total, if the line has been finalized.
    #[must_use]
    pub fn total_final(&self) -> Option<Money> {
        self.price_final.map(|price| price * self.quantity)
    }
}

impl Entity for RequestItem {
    type Id = RequestItemId;
    const COLLECTION: &'static str = "service_request_items";

    fn id(&self) -> Option<RequestItemId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn item(quantity: i64) -> RequestItem {
        RequestItem {
            id: Some(RequestItemId::new(1)),
            service_request_id: ServiceRequestId::new(10),
            service_id: OfferingId::new(3),
            quantity,
            price_estimated: Money::new(dec!(24.50)),
            price_final: None,
            source: "client".to_owned(),
            approved: false,
        }
    }

    #[test]
    fn test_total_estimated_scales_by_quantity() {
        assert_eq!(item(3).total_estimated(), Money::new(dec!(73.50)));
    }

    #[test]
    fn test_total_final_absent_until_finalized() {
        let mut line = item(2);
        assert_eq!(line.total_final(), None);

        line.price_final = Some(Money::new(dec!(20.00)));
        assert_eq!(line.total_final(), Some(Money::new(dec!(40.00))));
    }

    #[test]
    fn test_approved_flag_wire_name() {
        let json = serde_json::to_value(item(1)).expect("serialize");
        assert!(json.get("is_approved").is_some());
        assert!(json.get("approved").is_none());
    }
}
