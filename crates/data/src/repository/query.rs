//! Query-pair construction for the backend's filter dialect.
//!
//! Filters travel as `field=op.value` pairs and ordering as
//! `order=field.direction`, e.g. `year=gte.2015&order=created_at.desc`.
//! Substring search uses `ilike` with `*` wildcards. Every operation the
//! repository exposes is built from this small fixed vocabulary.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use servicelane_core::{
    Money, OfferingId, PaymentId, PaymentStatus, RequestItemId, RequestStatus,
    ServiceRequestId, ShopId, StatusUpdateId, UserId, UserRole, VehicleId,
};

/// Comparison operators supported by the backend filter syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    Gt,
    Lt,
}

impl FilterOp {
    /// Wire keyword for the operator.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Lt => "lt",
        }
    }
}

/// A value that can appear on the right-hand side of a filter.
///
/// Rendering is explicit per type rather than a blanket `Display` impl so
/// that temporal values always serialize in the backend's expected format.
pub trait QueryValue {
    /// Render the value as it appears in the query string.
    fn render(&self) -> String;
}

macro_rules! query_value_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryValue for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

query_value_via_display!(
    i32,
    i64,
    bool,
    &str,
    String,
    Decimal,
    Money,
    NaiveDate,
    UserId,
    VehicleId,
    ShopId,
    ServiceRequestId,
    RequestItemId,
    OfferingId,
    StatusUpdateId,
    PaymentId,
    RequestStatus,
    PaymentStatus,
    UserRole,
);

impl QueryValue for DateTime<Utc> {
    fn render(&self) -> String {
        self.to_rfc3339()
    }
}

/// Build a comparison filter pair: `field=op.value`.
pub(crate) fn filter(field: &str, op: FilterOp, value: &dyn QueryValue) -> (String, String) {
    (
        field.to_owned(),
        format!("{}.{}", op.keyword(), value.render()),
    )
}

/// Build a case-insensitive substring filter pair: `field=ilike.*term*`.
pub(crate) fn ilike(field: &str, term: &str) -> (String, String) {
    (field.to_owned(), format!("ilike.*{term}*"))
}

/// Build an ordering pair: `order=field.asc` / `order=field.desc`.
pub(crate) fn order(field: &str, ascending: bool) -> (String, String) {
    let direction = if ascending { "asc" } else { "desc" };
    ("order".to_owned(), format!("{field}.{direction}"))
}
