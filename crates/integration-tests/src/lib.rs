//! Integration tests for Servicelane.
//!
//! The services and repository are exercised end-to-end against
//! [`MemoryBackend`], an in-memory stand-in for the REST backend that
//! implements the same filter dialect (eq/gte/lte/gt/lt/ilike, ordering),
//! assigns ids on insert, and enforces the unique columns with 409s. No
//! network is involved; what is under test is everything above the
//! transport seam.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p servicelane-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `repository` - Generic repository operations against one collection
//! - `services` - Entity service invariants and the request lifecycle
//! - `reporting` - Dashboard assembly including the degraded-directory path

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Value, json};

use servicelane_data::{Method, Response, Services, Transport, TransportError};

/// Initialize test logging once; controlled by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Columns the backend enforces uniqueness on, per collection.
fn unique_columns(collection: &str) -> &'static [&'static str] {
    match collection {
        "users" => &["username", "email"],
        "vehicles" => &["license_plate"],
        _ => &[],
    }
}

#[derive(Default)]
struct Store {
    collections: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    next_id: i64,
}

/// In-memory implementation of the transport contract.
///
/// Rows are stored as the JSON the repository sends; queries are answered
/// with the same semantics the hosted backend provides for the subset of
/// the dialect the repository emits.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Store>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every request against `collection` answer 500 until restored.
    pub fn fail(&self, collection: &str) {
        let mut store = self.inner.lock().expect("store lock");
        store.failing.insert(collection.to_owned());
    }

    /// Undo [`Self::fail`].
    pub fn restore(&self, collection: &str) {
        let mut store = self.inner.lock().expect("store lock");
        store.failing.remove(collection);
    }

    /// Number of rows currently stored in a collection.
    #[must_use]
    pub fn row_count(&self, collection: &str) -> usize {
        let store = self.inner.lock().expect("store lock");
        store.collections.get(collection).map_or(0, Vec::len)
    }
}

#[async_trait]
impl Transport for MemoryBackend {
    async fn request(
        &self,
        method: Method,
        collection: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Response, TransportError> {
        let mut store = self.inner.lock().expect("store lock");

        if store.failing.contains(collection) {
            return Ok(Response {
                status: 500,
                body: json!({"message": "injected backend failure"}),
            });
        }

        let parsed = ParsedQuery::from_pairs(query);

        match method {
            Method::Get => {
                let rows = store.collections.get(collection).cloned().unwrap_or_default();
                let mut rows: Vec<Value> =
                    rows.into_iter().filter(|row| parsed.matches(row)).collect();
                if let Some((field, ascending)) = &parsed.order {
                    rows.sort_by(|a, b| {
                        let ordering = compare_values(a.get(field), b.get(field));
                        if *ascending { ordering } else { ordering.reverse() }
                    });
                }
                Ok(Response {
                    status: 200,
                    body: Value::Array(rows),
                })
            }
            Method::Post => {
                let Some(Value::Object(mut row)) = body else {
                    return Ok(bad_request("expected a JSON object body"));
                };

                if !row.contains_key("id") {
                    store.next_id += 1;
                    row.insert("id".to_owned(), json!(store.next_id));
                }

                let row = Value::Object(row);
                if let Some(conflict) = unique_conflict(&store, collection, &row, None) {
                    return Ok(conflict);
                }

                store
                    .collections
                    .entry(collection.to_owned())
                    .or_default()
                    .push(row.clone());
                Ok(Response {
                    status: 201,
                    body: Value::Array(vec![row]),
                })
            }
            Method::Patch => {
                let Some(Value::Object(replacement)) = body else {
                    return Ok(bad_request("expected a JSON object body"));
                };

                let rows = store.collections.get(collection).cloned().unwrap_or_default();
                let mut updated = Vec::new();
                let mut next_rows = Vec::new();

                for row in rows {
                    if parsed.matches(&row) {
                        let mut replaced = replacement.clone();
                        if let Some(id) = row.get("id") {
                            replaced.insert("id".to_owned(), id.clone());
                        }
                        let replaced = Value::Object(replaced);
                        let original_id = row.get("id").cloned();
                        if let Some(conflict) =
                            unique_conflict(&store, collection, &replaced, original_id.as_ref())
                        {
                            return Ok(conflict);
                        }
                        updated.push(replaced.clone());
                        next_rows.push(replaced);
                    } else {
                        next_rows.push(row);
                    }
                }

                store.collections.insert(collection.to_owned(), next_rows);
                Ok(Response {
                    status: 200,
                    body: Value::Array(updated),
                })
            }
            Method::Delete => {
                let rows = store.collections.entry(collection.to_owned()).or_default();
                rows.retain(|row| !parsed.matches(row));
                Ok(Response {
                    status: 204,
                    body: Value::Null,
                })
            }
        }
    }
}

fn bad_request(message: &str) -> Response {
    Response {
        status: 400,
        body: json!({ "message": message }),
    }
}

/// Check the collection's unique columns against every stored row except
/// the one being replaced. Empty strings are treated like NULLs: they never
/// conflict.
fn unique_conflict(
    store: &Store,
    collection: &str,
    candidate: &Value,
    exclude_id: Option<&Value>,
) -> Option<Response> {
    let rows = store.collections.get(collection)?;

    for column in unique_columns(collection) {
        let Some(value) = candidate.get(*column).and_then(Value::as_str) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let taken = rows.iter().any(|row| {
            row.get(*column).and_then(Value::as_str) == Some(value)
                && exclude_id.is_none_or(|id| row.get("id") != Some(id))
        });

        if taken {
            return Some(Response {
                status: 409,
                body: json!({
                    "message": format!(
                        "duplicate key value violates unique constraint \"{collection}_{column}_key\""
                    )
                }),
            });
        }
    }

    None
}

struct ParsedQuery {
    filters: Vec<(String, String, String)>,
    order: Option<(String, bool)>,
}

impl ParsedQuery {
    fn from_pairs(query: &[(String, String)]) -> Self {
        let mut filters = Vec::new();
        let mut order = None;

        for (key, value) in query {
            if key == "order" {
                if let Some((field, direction)) = value.rsplit_once('.') {
                    order = Some((field.to_owned(), direction == "asc"));
                }
            } else if let Some((op, target)) = value.split_once('.') {
                filters.push((key.clone(), op.to_owned(), target.to_owned()));
            }
        }

        Self { filters, order }
    }

    fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, op, target)| matches_filter(row.get(field), op, target))
    }
}

fn matches_filter(value: Option<&Value>, op: &str, target: &str) -> bool {
    match op {
        "eq" => value.is_some_and(|value| render(value) == Some(target.to_owned())),
        "ilike" => {
            let term = target.trim_matches('*').to_lowercase();
            value
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&term))
        }
        "gte" => compare_to_target(value, target).is_some_and(Ordering::is_ge),
        "lte" => compare_to_target(value, target).is_some_and(Ordering::is_le),
        "gt" => compare_to_target(value, target).is_some_and(Ordering::is_gt),
        "lt" => compare_to_target(value, target).is_some_and(Ordering::is_lt),
        _ => false,
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_to_target(value: Option<&Value>, target: &str) -> Option<Ordering> {
    let value = value?;

    if let Some(number) = value.as_f64() {
        return number.partial_cmp(&target.parse::<f64>().ok()?);
    }

    let text = value.as_str()?;

    // Timestamps may differ in offset spelling ("Z" vs "+00:00"), so compare
    // instants when both sides parse.
    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(text),
        DateTime::parse_from_rfc3339(target),
    ) {
        return Some(a.cmp(&b));
    }

    Some(text.cmp(target))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
            if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                if let (Ok(ta), Ok(tb)) = (
                    DateTime::parse_from_rfc3339(x),
                    DateTime::parse_from_rfc3339(y),
                ) {
                    return ta.cmp(&tb);
                }
                return x.cmp(y);
            }
            Ordering::Equal
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// A fresh in-memory backend with the full service set wired over it.
pub struct TestContext {
    pub backend: Arc<MemoryBackend>,
    pub services: Services,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let backend = MemoryBackend::new();
        let transport: Arc<dyn Transport> = backend.clone();
        Self {
            backend,
            services: Services::with_transport(transport),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub mod fixtures {
    //! Builders for test entities, mirroring realistic backend rows.

    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use servicelane_core::{
        Email, Money, OfferingId, ServiceRequestId, ShopId, UserId, UserRole, VehicleId,
    };
    use servicelane_data::models::{
        MechanicShop, RequestItem, ServiceOffering, ServiceRequest, User, Vehicle,
    };

    pub fn user(username: &str, role: UserRole) -> User {
        User {
            id: None,
            username: username.to_owned(),
            role,
            full_name: {
                let mut name = username.to_owned();
                if let Some(first) = name.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                format!("{name} Example")
            },
            email: Email::parse(&format!("{username}@example.com")).expect("valid email"),
            password_hash: "$argon2id$stub".to_owned(),
        }
    }

    pub fn vehicle(client_id: UserId, plate: &str) -> Vehicle {
        Vehicle {
            id: None,
            client_id,
            make: "Toyota".to_owned(),
            model: "Corolla".to_owned(),
            year: 2019,
            license_plate: plate.to_owned(),
        }
    }

    pub fn shop(name: &str, city: &str) -> MechanicShop {
        MechanicShop {
            id: None,
            name: name.to_owned(),
            city: city.to_owned(),
            address: "1 Workshop Way".to_owned(),
        }
    }

    pub fn offering(name: &str, price: Decimal) -> ServiceOffering {
        ServiceOffering {
            id: None,
            name: name.to_owned(),
            base_price: Money::new(price),
        }
    }

    pub fn request(
        client_id: UserId,
        vehicle_id: VehicleId,
        shop_id: ShopId,
        estimate: Decimal,
    ) -> ServiceRequest {
        ServiceRequest {
            id: None,
            client_id,
            vehicle_id,
            shop_id,
            mechanic_id: None,
            status: None,
            total_price_estimated: Money::new(estimate),
            total_price_final: None,
            created_at: Utc::now(),
        }
    }

    pub fn request_created_at(
        mut base: ServiceRequest,
        created_at: DateTime<Utc>,
    ) -> ServiceRequest {
        base.created_at = created_at;
        base
    }

    pub fn item(
        request_id: ServiceRequestId,
        service_id: OfferingId,
        quantity: i64,
        price: Decimal,
    ) -> RequestItem {
        RequestItem {
            id: None,
            service_request_id: request_id,
            service_id,
            quantity,
            price_estimated: Money::new(price),
            price_final: None,
            source: "client".to_owned(),
            approved: false,
        }
    }

    pub fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }
}
