//! Generic typed query engine shared by all entity services.
//!
//! One [`Repository`] instance per entity type turns high-level query
//! intents into transport requests and decodes the JSON rows back into the
//! entity. Entity services stay free of query construction entirely; they
//! compose these primitives under domain names.
//!
//! # Failure semantics
//!
//! Transport failures and backend rejections surface as distinguishable
//! [`RepositoryError`] variants and are never swallowed. Rows that do not
//! match the declared entity shape fail loudly as [`RepositoryError::Decode`]
//! rather than silently dropping fields. No operation retries.

pub mod query;

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::transport::{Method, Response, Transport, TransportError};

pub use query::{FilterOp, QueryValue};

/// Column every collection addresses its rows by.
const ID_FIELD: &str = "id";

/// A persisted record tied to a backend collection.
///
/// The implementation declares the collection name and how to read the
/// backend-assigned identifier; everything else the repository needs comes
/// from the serde derives.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier newtype for this entity.
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Display + Send + Sync;

    /// Backend collection (table) name.
    const COLLECTION: &'static str;

    /// Backend-assigned identifier, absent until the record is persisted.
    fn id(&self) -> Option<Self::Id>;
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The backend rejected the request with a status the repository does
    /// not classify further.
    #[error("backend rejected the request ({status}): {message}")]
    Backend { status: u16, message: String },

    /// A row did not map onto the expected entity shape.
    #[error("{collection} row did not match the expected shape: {source}")]
    Decode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An id-addressed operation found no row.
    #[error("not found")]
    NotFound,

    /// The backend's unique constraint rejected a write.
    #[error("duplicate value: {0}")]
    Duplicate(String),
}

/// Generic repository over one backend collection.
///
/// Cheap to clone; all clones share the underlying transport.
pub struct Repository<E: Entity> {
    transport: Arc<dyn Transport>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    /// Create a repository over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _entity: PhantomData,
        }
    }

    // =========================================================================
    // Id-addressed operations
    // =========================================================================

    /// Fetch one record by id. Absence is `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn get(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let body = self.run(Method::Get, vec![id_filter(id)], None).await?;
        Ok(Self::decode_rows(body)?.into_iter().next())
    }

    /// Persist a new record. The backend assigns the identity; the returned
    /// record is the stored representation including assigned fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if a unique constraint rejects
    /// the write, or other variants for transport/decode failures.
    #[instrument(skip(self, entity), fields(collection = E::COLLECTION))]
    pub async fn create(&self, entity: &E) -> Result<E, RepositoryError> {
        let row = Self::encode(entity)?;
        let body = self.run(Method::Post, Vec::new(), Some(row)).await?;
        Self::decode_one(body)
    }

    /// Replace the record at `id` with `entity` (full replace, not a patch -
    /// the serialized entity carries every column).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists at `id`.
    #[instrument(skip(self, entity), fields(collection = E::COLLECTION, id = %id))]
    pub async fn update(&self, id: E::Id, entity: &E) -> Result<E, RepositoryError> {
        let row = Self::encode(entity)?;
        let body = self.run(Method::Patch, vec![id_filter(id)], Some(row)).await?;
        Self::decode_one(body)
    }

    /// Delete the record at `id`. Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request fails.
    #[instrument(skip(self), fields(collection = E::COLLECTION, id = %id))]
    pub async fn delete(&self, id: E::Id) -> Result<(), RepositoryError> {
        self.run(Method::Delete, vec![id_filter(id)], None).await?;
        Ok(())
    }

    /// Delete every record in the collection. Test/reset paths only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request fails.
    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn delete_all(&self) -> Result<(), RepositoryError> {
        self.run(Method::Delete, Vec::new(), None).await?;
        Ok(())
    }

    // =========================================================================
    // Collection queries
    // =========================================================================

    /// Fetch the entire collection. Unbounded; limiting is the caller's
    /// responsibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn get_all(&self) -> Result<Vec<E>, RepositoryError> {
        let body = self.run(Method::Get, Vec::new(), None).await?;
        Self::decode_rows(body)
    }

    /// Fetch the entire collection ordered by `field`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn get_all_ordered(
        &self,
        field: &str,
        ascending: bool,
    ) -> Result<Vec<E>, RepositoryError> {
        let body = self
            .run(Method::Get, vec![query::order(field, ascending)], None)
            .await?;
        Self::decode_rows(body)
    }

    /// Exact-match filter on a single field.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn find_by(
        &self,
        field: &str,
        value: impl QueryValue,
    ) -> Result<Vec<E>, RepositoryError> {
        let body = self
            .run(
                Method::Get,
                vec![query::filter(field, FilterOp::Eq, &value)],
                None,
            )
            .await?;
        Self::decode_rows(body)
    }

    /// First record matching an exact filter, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn find_one_by(
        &self,
        field: &str,
        value: impl QueryValue,
    ) -> Result<Option<E>, RepositoryError> {
        Ok(self.find_by(field, value).await?.into_iter().next())
    }

    /// Whether any record matches an exact filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn exists_by(
        &self,
        field: &str,
        value: impl QueryValue,
    ) -> Result<bool, RepositoryError> {
        Ok(!self.find_by(field, value).await?.is_empty())
    }

    /// Case-insensitive substring match on a single field.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn search(&self, field: &str, term: &str) -> Result<Vec<E>, RepositoryError> {
        let body = self
            .run(Method::Get, vec![query::ilike(field, term)], None)
            .await?;
        Self::decode_rows(body)
    }

    /// Union of [`Self::search`] across several fields, deduplicated by id
    /// and ordered by first appearance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any request or decode fails.
    pub async fn search_multiple(
        &self,
        term: &str,
        fields: &[&str],
    ) -> Result<Vec<E>, RepositoryError> {
        let mut seen: HashSet<E::Id> = HashSet::new();
        let mut merged = Vec::new();

        for field in fields {
            for row in self.search(field, term).await? {
                match row.id() {
                    Some(id) if !seen.insert(id) => {}
                    _ => merged.push(row),
                }
            }
        }

        Ok(merged)
    }

    /// Inclusive range filter; works for numeric and temporal fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn get_by_range(
        &self,
        field: &str,
        low: impl QueryValue,
        high: impl QueryValue,
    ) -> Result<Vec<E>, RepositoryError> {
        let body = self
            .run(
                Method::Get,
                vec![
                    query::filter(field, FilterOp::Gte, &low),
                    query::filter(field, FilterOp::Lte, &high),
                ],
                None,
            )
            .await?;
        Self::decode_rows(body)
    }

    /// Compose a comparison filter with a sort on a second field.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the request or decode fails.
    pub async fn filter_and_order(
        &self,
        field: &str,
        op: FilterOp,
        value: impl QueryValue,
        order_field: &str,
        ascending: bool,
    ) -> Result<Vec<E>, RepositoryError> {
        let body = self
            .run(
                Method::Get,
                vec![
                    query::filter(field, op, &value),
                    query::order(order_field, ascending),
                ],
                None,
            )
            .await?;
        Self::decode_rows(body)
    }

    // =========================================================================
    // Execution and decoding
    // =========================================================================

    async fn run(
        &self,
        method: Method,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Value, RepositoryError> {
        let response = self
            .transport
            .request(method, E::COLLECTION, &query, body)
            .await?;
        Self::classify(response)
    }

    /// Map a backend status onto the error taxonomy. Non-2xx statuses are
    /// data at the transport level; their meaning is decided here.
    fn classify(response: Response) -> Result<Value, RepositoryError> {
        if response.is_success() {
            return Ok(response.body);
        }

        match response.status {
            404 => Err(RepositoryError::NotFound),
            409 => Err(RepositoryError::Duplicate(backend_message(&response.body))),
            status => Err(RepositoryError::Backend {
                status,
                message: backend_message(&response.body),
            }),
        }
    }

    fn encode(entity: &E) -> Result<Value, RepositoryError> {
        serde_json::to_value(entity).map_err(|source| RepositoryError::Decode {
            collection: E::COLLECTION,
            source,
        })
    }

    fn decode_rows(body: Value) -> Result<Vec<E>, RepositoryError> {
        serde_json::from_value(body).map_err(|source| RepositoryError::Decode {
            collection: E::COLLECTION,
            source,
        })
    }

    /// Writes echo the stored rows as a single-element array; an empty array
    /// means the filter matched nothing.
    fn decode_one(body: Value) -> Result<E, RepositoryError> {
        Self::decode_rows(body)?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }
}

fn id_filter<I: std::fmt::Display>(id: I) -> (String, String) {
    (ID_FIELD.to_owned(), format!("eq.{id}"))
}

/// Pull the human-readable message out of a backend error body.
fn backend_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map_or_else(|| body.to_string(), str::to_owned)
}
