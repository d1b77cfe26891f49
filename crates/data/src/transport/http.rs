//! reqwest-backed transport for the hosted backend.
//!
//! Speaks the backend's PostgREST dialect: collections live under
//! `/rest/v1/{collection}`, filters and ordering travel as query pairs, and
//! `Prefer: return=representation` makes writes echo the stored rows back.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::config::BackendConfig;

use super::{Method, Response, Transport, TransportError};

/// Path prefix the backend serves collections under.
const REST_PREFIX: &str = "rest/v1/";

/// HTTP transport to the hosted REST backend.
///
/// Holds a connection pool and the authentication headers; cloning is cheap
/// and all clones share the pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new transport from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the service key
    /// contains bytes that cannot appear in a header.
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();

        let key_value = HeaderValue::from_str(config.service_key())
            .map_err(|e| TransportError::Config(format!("service key is not header-safe: {e}")))?;
        headers.insert("apikey", key_value);

        let bearer = format!("Bearer {}", config.service_key());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&bearer).map_err(|e| {
                TransportError::Config(format!("service key is not header-safe: {e}"))
            })?,
        );

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Writes must echo the stored representation so backend-assigned
        // fields (id, created_at defaults) come back to the caller.
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = config
            .base_url
            .join(REST_PREFIX)
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(HttpTransportInner { client, base_url }),
        })
    }

    fn endpoint(&self, collection: &str) -> Result<Url, TransportError> {
        self.inner
            .base_url
            .join(collection)
            .map_err(|e| TransportError::Url(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(method = %method, collection))]
    async fn request(
        &self,
        method: Method,
        collection: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Response, TransportError> {
        let mut url = self.endpoint(collection)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut request = match method {
            Method::Get => self.inner.client.get(url),
            Method::Post => self.inner.client.post(url),
            Method::Patch => self.inner.client.patch(url),
            Method::Delete => self.inner.client.delete(url),
        };

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| TransportError::Body(e.to_string()))?
        };

        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BackendConfig {
        BackendConfig::new(
            Url::parse("https://abc.supabase.co").expect("valid url"),
            "eyJhbGciOiJIUzI1NiJ9.c2VydmljZQ",
        )
        .expect("valid config")
    }

    #[test]
    fn test_endpoint_joins_under_rest_prefix() {
        let transport = HttpTransport::new(&test_config()).expect("transport");
        let url = transport.endpoint("vehicles").expect("endpoint");
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/vehicles");
    }
}
