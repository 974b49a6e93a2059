//! Record store integration.
//!
//! This module provides the bridge between the console and the remote
//! record service. The `RecordStore` trait returns boxed futures so the
//! controller can await them however it wants and tests can swap in a mock.
//!
//! ## Endpoints
//!
//! ```text
//! GET    {base}/api/{collection}        -> JSON array of records
//! DELETE {base}/api/{collection}/{id}   -> any 2xx is success
//! ```

use crm_core::{ApiConfig, Record, RecordId, TransportError};
use futures::future::BoxFuture;
use reqwest::{Client, Url};
use std::marker::PhantomData;
use std::time::Duration;

// =============================================================================
// Store Trait
// =============================================================================

/// Remote collection of records of one kind.
pub trait RecordStore<R: Record>: Send + Sync {
    /// Fetch the whole collection in store order.
    fn fetch_all(&self) -> BoxFuture<'static, Result<Vec<R>, TransportError>>;

    /// Delete one record. Empty identifiers are rejected without a request.
    fn delete_by_id(&self, id: &RecordId) -> BoxFuture<'static, Result<(), TransportError>>;
}

// =============================================================================
// HTTP Store
// =============================================================================

/// `RecordStore` backed by the REST service.
pub struct HttpRecordStore<R> {
    client: Client,
    collection: Url,
    timeout: Duration,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> HttpRecordStore<R> {
    /// Create a store for `R`'s collection under the configured base URL.
    pub fn new(api: &ApiConfig) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(api.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, api)
    }

    /// Create with a preconfigured client.
    pub fn with_client(client: Client, api: &ApiConfig) -> Result<Self, TransportError> {
        let raw = api.collection_url(R::descriptor().path);
        let collection = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        if collection.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl {
                url: raw,
                message: "not a hierarchical URL".to_string(),
            });
        }

        Ok(Self {
            client,
            collection,
            timeout: Duration::from_secs(api.timeout_secs),
            _record: PhantomData,
        })
    }

    /// Get the collection endpoint.
    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    /// Endpoint for a single record. The id is encoded as one path segment.
    fn record_url(&self, id: &RecordId) -> Result<Url, TransportError> {
        if id.is_empty() {
            return Err(TransportError::InvalidId("identifier is empty".to_string()));
        }

        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl {
                url: self.collection.to_string(),
                message: "not a hierarchical URL".to_string(),
            })?
            .push(id.as_ref());
        Ok(url)
    }
}

impl<R: Record> RecordStore<R> for HttpRecordStore<R> {
    fn fetch_all(&self) -> BoxFuture<'static, Result<Vec<R>, TransportError>> {
        let client = self.client.clone();
        let url = self.collection.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            tracing::debug!("GET {}", url);
            let resp = client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| request_error(&url, timeout, e))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| request_error(&url, timeout, e))?;
            serde_json::from_slice::<Vec<R>>(&body).map_err(|e| TransportError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }

    fn delete_by_id(&self, id: &RecordId) -> BoxFuture<'static, Result<(), TransportError>> {
        let url = match self.record_url(id) {
            Ok(url) => url,
            Err(e) => return Box::pin(futures::future::ready(Err(e))),
        };
        let client = self.client.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            tracing::debug!("DELETE {}", url);
            let resp = client
                .delete(url.clone())
                .send()
                .await
                .map_err(|e| request_error(&url, timeout, e))?;

            let status = resp.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(TransportError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
            }
        })
    }
}

fn request_error(url: &Url, timeout: Duration, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        TransportError::Unreachable {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Mock Store for Testing
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
