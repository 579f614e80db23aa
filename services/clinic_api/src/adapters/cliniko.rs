//! services/clinic_api/src/adapters/cliniko.rs
//!
//! This module contains the adapter for the remote clinic-management API.
//! It implements the `ClinicApi` port from the `gateway_core` crate.
//!
//! Each port operation is one authenticated HTTP call; the adapter performs
//! no retries and no timeout beyond the shared client's 30 second transport
//! timeout. Non-2xx responses surface as `PortError::Remote` carrying the
//! upstream status code and response body.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::debug;

use gateway_core::{ClinicApi, PortError, PortResult, Resource, UpdateMethod};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ClinicApi` against a Cliniko-style REST API.
pub struct ClinikoClient {
    http: Client,
    base_url: String,
    /// `Basic base64("<api_key>:")`; the remote API uses the key as the
    /// username with an empty password. `None` when no key is configured.
    auth_header: Option<String>,
}

impl ClinikoClient {
    /// Creates a new `ClinikoClient`. A missing API key does not fail
    /// construction; every call will instead return a configuration error.
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let auth_header =
            api_key.map(|key| format!("Basic {}", BASE64.encode(format!("{key}:"))));

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        }
    }

    fn auth_header(&self) -> PortResult<&str> {
        self.auth_header.as_deref().ok_or_else(|| {
            PortError::Unexpected(
                "CLINIKO_API_KEY is not configured; remote API calls are unavailable".to_string(),
            )
        })
    }

    /// Issues one request and parses the JSON body. A `null` value is
    /// returned for empty (204) responses.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<(&str, &str)>,
        body: Option<&Value>,
    ) -> PortResult<Value> {
        let auth = self.auth_header()?;
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "calling remote clinic API");

        let mut request = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json");
        if let Some(pair) = query {
            request = request.query(&[pair]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PortError::Unexpected(format!("invalid JSON from remote API: {e}")))
    }
}

//=========================================================================================
// `ClinicApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl ClinicApi for ClinikoClient {
    async fn list(&self, resource: Resource, query: &str) -> PortResult<Vec<Value>> {
        let query = (!query.is_empty()).then_some(("q", query));
        let body = self
            .request(Method::GET, resource.plural(), query, None)
            .await?;

        // The remote API wraps lists in a resource-named envelope, e.g.
        // {"patients": [...]}. An absent or malformed envelope is an empty list.
        Ok(body
            .get(resource.plural())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, resource: Resource, id: &str) -> PortResult<Value> {
        self.request(
            Method::GET,
            &format!("{}/{}", resource.plural(), id),
            None,
            None,
        )
        .await
    }

    async fn create(&self, resource: Resource, payload: Value) -> PortResult<Value> {
        self.request(Method::POST, resource.plural(), None, Some(&payload))
            .await
    }

    async fn update(&self, resource: Resource, id: &str, payload: Value) -> PortResult<Value> {
        let method = match resource.update_method() {
            UpdateMethod::Put => Method::PUT,
            UpdateMethod::Patch => Method::PATCH,
        };
        self.request(
            method,
            &format!("{}/{}", resource.plural(), id),
            None,
            Some(&payload),
        )
        .await
    }

    async fn delete(&self, resource: Resource, id: &str) -> PortResult<Value> {
        self.request(
            Method::DELETE,
            &format!("{}/{}", resource.plural(), id),
            None,
            None,
        )
        .await?;
        Ok(json!({ "deleted": true }))
    }
}
