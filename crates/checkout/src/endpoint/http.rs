//! `reqwest` client for the create-order endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use quickcart_core::{CreateOrderRequest, CreateOrderResponse, OrderId};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use super::{EndpointError, OrderEndpoint};
use crate::config::CheckoutConfig;

/// HTTP implementation of [`OrderEndpoint`].
///
/// Cheaply cloneable. The configured timeout covers the whole request; a
/// timeout is reported as [`EndpointError::Network`].
#[derive(Clone)]
pub struct HttpOrderEndpoint {
    inner: Arc<HttpOrderEndpointInner>,
}

struct HttpOrderEndpointInner {
    client: reqwest::Client,
    url: Url,
    api_key: Option<SecretString>,
}

impl HttpOrderEndpoint {
    /// Create a client from checkout configuration.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &CheckoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpOrderEndpointInner {
                client,
                url: config.endpoint_url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// The endpoint URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }
}

#[async_trait]
impl OrderEndpoint for HttpOrderEndpoint {
    #[instrument(skip(self, request), fields(user_id = %request.user_id, items = request.items.len()))]
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderId, EndpointError> {
        let mut builder = self.inner.client.post(self.inner.url.clone()).json(request);

        if let Some(key) = &self.inner.api_key {
            builder = builder
                .header("apikey", key.expose_secret())
                .bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        debug!(status = %status, "Order endpoint responded");

        // Error responses still carry the `{ success, error }` envelope
        match serde_json::from_str::<CreateOrderResponse>(&body) {
            Ok(envelope) => envelope.into_result().map_err(EndpointError::Rejected),
            Err(e) => {
                tracing::error!(
                    status = %status,
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse order endpoint response"
                );
                Err(EndpointError::Rejected(format!(
                    "unexpected response from order endpoint (HTTP {status})"
                )))
            }
        }
    }
}

fn network_error(err: reqwest::Error) -> EndpointError {
    if err.is_timeout() {
        EndpointError::Network("order endpoint timed out".to_string())
    } else {
        EndpointError::Network(err.to_string())
    }
}
