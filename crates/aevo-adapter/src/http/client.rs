/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{Credentials, OrderSigner};
use crate::http::{AevoError, Result};
use crate::types::Environment;

const API_KEY_HEADER: &str = "aevo-key";
const API_SECRET_HEADER: &str = "aevo-secret";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// REST client for the Aevo API
///
/// Stateless request/response: no retries, no local interpretation of
/// exchange errors.
#[derive(Debug)]
pub struct AevoClient {
    http_client: Client,
    base_url: Url,
    environment: Environment,
    credentials: Option<Credentials>,
    order_signer: Option<OrderSigner>,
}

impl AevoClient {
    /// Create an unauthenticated client with default configuration
    pub fn new(environment: Environment) -> Result<Self> {
        Self::with_config(ClientConfig::default(), environment)
    }

    /// Create a client for the credentials' environment with credentials set
    pub fn with_credentials(credentials: Credentials) -> Result<Self> {
        let mut client = Self::new(credentials.environment())?;
        client.set_credentials(credentials);
        Ok(client)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, environment: Environment) -> Result<Self> {
        Self::with_config_and_base_url(config, environment, environment.rest_url())
    }

    /// Create a client against an explicit base URL (proxies, mock servers)
    pub fn with_config_and_base_url(
        config: ClientConfig,
        environment: Environment,
        base_url: &str,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            environment,
            credentials: None,
            order_signer: None,
        })
    }

    /// Set credentials for authenticated and signed requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        if credentials.environment() != self.environment {
            warn!(
                client_environment = %self.environment,
                credentials_environment = %credentials.environment(),
                "credentials sign for a different environment than the client targets"
            );
        }
        self.order_signer = Some(OrderSigner::from_credentials(&credentials));
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn require_credentials(&self, operation: &str) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| AevoError::missing_credentials(operation))
    }

    pub(crate) fn order_signer(&self, operation: &str) -> Result<&OrderSigner> {
        self.order_signer
            .as_ref()
            .ok_or_else(|| AevoError::missing_credentials(operation))
    }

    /// Build request builder for public endpoints
    pub(crate) fn public_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Build request builder for endpoints requiring the API key headers
    pub(crate) fn private_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let credentials = self.require_credentials(endpoint)?;
        let headers = auth_headers(credentials)?;
        Ok(self.public_request(method, endpoint)?.headers(headers))
    }

    /// Send a request and decode a 2xx JSON body
    ///
    /// Non-2xx responses become `AevoError::Api` carrying the raw body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, path = %path, "sending request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%method, path = %path, status = status.as_u16(), "request rejected");
            return Err(AevoError::api_error(status, body));
        }

        debug!(%method, path = %path, status = status.as_u16(), bytes = body.len(), "response received");
        serde_json::from_str(&body).map_err(|err| {
            AevoError::InvalidResponse(format!("{method} {path}: {err}"))
        })
    }
}

fn auth_headers(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, header_value(credentials.api_key())?);
    headers.insert(API_SECRET_HEADER, header_value(credentials.api_secret())?);
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| AevoError::Config("API key contains invalid header characters".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
