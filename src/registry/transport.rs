//! HTTP transport used by the blob client
//!
//! The [`Transport`] trait is the seam between protocol logic and the wire.
//! [`HttpTransport`] is the `reqwest` implementation: it owns TLS/timeout
//! configuration and injects configured credentials into outgoing requests.
//! Transports report completed requests with a non-success status through the
//! tagged [`RegistryError::Status`] variant when asked to via
//! [`Transport::send_checked`].

use crate::config::{AuthConfig, ClientConfig};
use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Request, Response};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. Any completed response is `Ok`, whatever its status.
    async fn send(&self, request: Request) -> Result<Response>;

    /// Send a request and turn a non-success status into [`RegistryError::Status`]
    async fn send_checked(&self, request: Request) -> Result<Response> {
        let response = self.send(request).await?;
        check_status(response)
    }
}

/// `Ok` for 2xx responses, [`RegistryError::Status`] otherwise
pub fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RegistryError::Status {
            status,
            url: response.url().to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    authorization: Option<HeaderValue>,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            authorization: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if config.skip_tls {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            authorization: authorization_header(&config.auth)?,
        })
    }
}

/// `Basic` header for a username/password pair, otherwise `Bearer` for a token
fn authorization_header(auth: &AuthConfig) -> Result<Option<HeaderValue>> {
    let value = match (&auth.username, &auth.password, &auth.token) {
        (Some(username), Some(password), _) => {
            format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
        }
        (_, _, Some(token)) => format!("Bearer {}", token),
        _ => return Ok(None),
    };

    let mut header = HeaderValue::from_str(&value)
        .map_err(|e| RegistryError::Config(format!("invalid credentials header: {}", e)))?;
    header.set_sensitive(true);
    Ok(Some(header))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, mut request: Request) -> Result<Response> {
        if let Some(authorization) = &self.authorization {
            if !request.headers().contains_key(AUTHORIZATION) {
                request
                    .headers_mut()
                    .insert(AUTHORIZATION, authorization.clone());
            }
        }
        Ok(self.client.execute(request).await?)
    }
}
