//! Registry client and its builder
//!
//! The client wires the blob operations to a transport, the registry URL
//! builder and a logger. All three are injected at construction and nothing
//! else is shared between calls.

use crate::config::{AuthConfig, ClientConfig};
use crate::digest::Digest;
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use crate::registry::context::RequestContext;
use crate::registry::endpoints::RegistryUrl;
use crate::registry::operations::{BlobOperations, UploadSession};
use crate::registry::stream::BlobStream;
use crate::registry::transport::{HttpTransport, Transport};
use reqwest::Body;
use reqwest::header::HeaderName;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

pub struct RegistryClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    logger: Option<Logger>,
}

impl RegistryClientBuilder {
    pub fn new(address: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(address))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            logger: None,
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    pub fn with_skip_tls(mut self, skip_tls: bool) -> Self {
        self.config.skip_tls = skip_tls;
        self
    }

    /// Per-request timeout. `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_upload_token_header(mut self, header: impl Into<String>) -> Self {
        self.config.upload_token_header = header.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Use a custom transport instead of one built from the configuration.
    /// Auth, TLS and timeout settings are then the transport's concern.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let urls = RegistryUrl::parse(&self.config.registry_url)?;
        let upload_token_header = HeaderName::from_bytes(self.config.upload_token_header.as_bytes())
            .map_err(|e| {
                RegistryError::Config(format!(
                    "invalid upload token header '{}': {}",
                    self.config.upload_token_header, e
                ))
            })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::from_config(&self.config)?),
        };
        let logger = self
            .logger
            .unwrap_or_else(|| Logger::new(self.config.verbose));

        Ok(RegistryClient {
            blobs: BlobOperations::new(transport, urls.clone(), logger, upload_token_header),
            urls,
        })
    }
}

/// Blob transfer client for one registry
#[derive(Clone)]
pub struct RegistryClient {
    blobs: BlobOperations,
    urls: RegistryUrl,
}

impl RegistryClient {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        Self::builder(address).build()
    }

    pub fn builder(address: impl Into<String>) -> RegistryClientBuilder {
        RegistryClientBuilder::new(address)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        RegistryClientBuilder::from_config(config).build()
    }

    pub fn registry_url(&self) -> &RegistryUrl {
        &self.urls
    }

    pub fn blobs(&self) -> &BlobOperations {
        &self.blobs
    }

    pub async fn download(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
    ) -> Result<BlobStream> {
        self.blobs.download(ctx, repository, digest).await
    }

    pub async fn get_config<T>(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.blobs.get_config(ctx, repository, digest).await
    }

    pub async fn exists(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
    ) -> Result<bool> {
        self.blobs.exists(ctx, repository, digest).await
    }

    pub async fn upload(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
        content: impl Into<Body>,
    ) -> Result<()> {
        self.blobs.upload(ctx, repository, digest, content).await
    }

    pub async fn upload_reader<R>(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
        reader: R,
    ) -> Result<()>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        self.blobs.upload_reader(ctx, repository, digest, reader).await
    }

    pub async fn initiate_upload(
        &self,
        ctx: &RequestContext,
        repository: &str,
    ) -> Result<UploadSession> {
        self.blobs.initiate_upload(ctx, repository).await
    }

    pub async fn finalize_upload(
        &self,
        ctx: &RequestContext,
        session: UploadSession,
        repository: &str,
        digest: &Digest,
        content: impl Into<Body>,
    ) -> Result<()> {
        self.blobs
            .finalize_upload(ctx, session, repository, digest, content.into())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_bad_address() {
        let err = RegistryClient::builder("http://").build().err().unwrap();
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    #[test]
    fn test_builder_rejects_bad_token_header() {
        let err = RegistryClient::builder("http://localhost:5000")
            .with_upload_token_header("not a header")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_builder_keeps_base_path() {
        let client = RegistryClient::builder("https://mirror.example.com/registry")
            .with_auth(AuthConfig::bearer("tok"))
            .with_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.registry_url().base().path(), "/registry");
    }
}
