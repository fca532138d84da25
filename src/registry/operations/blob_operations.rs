//! Blob operations for registry client
//!
//! Implements the Docker Registry v2 / OCI distribution blob endpoints:
//! - Blob download (GET /v2/{name}/blobs/{digest})
//! - Blob existence checks (HEAD /v2/{name}/blobs/{digest})
//! - Config blob decoding (download + JSON)
//! - Monolithic upload: POST /v2/{name}/blobs/uploads/ then PUT {location}?digest=
//!
//! Only the existence check classifies HTTP status codes. Downloads hand the
//! response to the caller unchecked, and the finalizing PUT of an upload
//! counts as done once it completes, whatever its status.

use crate::digest::Digest;
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use crate::registry::context::RequestContext;
use crate::registry::stream::BlobStream;
use crate::registry::transport::Transport;
use crate::registry::endpoints::{RegistryUrl, resolve_location, with_digest_query};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue, LOCATION};
use reqwest::{Body, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use std::io::BufReader;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, SyncIoBridge};
use url::Url;

const OCTET_STREAM: &str = "application/octet-stream";

/// Upload session opened by [`BlobOperations::initiate_upload`].
///
/// Finalizing consumes the session, so it cannot be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    location: Url,
    token: String,
}

impl UploadSession {
    pub fn new(location: Url, token: impl Into<String>) -> Self {
        Self {
            location,
            token: token.into(),
        }
    }

    /// Absolute URL the content is PUT to
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Session token; empty when the registry did not send one
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Clone)]
pub struct BlobOperations {
    transport: Arc<dyn Transport>,
    urls: RegistryUrl,
    output: Logger,
    upload_token_header: HeaderName,
}

impl BlobOperations {
    pub fn new(
        transport: Arc<dyn Transport>,
        urls: RegistryUrl,
        output: Logger,
        upload_token_header: HeaderName,
    ) -> Self {
        Self {
            transport,
            urls,
            output,
            upload_token_header,
        }
    }

    /// Open a blob for reading. The response status is not inspected.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
    ) -> Result<BlobStream> {
        let url = self.urls.blob(repository, digest)?;
        self.output.event(
            "registry.blob.download",
            &[
                ("url", url.to_string()),
                ("repository", repository.to_string()),
                ("digest", digest.to_string()),
            ],
        );

        let request = Request::new(Method::GET, url);
        let response = ctx.run(self.transport.send(request)).await.map_err(|e| {
            self.output
                .warning(&format!("Failed to download blob {}: {}", digest.short(), e));
            e
        })?;

        if !response.status().is_success() {
            self.output.detail(&format!(
                "Blob {} download returned status {}",
                digest.short(),
                response.status()
            ));
        }

        Ok(BlobStream::new(response, ctx.clone()))
    }

    /// Download a JSON blob (image config and similar) and decode it into `T`
    pub async fn get_config<T>(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let stream = self.download(ctx, repository, digest).await?;
        let reader = BufReader::new(SyncIoBridge::new(stream.into_reader()));
        let decode = tokio::task::spawn_blocking(move || serde_json::from_reader::<_, T>(reader));

        match ctx.run(async move { Ok(decode.await?) }).await? {
            Ok(value) => Ok(value),
            Err(err) if err.is_io() => Err(RegistryError::from_io(err.into())),
            Err(err) => {
                self.output
                    .warning(&format!("Blob {} is not valid JSON: {}", digest.short(), err));
                Err(RegistryError::Decode(err))
            }
        }
    }

    /// Whether the registry holds the blob.
    ///
    /// `Ok(false)` means the registry answered 404. Any other failure, including
    /// transport errors and unexpected statuses, is an error: the blob may or
    /// may not exist.
    pub async fn exists(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
    ) -> Result<bool> {
        let url = self.urls.blob(repository, digest)?;
        self.output.event(
            "registry.blob.check",
            &[
                ("url", url.to_string()),
                ("repository", repository.to_string()),
                ("digest", digest.to_string()),
            ],
        );

        let request = Request::new(Method::HEAD, url);
        match ctx.run(self.transport.send_checked(request)).await {
            Ok(response) => {
                let found = response.status() == StatusCode::OK;
                self.output.detail(&format!(
                    "Blob {} {} (status {})",
                    digest.short(),
                    if found { "exists" } else { "not reported as present" },
                    response.status()
                ));
                Ok(found)
            }
            Err(err) if err.is_not_found() => {
                self.output
                    .detail(&format!("Blob {} does not exist in registry", digest.short()));
                Ok(false)
            }
            Err(err) => {
                self.output.warning(&format!(
                    "Could not determine whether blob {} exists: {}",
                    digest.short(),
                    err
                ));
                Err(err)
            }
        }
    }

    /// Upload a blob in one request: open a session, then PUT the content
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
        content: impl Into<Body>,
    ) -> Result<()> {
        let session = self.initiate_upload(ctx, repository).await?;
        self.finalize_upload(ctx, session, repository, digest, content.into())
            .await
    }

    /// Upload a blob read from `reader` without buffering it
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
        self.upload(ctx, repository, digest, Body::wrap_stream(ReaderStream::new(reader)))
            .await
    }

    /// Open an upload session and read its location and token
    pub async fn initiate_upload(
        &self,
        ctx: &RequestContext,
        repository: &str,
    ) -> Result<UploadSession> {
        let url = self.urls.uploads(repository)?;
        self.output.event(
            "registry.blob.initiate-upload",
            &[("url", url.to_string()), ("repository", repository.to_string())],
        );

        let mut request = Request::new(Method::POST, url);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
        *request.body_mut() = Some(Body::from(Vec::new()));

        let response = ctx.run(self.transport.send_checked(request)).await.map_err(|e| {
            self.output
                .warning(&format!("Failed to start upload session in {}: {}", repository, e));
            e
        })?;

        let token = response
            .headers()
            .get(&self.upload_token_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let location = response
            .headers()
            .get(LOCATION)
            .ok_or_else(|| {
                RegistryError::Parse("missing Location header in upload response".to_string())
            })?
            .to_str()
            .map_err(|e| RegistryError::Parse(format!("invalid Location header: {}", e)))?;
        let location = resolve_location(response.url(), location)?;

        self.output
            .detail(&format!("Upload session started, location: {}", location));

        Ok(UploadSession::new(location, token))
    }

    /// PUT the content to a session's location with the declared digest.
    ///
    /// Completes once the request does; the response status is only logged.
    pub async fn finalize_upload(
        &self,
        ctx: &RequestContext,
        session: UploadSession,
        repository: &str,
        digest: &Digest,
        content: Body,
    ) -> Result<()> {
        let url = with_digest_query(&session.location, digest);
        self.output.event(
            "registry.blob.upload",
            &[
                ("url", url.to_string()),
                ("repository", repository.to_string()),
                ("digest", digest.to_string()),
            ],
        );

        let authorization = HeaderValue::from_str(&format!("Bearer {}", session.token))
            .map_err(|e| RegistryError::Parse(format!("invalid upload token: {}", e)))?;

        let mut request = Request::new(Method::PUT, url);
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
        headers.insert(AUTHORIZATION, authorization);
        *request.body_mut() = Some(content);

        let response = ctx.run(self.transport.send(request)).await.map_err(|e| {
            self.output
                .warning(&format!("Failed to upload blob {}: {}", digest.short(), e));
            e
        })?;

        if response.status().is_success() {
            self.output
                .detail(&format!("Blob {} uploaded to {}", digest.short(), repository));
        } else {
            self.output.warning(&format!(
                "Registry answered {} to upload of blob {}",
                response.status(),
                digest.short()
            ));
        }
        Ok(())
    }
}
