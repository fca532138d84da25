//! Caller-owned blob body returned by downloads

use crate::error::{RegistryError, Result};
use crate::registry::context::RequestContext;
use crate::registry::transport::check_status;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::io::StreamReader;
use url::Url;

/// Open response body of a blob download.
///
/// The status is not checked when the stream is opened; inspect
/// [`BlobStream::status`] or call [`BlobStream::error_for_status`]. Reads observe
/// the [`RequestContext`] the download was started with. Dropping the stream
/// releases the connection.
#[derive(Debug)]
pub struct BlobStream {
    response: Response,
    ctx: RequestContext,
}

impl BlobStream {
    pub(crate) fn new(response: Response, ctx: RequestContext) -> Self {
        Self { response, ctx }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    pub fn url(&self) -> &Url {
        self.response.url()
    }

    /// [`RegistryError::Status`] unless the download completed with a 2xx status
    pub fn error_for_status(self) -> Result<Self> {
        let ctx = self.ctx;
        let response = check_status(self.response)?;
        Ok(Self { response, ctx })
    }

    /// Next chunk of the body, `None` at the end
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        let ctx = self.ctx.clone();
        let response = &mut self.response;
        ctx.run(async { Ok(response.chunk().await?) }).await
    }

    /// Read the remaining body into memory
    pub async fn bytes(self) -> Result<Bytes> {
        let Self { response, ctx } = self;
        ctx.run(async move { Ok(response.bytes().await?) }).await
    }

    /// Body as a stream of chunks. Failures, including cancellation, arrive as
    /// `io::Error`s wrapping a [`RegistryError`]; see [`RegistryError::from_io`].
    pub fn into_stream(self) -> BoxStream<'static, io::Result<Bytes>> {
        let Self { response, ctx } = self;
        futures::stream::try_unfold(response, move |mut response| {
            let ctx = ctx.clone();
            async move {
                let next = ctx
                    .run(async { Ok(response.chunk().await?) })
                    .await
                    .map_err(io::Error::other)?;
                Ok::<_, io::Error>(next.map(|chunk| (chunk, response)))
            }
        })
        .boxed()
    }

    /// Body as an [`AsyncRead`]
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin + 'static {
        StreamReader::new(self.into_stream())
    }

    /// Copy the body into `writer`, returning the number of bytes written
    pub async fn copy_to<W>(self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut reader = self.into_reader();
        tokio::io::copy(&mut reader, writer)
            .await
            .map_err(RegistryError::from_io)
    }
}
