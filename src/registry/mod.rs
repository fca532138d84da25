//! Registry module for Docker/OCI registry blob transfer
//!
//! Provides the blob client, its transport seam, URL building, request
//! contexts and the download stream type.

pub mod client;
pub mod context;
pub mod endpoints;
pub mod operations;
pub mod stream;
pub mod transport;

pub use client::{RegistryClient, RegistryClientBuilder};
pub use context::RequestContext;
pub use endpoints::RegistryUrl;
pub use operations::{BlobOperations, UploadSession};
pub use stream::BlobStream;
pub use transport::{HttpTransport, Transport, check_status};
