//! Registry Blob Transfer Library
//!
//! Client for the blob endpoints of the Docker Registry HTTP API v2 / OCI
//! distribution API: download, existence checks, JSON config decoding and
//! monolithic two-phase uploads.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod registry;

pub use config::{AuthConfig, ClientConfig};
pub use digest::Digest;
pub use error::{RegistryError, Result};
pub use logging::Logger;
pub use registry::{
    BlobStream, HttpTransport, RegistryClient, RegistryClientBuilder, RequestContext, Transport,
    UploadSession,
};
