//! Registry operations module
//!
//! Protocol logic for the blob endpoints lives here; `client.rs` wires it to a
//! transport, URL builder and logger.

pub mod blob_operations;

pub use blob_operations::{BlobOperations, UploadSession};
