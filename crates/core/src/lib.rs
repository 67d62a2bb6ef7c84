//! objmove-core: Core library for the objmove cleanup and transfer tools
//!
//! This crate provides everything that does not depend on a particular S3 SDK:
//! - Path classification (`s3://bucket/key` versus local paths)
//! - Authentication flag validation and auth/endpoint configuration
//! - ObjectStore and Connector traits
//! - The recursive delete and single-file transfer operations
//! - Optional configuration file loading

pub mod auth;
pub mod config;
pub mod delete;
pub mod error;
pub mod path;
pub mod traits;
pub mod transfer;

pub use auth::{AccessFlags, AuthConfig, EndpointConfig};
pub use config::{Config, ConfigManager};
pub use delete::{DeleteOutcome, MAX_DELETE_BATCH, delete_recursive};
pub use error::{Error, Result};
pub use path::{RemotePath, StoragePath, classify};
pub use traits::{Connector, ListOptions, ListResult, ObjectInfo, ObjectStore};
pub use transfer::{TransferOutcome, transfer_file};
