//! objmove-s3: S3 SDK adapter for objmove
//!
//! This crate provides the credential resolver and the implementation of the
//! ObjectStore trait using aws-sdk-s3 and aws-sdk-sts. It is the only crate
//! that directly depends on the AWS SDK.

pub mod client;
pub mod resolver;

pub use client::S3Client;
pub use resolver::{S3Connector, resolve};
