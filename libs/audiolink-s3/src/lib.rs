//! # AudioLink S3 Adapter
//!
//! Implements the domain `ObjectStore` port on top of the AWS SDK. Works with
//! AWS S3 and S3-compatible services such as MinIO (path-style addressing).

pub mod infrastructure;

pub use infrastructure::S3ObjectStore;
