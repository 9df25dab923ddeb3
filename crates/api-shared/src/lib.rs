//! # API Shared
//!
//! Shared wire types and services for the docstore APIs.
//!
//! Contains:
//! - JSON DTOs (`FileDescriptorRes`, `UploadStatus`, `HealthRes`) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `docstore` CLI.

pub mod dto;
pub mod health;

pub use dto::{FileDescriptorRes, HealthRes, UploadStatus};
pub use health::HealthService;
