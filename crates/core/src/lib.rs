//! # docstore Core
//!
//! Startup wiring for the docstore upload service.
//!
//! This crate resolves configuration and opens the storage service:
//! - `StoreConfig`: upload directory, REST address and body limit, resolved once at startup
//! - `open_store`: creates the upload directory if needed and returns a `FilesService`
//!
//! **No API concerns**: HTTP routing and multipart handling belong in `api-rest`.

pub mod config;
pub mod constants;
mod error;

pub use config::{open_store, StoreConfig};
pub use error::{ConfigError, ConfigResult};

pub use docstore_files::{
    FileDescriptor, FileName, FilesError, FilesService, IncomingFile, UploadOutcome,
    ALLOWED_EXTENSIONS,
};
