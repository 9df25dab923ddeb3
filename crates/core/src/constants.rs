//! Constants used throughout the docstore core crate.
//!
//! Environment variable names and their defaults live here so the server binaries and the CLI
//! resolve configuration identically.

pub use docstore_files::UPLOAD_FOLDER_NAME;

/// Environment variable naming the upload directory.
pub const UPLOAD_DIR_ENV: &str = "DOCSTORE_UPLOAD_DIR";

/// Environment variable naming the REST listen address.
pub const REST_ADDR_ENV: &str = "DOCSTORE_REST_ADDR";

/// Environment variable naming the request body limit in bytes.
pub const MAX_UPLOAD_BYTES_ENV: &str = "DOCSTORE_MAX_UPLOAD_BYTES";

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default request body limit (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
