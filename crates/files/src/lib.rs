//! docstore File Storage
//!
//! This crate provides the storage side of the docstore upload service: files are written to a
//! single flat base directory, keyed by their uploaded file name, and read back by that name.
//!
//! ## Storage Model
//!
//! - Only allow-listed extensions (`.pdf`, `.jpg`, `.png`, `.jpeg`, any case) are stored
//! - Empty uploads are never stored
//! - Re-uploading a name overwrites the previous content (last write wins)
//! - There is no metadata sidecar; the file system is the only durable state
//!
//! ```text
//! Upload/
//! ├── photo.jpg
//! └── invoice.pdf
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use docstore_files::FilesService;
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FilesService::new(Path::new("Upload"))?;
//! let bytes: &[u8] = b"%PDF-1.7";
//! let outcome = service
//!     .upload("invoice.pdf", bytes, bytes.len() as u64, "localhost:3000")
//!     .await?;
//! assert!(outcome.is_stored());
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{ALLOWED_EXTENSIONS, FILE_ROUTE_PREFIX, UPLOAD_FOLDER_NAME};
pub use docstore_types::{Extension, FileName};
pub use files::{FileDescriptor, FilesService, IncomingFile, UploadOutcome};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Base directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// File name validation failed (directory traversal, separators, empty name)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// No stored file exists under the requested name
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<docstore_types::TextError> for FilesError {
    fn from(err: docstore_types::TextError) -> Self {
        FilesError::InvalidPath(err.to_string())
    }
}

pub type FilesResult<T> = std::result::Result<T, FilesError>;
