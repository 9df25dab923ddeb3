//! Flat-directory file storage service implementation
//!
//! This module provides the core implementation of docstore's storage through the
//! [`FilesService`] type. It writes uploaded content into a single base directory and reads
//! it back by file name.
//!
//! # Storage Layout
//!
//! ```text
//! <base_directory>/       # configured once at startup
//! ├── <file_name>         # uploaded name, exactly as given by the client
//! └── …
//! ```
//!
//! There is no sharding, no content addressing and no sidecar metadata. A file's name is its
//! only key and the last upload for a name wins.
//!
//! # Acceptance Policy
//!
//! An upload is written to disk only when:
//!
//! - its extension is one of [`ALLOWED_EXTENSIONS`] (case-insensitive), and
//! - its declared length is greater than zero.
//!
//! Anything else produces a rejection [`UploadOutcome`] and performs no I/O at all. Rejections
//! are not errors.
//!
//! # Security Model
//!
//! File names are untrusted. Every name is parsed into a [`FileName`], which is guaranteed to be
//! a single normal path component, before it is joined onto the base directory. Upload names
//! are first reduced to their final component and checked against the allow-list; only names
//! that pass are validated. Download names must already be a single component.
//!
//! # Implementation Notes
//!
//! - All file I/O goes through `tokio::fs`, so transfers suspend only the calling task
//! - The base directory is validated and canonicalised in the constructor
//! - Concurrent writes to the same name are not coordinated

use crate::{FilesError, FilesResult, ALLOWED_EXTENSIONS, FILE_ROUTE_PREFIX};
use docstore_types::{last_component, Extension, FileName};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Metadata returned after an upload
///
/// Serialises with the camelCase field names clients expect:
/// `{ "documentName": …, "documentType": …, "documentUrl": … }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Stored file name, extension included
    pub document_name: String,

    /// Extension with its leading dot, as given by the client (e.g. `.JPG`)
    pub document_type: String,

    /// Retrieval URL: `{host}/api/file/{document_name}`
    pub document_url: String,
}

impl FileDescriptor {
    /// True when every field is empty, which is how a rejected upload is reported on the wire.
    pub fn is_empty(&self) -> bool {
        self.document_name.is_empty()
            && self.document_type.is_empty()
            && self.document_url.is_empty()
    }
}

/// Result of a single upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Content was written to disk
    Stored(FileDescriptor),

    /// The extension is missing or not on the allow-list; nothing was written.
    ///
    /// `file_name` is the final component of the client name. It was never validated, so it
    /// may be empty.
    RejectedExtension {
        file_name: String,
        extension: Option<Extension>,
    },

    /// The upload declared zero bytes; nothing was written
    RejectedEmpty { file_name: FileName },
}

impl UploadOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, UploadOutcome::Stored(_))
    }

    /// Returns the descriptor for a stored file, or an all-empty descriptor for a rejection.
    pub fn descriptor(&self) -> FileDescriptor {
        match self {
            UploadOutcome::Stored(descriptor) => descriptor.clone(),
            _ => FileDescriptor::default(),
        }
    }

    /// Short machine-readable label for the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            UploadOutcome::Stored(_) => "stored",
            UploadOutcome::RejectedExtension { .. } => "rejected_extension",
            UploadOutcome::RejectedEmpty { .. } => "rejected_empty",
        }
    }
}

/// One file of a multi-file upload
#[derive(Debug)]
pub struct IncomingFile<R> {
    /// Name as supplied by the client
    pub file_name: String,

    /// Declared content length in bytes
    pub length: u64,

    /// Content stream
    pub content: R,
}

impl<R> IncomingFile<R> {
    pub fn new(file_name: impl Into<String>, length: u64, content: R) -> Self {
        Self {
            file_name: file_name.into(),
            length,
            content,
        }
    }
}

/// Service for storing and retrieving uploaded files
///
/// Bound to one base directory for its whole lifetime. The service holds no mutable state, so a
/// single instance can be shared across concurrent requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FilesService {
    /// Canonicalised directory all files are stored in
    base_directory: PathBuf,
}

impl FilesService {
    /// Creates a new `FilesService` rooted at `base_directory`
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if:
    /// - The directory does not exist or is not a directory
    /// - Path canonicalisation fails
    pub fn new(base_directory: &Path) -> FilesResult<Self> {
        if !base_directory.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                base_directory.display()
            )));
        }

        if !base_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                base_directory.display()
            )));
        }

        let base_directory = base_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                base_directory.display(),
                e
            ))
        })?;

        Ok(Self { base_directory })
    }

    /// Returns the canonicalised base directory
    #[must_use]
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Whether `extension` is on the storage allow-list
    pub fn is_allowed(extension: &Extension) -> bool {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| extension.matches(allowed))
    }

    /// Stores one uploaded file
    ///
    /// The client name is reduced to its final path component. A component without an allowed
    /// extension (including an empty one) is rejected before any further validation. If the
    /// extension is allowed and `length` is non-zero, `content` is copied into `<base_directory>/<file_name>`, creating
    /// or truncating the file. The call returns once every byte has been written and flushed.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Name supplied by the client
    /// * `content` - Upload body
    /// * `length` - Declared size of the upload in bytes. Only zero versus non-zero matters for
    ///   acceptance; streaming callers that cannot know the size may pass a lower bound
    /// * `request_host` - Host the request was addressed to, used for `documentUrl`
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The name is not a usable file name (`InvalidPath`)
    /// - Creating or writing the destination fails (`Io`); a partially written file is left
    ///   in place
    pub async fn upload<R>(
        &self,
        file_name: &str,
        mut content: R,
        length: u64,
        request_host: &str,
    ) -> FilesResult<UploadOutcome>
    where
        R: AsyncRead + Unpin,
    {
        let component = last_component(file_name);

        let extension = match Extension::of(component) {
            Some(ext) if Self::is_allowed(&ext) => ext,
            other => {
                tracing::debug!(file_name = %component, "Rejected upload: extension not allowed");
                return Ok(UploadOutcome::RejectedExtension {
                    file_name: component.to_owned(),
                    extension: other,
                });
            }
        };

        let file_name = FileName::new(component)?;

        if length == 0 {
            tracing::debug!(file_name = %file_name, "Rejected upload: empty file");
            return Ok(UploadOutcome::RejectedEmpty { file_name });
        }

        let destination = self.storage_path(&file_name);

        let mut file = fs::File::create(&destination).await.map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create file {}: {}", destination.display(), e),
            ))
        })?;

        let written = tokio::io::copy(&mut content, &mut file)
            .await
            .map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write file to {}: {}", destination.display(), e),
                ))
            })?;
        file.flush().await?;

        if written < length {
            tracing::warn!(
                file_name = %file_name,
                declared = length,
                written,
                "Upload ended before its declared length"
            );
        }

        tracing::info!(file_name = %file_name, bytes = written, "Stored file");

        Ok(UploadOutcome::Stored(FileDescriptor {
            document_name: file_name.to_string(),
            document_type: extension.to_string(),
            document_url: format!("{}{}{}", request_host, FILE_ROUTE_PREFIX, file_name),
        }))
    }

    /// Stores several files, one after another, in input order
    ///
    /// Outcomes are returned in the same order as `files`.
    ///
    /// # Errors
    ///
    /// The first failing upload aborts the batch and its error is returned. Files stored before
    /// the failure stay on disk.
    pub async fn upload_many<R>(
        &self,
        files: Vec<IncomingFile<R>>,
        request_host: &str,
    ) -> FilesResult<Vec<UploadOutcome>>
    where
        R: AsyncRead + Unpin,
    {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(
                self.upload(&file.file_name, file.content, file.length, request_host)
                    .await?,
            );
        }
        Ok(outcomes)
    }

    /// Reads a stored file into memory
    ///
    /// No extension filtering is applied.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - The name is not a single path component (`InvalidPath`)
    /// - No file is stored under the name (`NotFound`)
    /// - The file cannot be read (`Io`)
    pub async fn read(&self, file_name: &str) -> FilesResult<Vec<u8>> {
        let file_name = FileName::new(file_name)?;
        let storage_path = self.storage_path(&file_name);

        match fs::read(&storage_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FilesError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file from {}: {}", storage_path.display(), e),
            ))),
        }
    }

    /// Whether a regular file is stored under `file_name`
    pub async fn exists(&self, file_name: &str) -> FilesResult<bool> {
        let file_name = FileName::new(file_name)?;
        match fs::metadata(self.storage_path(&file_name)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists the names of all stored files, sorted
    pub async fn list(&self) -> FilesResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_directory).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    fn storage_path(&self, file_name: &FileName) -> PathBuf {
        self.base_directory.join(file_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    const HOST: &str = "localhost:5001";

    fn service(temp: &TempDir) -> FilesService {
        FilesService::new(temp.path()).unwrap()
    }

    async fn upload_bytes(service: &FilesService, name: &str, bytes: &[u8]) -> UploadOutcome {
        service
            .upload(name, bytes, bytes.len() as u64, HOST)
            .await
            .unwrap()
    }

    #[test]
    fn test_new_base_not_exists() {
        let temp = TempDir::new().unwrap();
        let result = FilesService::new(&temp.path().join("missing"));
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_new_base_not_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std_fs::write(&file, "not a directory").unwrap();

        let result = FilesService::new(&file);
        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_new_canonicalises_base() {
        let temp = TempDir::new().unwrap();
        std_fs::create_dir_all(temp.path().join("a")).unwrap();

        let service = FilesService::new(&temp.path().join("a").join("..")).unwrap();
        assert_eq!(
            service.base_directory(),
            temp.path().canonicalize().unwrap().as_path()
        );
    }

    #[tokio::test]
    async fn test_upload_photo_example() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let content = b"0123456789";

        let outcome = upload_bytes(&service, "photo.jpg", content).await;

        assert_eq!(
            outcome,
            UploadOutcome::Stored(FileDescriptor {
                document_name: "photo.jpg".into(),
                document_type: ".jpg".into(),
                document_url: "localhost:5001/api/file/photo.jpg".into(),
            })
        );
        assert_eq!(std_fs::read(temp.path().join("photo.jpg")).unwrap(), content);
        assert_eq!(service.read("photo.jpg").await.unwrap(), content);
    }

    #[tokio::test]
    async fn test_upload_extension_case_insensitive_and_kept_as_given() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        for name in ["scan.PDF", "a.Jpg", "b.PNG", "c.jpeg"] {
            let outcome = upload_bytes(&service, name, b"data").await;
            assert!(outcome.is_stored(), "{name} should be stored");
        }

        let outcome = upload_bytes(&service, "scan.PDF", b"data").await;
        assert_eq!(outcome.descriptor().document_type, ".PDF");
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_extensions_without_io() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        for name in ["notes.txt", "script.exe", "archive.pdf.zip", "README", "photo.gif"] {
            let outcome = upload_bytes(&service, name, b"content").await;

            assert!(
                matches!(outcome, UploadOutcome::RejectedExtension { .. }),
                "{name} should be rejected"
            );
            assert!(outcome.descriptor().is_empty());
            assert_eq!(outcome.label(), "rejected_extension");
        }

        assert_eq!(std_fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let outcome = upload_bytes(&service, "empty.pdf", b"").await;

        assert_eq!(
            outcome,
            UploadOutcome::RejectedEmpty {
                file_name: FileName::new("empty.pdf").unwrap()
            }
        );
        assert!(outcome.descriptor().is_empty());
        assert!(!temp.path().join("empty.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        upload_bytes(&service, "report.pdf", b"first version, longer").await;
        upload_bytes(&service, "report.pdf", b"second").await;

        assert_eq!(service.read("report.pdf").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_upload_strips_client_directories() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("store");
        std_fs::create_dir_all(&nested).unwrap();
        let service = FilesService::new(&nested).unwrap();

        let outcome = upload_bytes(&service, "../escape.pdf", b"data").await;

        assert_eq!(outcome.descriptor().document_name, "escape.pdf");
        assert!(nested.join("escape.pdf").exists());
        assert!(!temp.path().join("escape.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_invalid_name_is_error() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let result = service.upload("bad\0.pdf", &b"data"[..], 4, HOST).await;
        assert!(matches!(result, Err(FilesError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_upload_names_without_extension_are_rejected_not_errors() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        for name in ["", "dir/", "uploads/..", ".", "C:\\scans\\"] {
            let outcome = service
                .upload(name, &b"data"[..], 4, HOST)
                .await
                .unwrap_or_else(|e| panic!("{name:?} should not fail: {e}"));

            assert!(
                matches!(
                    outcome,
                    UploadOutcome::RejectedExtension { extension: None, .. }
                ),
                "{name:?} should be rejected for its extension"
            );
            assert!(outcome.descriptor().is_empty());
        }

        assert_eq!(std_fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejection_reports_last_component() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let outcome = upload_bytes(&service, "docs/notes.TXT", b"text").await;

        assert_eq!(
            outcome,
            UploadOutcome::RejectedExtension {
                file_name: "notes.TXT".into(),
                extension: Extension::of("notes.TXT"),
            }
        );
    }

    #[tokio::test]
    async fn test_upload_io_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("store");
        std_fs::create_dir_all(&base).unwrap();
        let service = FilesService::new(&base).unwrap();
        std_fs::remove_dir_all(&base).unwrap();

        let result = service.upload("a.pdf", &b"data"[..], 4, HOST).await;
        assert!(matches!(result, Err(FilesError::Io(_))));
    }

    #[tokio::test]
    async fn test_upload_many_preserves_order() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let files = vec![
            IncomingFile::new("b.png", 3, &b"bbb"[..]),
            IncomingFile::new("skip.txt", 3, &b"ccc"[..]),
            IncomingFile::new("a.pdf", 1, &b"a"[..]),
        ];

        let outcomes = service.upload_many(files, HOST).await.unwrap();

        let names: Vec<String> = outcomes
            .iter()
            .map(|o| o.descriptor().document_name)
            .collect();
        assert_eq!(names, vec!["b.png", "", "a.pdf"]);
        assert_eq!(outcomes[1].label(), "rejected_extension");
    }

    #[tokio::test]
    async fn test_upload_many_aborts_and_keeps_earlier_writes() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        // A directory under the target name makes the create fail.
        std_fs::create_dir(temp.path().join("taken.pdf")).unwrap();

        let files = vec![
            IncomingFile::new("first.pdf", 5, &b"first"[..]),
            IncomingFile::new("taken.pdf", 3, &b"bad"[..]),
            IncomingFile::new("never.pdf", 5, &b"never"[..]),
        ];

        let result = service.upload_many(files, HOST).await;

        assert!(matches!(result, Err(FilesError::Io(_))));
        assert_eq!(std_fs::read(temp.path().join("first.pdf")).unwrap(), b"first");
        assert!(!temp.path().join("never.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_many_continues_past_nameless_part() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let files = vec![
            IncomingFile::new("first.pdf", 5, &b"first"[..]),
            IncomingFile::new("", 4, &b"anon"[..]),
            IncomingFile::new("third.pdf", 5, &b"third"[..]),
        ];

        let outcomes = service.upload_many(files, HOST).await.unwrap();

        let labels: Vec<&str> = outcomes.iter().map(UploadOutcome::label).collect();
        assert_eq!(labels, vec!["stored", "rejected_extension", "stored"]);
        assert_eq!(service.read("third.pdf").await.unwrap(), b"third");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);

        let result = service.read("missing.pdf").await;
        assert!(matches!(result, Err(FilesError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("store");
        std_fs::create_dir_all(&base).unwrap();
        std_fs::write(temp.path().join("secret.pdf"), b"secret").unwrap();
        let service = FilesService::new(&base).unwrap();

        for name in ["../secret.pdf", "..", "sub/secret.pdf", ""] {
            let result = service.read(name).await;
            assert!(
                matches!(result, Err(FilesError::InvalidPath(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_read_ignores_extension_policy() {
        let temp = TempDir::new().unwrap();
        std_fs::write(temp.path().join("notes.txt"), b"plain").unwrap();
        let service = service(&temp);

        assert_eq!(service.read("notes.txt").await.unwrap(), b"plain");
    }

    #[tokio::test]
    async fn test_binary_roundtrip() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        let binary: Vec<u8> = (0..=255).collect();

        upload_bytes(&service, "binary.png", &binary).await;

        assert_eq!(service.read("binary.png").await.unwrap(), binary);
    }

    #[tokio::test]
    async fn test_exists_and_list() {
        let temp = TempDir::new().unwrap();
        let service = service(&temp);
        std_fs::create_dir_all(temp.path().join("subdir")).unwrap();

        upload_bytes(&service, "b.pdf", b"b").await;
        upload_bytes(&service, "a.jpg", b"a").await;

        assert!(service.exists("a.jpg").await.unwrap());
        assert!(!service.exists("c.jpg").await.unwrap());
        assert!(!service.exists("subdir").await.unwrap());
        assert_eq!(service.list().await.unwrap(), vec!["a.jpg", "b.pdf"]);
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = FileDescriptor {
            document_name: "photo.jpg".into(),
            document_type: ".jpg".into(),
            document_url: "localhost:5001/api/file/photo.jpg".into(),
        };

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "documentName": "photo.jpg",
                "documentType": ".jpg",
                "documentUrl": "localhost:5001/api/file/photo.jpg"
            })
        );
    }
}
