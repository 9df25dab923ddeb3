//! JSON request/response types.
//!
//! Field names are camelCase on the wire to match existing upload clients.

use docstore_files::UploadOutcome;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// What the store did with an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Stored,
    RejectedExtension,
    RejectedEmpty,
}

/// Descriptor returned for each uploaded file.
///
/// For rejected uploads the three `document*` fields are empty strings and `outcome` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptorRes {
    #[schema(example = "photo.jpg")]
    pub document_name: String,
    #[schema(example = ".jpg")]
    pub document_type: String,
    #[schema(example = "localhost:5001/api/file/photo.jpg")]
    pub document_url: String,
    pub outcome: UploadStatus,
}

impl From<UploadOutcome> for FileDescriptorRes {
    fn from(outcome: UploadOutcome) -> Self {
        let status = match &outcome {
            UploadOutcome::Stored(_) => UploadStatus::Stored,
            UploadOutcome::RejectedExtension { .. } => UploadStatus::RejectedExtension,
            UploadOutcome::RejectedEmpty { .. } => UploadStatus::RejectedEmpty,
        };
        let descriptor = outcome.descriptor();

        Self {
            document_name: descriptor.document_name,
            document_type: descriptor.document_type,
            document_url: descriptor.document_url,
            outcome: status,
        }
    }
}
