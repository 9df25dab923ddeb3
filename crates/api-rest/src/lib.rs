//! # API REST
//!
//! REST API implementation for docstore.
//!
//! Handles:
//! - HTTP endpoints with axum (`/api/file/...`, `/health`)
//! - Multipart upload parsing
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, body limits, request tracing)
//!
//! Uses `api-shared` for wire types and `docstore-core` for storage.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Host, Multipart, Path as AxumPath, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures::TryStreamExt;
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{FileDescriptorRes, HealthRes, HealthService, UploadStatus};
use docstore_core::{FileName, FilesError, FilesService, UploadOutcome};

/// Multipart field carrying the file for a single upload.
const SINGLE_FILE_FIELD: &str = "file";

/// Multipart field carrying each file of a multi-file upload.
const MULTIPLE_FILES_FIELD: &str = "files";

/// Content type used when a requested name has no usable extension.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Application state for the REST API server
///
/// Holds the storage service shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    files: Arc<FilesService>,
}

impl AppState {
    pub fn new(files: FilesService) -> Self {
        Self {
            files: Arc::new(files),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, upload_file, upload_multiple_files, get_file),
    components(schemas(HealthRes, FileDescriptorRes, UploadStatus))
)]
pub struct ApiDoc;

/// Builds the REST router
///
/// # Arguments
/// * `state` - Shared application state
/// * `max_upload_bytes` - Request body limit applied to every route
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/file/uploadFile", post(upload_file))
        .route("/api/file/uploadMultipleFiles", post(upload_multiple_files))
        .route("/api/file/:file_name", get(get_file))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/file/uploadFile",
    request_body(
        content_type = "multipart/form-data",
        description = "A single file in the `file` field"
    ),
    responses(
        (status = 200, description = "Upload processed; check `outcome` for rejections", body = FileDescriptorRes),
        (status = 400, description = "Bad request"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Upload one file
///
/// Stores the `file` field if its extension is allow-listed and it is not empty. Rejected
/// uploads still return `200` with empty descriptor fields and an `outcome` naming the reason.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not valid multipart data,
/// - there is no `file` field, or
/// - the file name is unusable.
///
/// Returns `500 Internal Server Error` if writing to disk fails.
#[axum::debug_handler]
async fn upload_file(
    State(state): State<AppState>,
    Host(host): Host,
    mut multipart: Multipart,
) -> Result<Json<FileDescriptorRes>, (StatusCode, &'static str)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to parse multipart data: {}", e);
        (e.status(), "Failed to parse multipart data")
    })? {
        if field.name() != Some(SINGLE_FILE_FIELD) {
            continue;
        }

        let outcome = store_field(&state.files, field, &host).await?;
        return Ok(Json(outcome.into()));
    }

    Err((StatusCode::BAD_REQUEST, "Missing file field"))
}

#[utoipa::path(
    post,
    path = "/api/file/uploadMultipleFiles",
    request_body(
        content_type = "multipart/form-data",
        description = "Any number of files, each in a `files` field"
    ),
    responses(
        (status = 200, description = "Uploads processed, in request order", body = [FileDescriptorRes]),
        (status = 400, description = "Bad request"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Upload several files
///
/// Each `files` part is streamed to storage as it arrives, in request order. A storage failure
/// aborts the remaining uploads; files stored before it are kept.
#[axum::debug_handler]
async fn upload_multiple_files(
    State(state): State<AppState>,
    Host(host): Host,
    mut multipart: Multipart,
) -> Result<Json<Vec<FileDescriptorRes>>, (StatusCode, &'static str)> {
    let mut outcomes: Vec<FileDescriptorRes> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to parse multipart data: {}", e);
        (e.status(), "Failed to parse multipart data")
    })? {
        if field.name() != Some(MULTIPLE_FILES_FIELD) {
            continue;
        }

        let outcome = store_field(&state.files, field, &host).await?;
        outcomes.push(outcome.into());
    }

    Ok(Json(outcomes))
}

/// Streams one multipart part into storage.
///
/// Parts carry no length, so the first chunk is read up front: a part without one is empty,
/// otherwise the size of that chunk is passed on as a lower-bound length. When the request body
/// fails mid-part, the multipart status (e.g. `413`) is returned instead of the storage error.
async fn store_field(
    files: &FilesService,
    mut field: Field<'_>,
    host: &str,
) -> Result<UploadOutcome, (StatusCode, &'static str)> {
    let file_name = field.file_name().unwrap_or_default().to_string();

    let first = field
        .chunk()
        .await
        .map_err(|e| {
            tracing::warn!("Failed to read file field: {}", e);
            (e.status(), "Failed to read file data")
        })?
        .unwrap_or_default();
    let length = first.len() as u64;

    let mut body_status = None;
    let rest = StreamReader::new(field.map_err(|e| {
        tracing::warn!("Failed to read file field: {}", e);
        body_status = Some(e.status());
        std::io::Error::other(e)
    }));
    let content = Box::pin(Cursor::new(first).chain(rest));

    let result = files.upload(&file_name, content, length, host).await;

    match (result, body_status) {
        (Ok(outcome), _) => Ok(outcome),
        (Err(_), Some(status)) => Err((status, "Failed to read file data")),
        (Err(e), None) => Err(files_error_response(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/file/{file_name}",
    params(
        ("file_name" = String, Path, description = "Stored file name, e.g. photo.jpg")
    ),
    responses(
        (status = 200, description = "Raw file bytes, served as application/{extension}"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Download a stored file by name
///
/// The response content type is `application/{extension}` (e.g. `application/pdf`), with an
/// explicit `content-length`.
#[axum::debug_handler]
async fn get_file(
    State(state): State<AppState>,
    AxumPath(file_name): AxumPath<String>,
) -> Result<Response, (StatusCode, &'static str)> {
    let bytes = state
        .files
        .read(&file_name)
        .await
        .map_err(files_error_response)?;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file_name)),
        (header::CONTENT_LENGTH, HeaderValue::from(bytes.len())),
    ];

    Ok((headers, bytes).into_response())
}

/// `application/{ext}` for a stored name, falling back to `application/octet-stream`.
fn content_type_for(file_name: &str) -> HeaderValue {
    FileName::new(file_name)
        .ok()
        .and_then(|name| name.extension())
        .and_then(|ext| HeaderValue::from_str(&format!("application/{}", ext.without_dot())).ok())
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE))
}

fn files_error_response(err: FilesError) -> (StatusCode, &'static str) {
    match err {
        FilesError::InvalidPath(reason) => {
            tracing::warn!("Rejected file name: {}", reason);
            (StatusCode::BAD_REQUEST, "Invalid file name")
        }
        FilesError::NotFound(name) => {
            tracing::debug!("File not found: {}", name);
            (StatusCode::NOT_FOUND, "File not found")
        }
        e => {
            tracing::error!("Storage error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}
