//! Storage constants.

/// Default name of the flat directory uploads are written to, relative to the working directory.
pub const UPLOAD_FOLDER_NAME: &str = "Upload";

/// Extensions accepted for storage, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".pdf", ".jpg", ".png", ".jpeg"];

/// Route prefix a stored file is retrievable under; used to build `documentUrl`.
pub const FILE_ROUTE_PREFIX: &str = "/api/file/";
