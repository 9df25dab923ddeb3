#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create upload directory: {0}")]
    UploadDirCreation(std::io::Error),
    #[error("storage error: {0}")]
    Files(#[from] docstore_files::FilesError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
