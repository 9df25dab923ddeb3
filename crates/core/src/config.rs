//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the storage service
//! and the HTTP layer. Nothing reads the process environment during request handling.

use crate::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REST_ADDR, MAX_UPLOAD_BYTES_ENV, REST_ADDR_ENV,
    UPLOAD_DIR_ENV, UPLOAD_FOLDER_NAME,
};
use crate::{ConfigError, ConfigResult};
use docstore_files::FilesService;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Store configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    upload_dir: PathBuf,
    rest_addr: SocketAddr,
    max_upload_bytes: usize,
}

impl StoreConfig {
    /// Create a new `StoreConfig`.
    pub fn new(
        upload_dir: PathBuf,
        rest_addr: SocketAddr,
        max_upload_bytes: usize,
    ) -> ConfigResult<Self> {
        if upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidInput(
                "upload_dir cannot be empty".into(),
            ));
        }

        if max_upload_bytes == 0 {
            return Err(ConfigError::InvalidInput(
                "max_upload_bytes must be greater than zero".into(),
            ));
        }

        Ok(Self {
            upload_dir,
            rest_addr,
            max_upload_bytes,
        })
    }

    /// Build a config from raw, optional environment values.
    ///
    /// Missing or blank values fall back to the defaults in [`crate::constants`].
    pub fn from_env_values(
        upload_dir: Option<String>,
        rest_addr: Option<String>,
        max_upload_bytes: Option<String>,
    ) -> ConfigResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let upload_dir = non_blank(upload_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(UPLOAD_FOLDER_NAME));

        let rest_addr = non_blank(rest_addr).unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let rest_addr: SocketAddr = rest_addr.parse().map_err(|_| {
            ConfigError::InvalidInput(format!(
                "{} is not a socket address: {}",
                REST_ADDR_ENV, rest_addr
            ))
        })?;

        let max_upload_bytes = non_blank(max_upload_bytes)
            .map(|v| {
                v.parse::<usize>().map_err(|_| {
                    ConfigError::InvalidInput(format!(
                        "{} must be a positive integer: {}",
                        MAX_UPLOAD_BYTES_ENV, v
                    ))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Self::new(upload_dir, rest_addr, max_upload_bytes)
    }

    /// Read the `DOCSTORE_*` environment variables and build a config.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_values(
            std::env::var(UPLOAD_DIR_ENV).ok(),
            std::env::var(REST_ADDR_ENV).ok(),
            std::env::var(MAX_UPLOAD_BYTES_ENV).ok(),
        )
    }

    /// Return a copy with a different upload directory.
    pub fn with_upload_dir(mut self, upload_dir: PathBuf) -> ConfigResult<Self> {
        if upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidInput(
                "upload_dir cannot be empty".into(),
            ));
        }
        self.upload_dir = upload_dir;
        Ok(self)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn rest_addr(&self) -> SocketAddr {
        self.rest_addr
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

/// Ensure the configured upload directory exists and open a [`FilesService`] on it.
pub fn open_store(cfg: &StoreConfig) -> ConfigResult<FilesService> {
    let upload_dir = cfg.upload_dir();
    if !upload_dir.exists() {
        std::fs::create_dir_all(upload_dir).map_err(ConfigError::UploadDirCreation)?;
        tracing::info!("Created upload directory {}", upload_dir.display());
    }

    Ok(FilesService::new(upload_dir)?)
}
