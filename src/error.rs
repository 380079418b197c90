use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RestageError>;

#[derive(Error, Debug)]
pub enum RestageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Download of '{package}' failed: {cause}")]
    Download { package: String, cause: String },

    #[error("Corrupt archive {path:?}: {message}")]
    CorruptArchive { path: PathBuf, message: String },

    #[error("Archive entry '{entry}' escapes the extraction root")]
    PathTraversal { entry: String },

    #[error("Destination directory does not exist: {path:?}")]
    DestinationMissing { path: PathBuf },

    #[error("Deployment feed has {found} qualifying record(s), need at least 2")]
    EmptyFeed { found: usize },

    #[error("Failed to walk {path:?}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RestageError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        RestageError::ConfigError {
            message: message.into(),
        }
    }

    pub fn network<U: Into<String>, S: ToString>(url: U, message: S) -> Self {
        RestageError::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn download<P: Into<String>, S: ToString>(package: P, cause: S) -> Self {
        RestageError::Download {
            package: package.into(),
            cause: cause.to_string(),
        }
    }
}
