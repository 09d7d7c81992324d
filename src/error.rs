use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way an install can fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("unknown platform: {0}")]
    UnsupportedPlatform(String),

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("bad API response: {0}")]
    BadResponse(String),

    #[error("asset not found with name: {0}")]
    AssetNotFound(String),

    #[error("request failed: {0}")]
    HttpError(u16),

    #[error("download failed with {0}")]
    DownloadFailed(u16),

    #[error("gave up after {0} redirects")]
    TooManyRedirects(usize),

    #[error("expecting {name} or {name}.exe in {}, didn't find one", .dir.display())]
    BinaryNotFound { name: String, dir: PathBuf },

    #[error("download command failed: {0}")]
    CommandFailed(String),

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("{operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error unpacking {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
