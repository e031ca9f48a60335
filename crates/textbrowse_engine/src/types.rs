use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::ProtocolError;
use crate::url::UrlError;

/// Coarse classification of everything that can go wrong during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedUrl,
    FileRead,
    DataUrl,
    Connect,
    Protocol,
    Output,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedUrl => write!(f, "malformed url"),
            ErrorKind::FileRead => write!(f, "file read error"),
            ErrorKind::DataUrl => write!(f, "data url error"),
            ErrorKind::Connect => write!(f, "connect error"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::Output => write!(f, "output error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("bad data url: {0}")]
    DataUrl(String),
    #[error("cannot connect to {host}:{port}: {message}")]
    Connect {
        host: String,
        port: u16,
        message: String,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::FileRead { .. } => ErrorKind::FileRead,
            FetchError::DataUrl(_) => ErrorKind::DataUrl,
            FetchError::Connect { .. } => ErrorKind::Connect,
            FetchError::Protocol(_) => ErrorKind::Protocol,
        }
    }

    pub(crate) fn connect(host: &str, port: u16, message: impl fmt::Display) -> Self {
        FetchError::Connect {
            host: host.to_string(),
            port,
            message: message.to_string(),
        }
    }
}

/// Error surfaced at the `load` boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Url(_) => ErrorKind::MalformedUrl,
            LoadError::Fetch(err) => err.kind(),
            LoadError::Output(_) => ErrorKind::Output,
        }
    }
}
