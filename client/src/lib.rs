pub mod call;
pub mod client;
pub mod config;
pub mod registry;
pub mod session;

pub use call::{CallOptions, CancelToken};
pub use client::Client;
pub use config::{ClientConfig, ConfigError, ValidatedConfig};
pub use registry::{AccountRegistry, Snapshot};
pub use session::{BetPolicy, GameSessionClient, SessionConfig};
use plinko_types::plinko::ProgramError;
use thiserror::Error;

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("rejected by program: {0}")]
    RemoteRejected(ProgramError),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed: {0}")]
    Failed(reqwest::StatusCode),
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("cancelled")]
    Cancelled,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("invalid data: {0}")]
    InvalidData(#[from] commonware_codec::Error),
    #[error("unexpected response")]
    UnexpectedResponse,
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

/// Broad classification of an [Error].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The program refused the transaction.
    RemoteRejected,
    /// The round trip failed, timed out or was cancelled.
    Network,
    /// The requested account is unknown.
    NotFound,
    /// The caller supplied an unusable argument.
    InvalidArgument,
    /// The backend answered with something that could not be trusted.
    InvalidResponse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RemoteRejected(_) => ErrorKind::RemoteRejected,
            Self::Reqwest(_) | Self::Failed(_) | Self::DeadlineExceeded | Self::Cancelled => {
                ErrorKind::Network
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) | Self::Url(_) | Self::InvalidScheme(_) => {
                ErrorKind::InvalidArgument
            }
            Self::InvalidData(_) | Self::UnexpectedResponse => ErrorKind::InvalidResponse,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
