//! Error types for bdaycal.

use thiserror::Error;

/// Errors that can occur in bdaycal operations.
///
/// Only the first three variants come out of an address-book fetch; a failed
/// refresh always carries one of them (or `Cancelled`).
#[derive(Error, Debug)]
pub enum BdayCalError {
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Address book discovery failed: {0}")]
    Discovery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Refresh cancelled")]
    Cancelled,

    #[error("A refresh is already in progress")]
    RefreshInProgress,

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of a [`BdayCalError`], kept in refresh diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connect,
    Auth,
    Discovery,
    Config,
    Cancelled,
    RefreshInProgress,
    Other,
}

impl BdayCalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect(_) => ErrorKind::Connect,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Discovery(_) => ErrorKind::Discovery,
            Self::Config(_) => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::RefreshInProgress => ErrorKind::RefreshInProgress,
            Self::IcsGenerate(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Other,
        }
    }

    /// Whether the next scheduled tick can reasonably succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::RefreshInProgress)
    }

    /// Whether this error points at bad credentials or a wrong endpoint.
    pub fn is_configuration_problem(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Discovery(_) | Self::Config(_))
    }
}

/// Result type alias for bdaycal operations.
pub type BdayCalResult<T> = Result<T, BdayCalError>;
