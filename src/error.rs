// Error taxonomy for the moderation core.
//
// LoadError and AuthError::Initialization are startup-only and abort the
// process. ModerationError is the per-call outcome surfaced to callers.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to build the dictionary store.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("custom dictionary {path} could not be read: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("custom dictionary {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("built-in dictionary is malformed: {0}")]
    BuiltIn(#[source] serde_json::Error),

    #[error("dictionary term {term:?} could not be compiled: {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors from the authorization gate and its validation backend.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid bearer credential: {0}")]
    InvalidCredential(String),

    #[error("credential has been revoked")]
    Revoked,

    #[error("validation backend request failed: {0}")]
    Backend(String),

    #[error("authorization gate failed to initialize: {0}")]
    Initialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Backend(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidCredential(e.to_string())
    }
}

/// Per-call failures of the RPC surface.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("call cancelled: {0}")]
    Cancelled(String),
}

impl ModerationError {
    /// Stable, transport-neutral name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ModerationError::Unauthenticated(_) => "UNAUTHENTICATED",
            ModerationError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ModerationError::Cancelled(_) => "CANCELLED",
        }
    }
}
