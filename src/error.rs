//! Error types for backend operations.
//!
//! Every failure here is recoverable: callers degrade to the previous or an
//! empty state instead of aborting.

use serde::Serialize;
use thiserror::Error;

/// Failure classification shared by all user-facing operations.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Input was rejected before anything was sent.
    Validation,
    /// No session is held.
    Unauthenticated,
    /// Backend or gateway could not be reached.
    Connectivity,
    /// 403 on a manager-only action.
    Authorization,
    /// 404 on a status change: client and backend disagree on routes.
    ContractMismatch,
    /// Any other non-ok response.
    Generic,
    /// Durable session storage failed.
    Storage,
}

/// Low-level failure of a single request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with status {0}")]
    Status(u16),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Transport(_) => FailureKind::Connectivity,
            ApiError::Status(_) | ApiError::Decode(_) => FailureKind::Generic,
        }
    }
}

/// Failure of the durable key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Login failed. Please check your credentials.")]
    Rejected(u16),

    #[error("login response did not contain a token")]
    MissingToken,

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status(code) => LoginError::Rejected(code),
            ApiError::Decode(_) => LoginError::MissingToken,
            other => LoginError::Api(other),
        }
    }
}

impl LoginError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoginError::Rejected(_) | LoginError::MissingToken => FailureKind::Generic,
            LoginError::Api(err) => err.kind(),
            LoginError::Storage(_) => FailureKind::Storage,
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("task creation failed with status {0}")]
    Rejected(u16),

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for CreateError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status(code) => CreateError::Rejected(code),
            other => CreateError::Api(other),
        }
    }
}

impl CreateError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CreateError::MissingField(_) => FailureKind::Validation,
            CreateError::NotAuthenticated => FailureKind::Unauthenticated,
            CreateError::Rejected(_) => FailureKind::Generic,
            CreateError::Api(err) => err.kind(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("Only Managers can perform this action.")]
    Forbidden,

    #[error("Endpoint not found. Check if backend uses /approve or /approved.")]
    ContractMismatch,

    #[error("not logged in")]
    NotAuthenticated,

    #[error("status change failed with status {0}")]
    Rejected(u16),

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for StatusChangeError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status(403) => StatusChangeError::Forbidden,
            ApiError::Status(404) => StatusChangeError::ContractMismatch,
            ApiError::Status(code) => StatusChangeError::Rejected(code),
            other => StatusChangeError::Api(other),
        }
    }
}

impl StatusChangeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StatusChangeError::Forbidden => FailureKind::Authorization,
            StatusChangeError::ContractMismatch => FailureKind::ContractMismatch,
            StatusChangeError::NotAuthenticated => FailureKind::Unauthenticated,
            StatusChangeError::Rejected(_) => FailureKind::Generic,
            StatusChangeError::Api(err) => err.kind(),
        }
    }
}
