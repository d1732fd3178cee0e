use shared::domain::Reference;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("listings service unreachable: {0}")]
    Transport(String),
    #[error("listings service answered with status {0}")]
    Status(u16),
    #[error("{0}")]
    Rejected(String),
    #[error("listings response carried no data")]
    MissingData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lookup of {reference} failed: {reason}")]
pub struct LookupError {
    pub reference: Reference,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("update rejected: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no price entered")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("price must be a positive number")]
    NonPositivePrice,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("another action is already pending")]
    Busy,
    #[error("no action is waiting for confirmation")]
    NothingPending,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum TransportSetupError {
    #[error("invalid service url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Renders a reqwest failure, naming timeouts explicitly.
pub(crate) fn describe_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else if err.is_decode() {
        format!("malformed response: {err}")
    } else {
        err.to_string()
    }
}
