use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),

    #[error("location not found: {location}")]
    LocationNotFound { location: String },

    #[error("{service} is unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        status: Option<u16>,
        reason: String,
    },

    #[error("malformed response from {service}: {reason}")]
    MalformedUpstreamResponse {
        service: &'static str,
        reason: String,
    },

    #[error("a search is already in progress")]
    SearchInProgress,
}

impl SearchError {
    /// Maps a failed `ureq` call onto the upstream taxonomy.
    pub(crate) fn upstream(service: &'static str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => Self::UpstreamUnavailable {
                service,
                status: Some(status),
                reason: format!("HTTP {status}"),
            },
            ureq::Error::Transport(x) => Self::UpstreamUnavailable {
                service,
                status: None,
                reason: x.to_string(),
            },
        }
    }

    /// Maps a failure reading the response body. Undecodable text is a
    /// malformed response, anything else an interrupted one.
    pub(crate) fn body(service: &'static str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData => Self::malformed(service, err),
            _ => Self::UpstreamUnavailable {
                service,
                status: None,
                reason: err.to_string(),
            },
        }
    }

    pub(crate) fn malformed(service: &'static str, reason: impl ToString) -> Self {
        Self::MalformedUpstreamResponse {
            service,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no results available to export")]
    EmptyResultSet,

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("formatting failed")]
    Fmt(#[from] std::fmt::Error),
}
