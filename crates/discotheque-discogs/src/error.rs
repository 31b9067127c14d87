// SPDX-License-Identifier: GPL-3.0-or-later

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscogsError>;

/// Error type returned by the Discogs catalog client.
#[derive(Debug, Error)]
pub enum DiscogsError {
    /// No response was received (connectivity, timeout, or the body could not be read).
    #[error("network unavailable: {0}")]
    Transport(#[from] reqwest::Error),
    /// Discogs responded with a non-success HTTP status code.
    /// `message` holds the API's `message` field when present, otherwise the raw body.
    #[error("HTTP status {status}")]
    HttpStatus { status: StatusCode, message: String },
    /// Success status, but there was no payload to parse.
    #[error("empty response body from server")]
    EmptyBody,
    /// The payload did not match the expected shape.
    #[error("unexpected response payload: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Coarse failure category, for callers that only branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Server,
    EmptyBody,
    Mapping,
}

impl DiscogsError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::HttpStatus { .. } => FailureKind::Server,
            Self::EmptyBody => FailureKind::EmptyBody,
            Self::Deserialization(_) | Self::InvalidUrl(_) | Self::ClientBuild(_) => {
                FailureKind::Mapping
            }
        }
    }

    /// HTTP status of a server error response, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
