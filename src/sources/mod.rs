//! Highlight sources behind a small trait-based seam.
//!
//! This module defines the [`HighlightSource`] trait that the sampler talks
//! to. [`ReadwiseSource`] implements it over the Readwise v2 REST API and
//! [`MockSource`] implements it in memory for tests, recording every call.
//!
//! # Error taxonomy
//!
//! Every failure is classified into one of the [`SourceError`] variants so
//! the hosting layer can decide what to show:
//!
//! - [`SourceError::CredentialMissing`] / [`SourceError::CredentialInvalid`]:
//!   prompt the user for a key
//! - [`SourceError::Transport`] / [`SourceError::Decode`]: try again later
//! - [`SourceError::CredentialChanged`]: a stale result was discarded, show nothing

pub mod mock;
mod readwise;

pub use mock::{MockCall, MockSource};
pub use readwise::{ReadwiseSource, READWISE_API_BASE};

use crate::models::{BookDetails, Credential, HighlightPage};
use async_trait::async_trait;

/// Read-only access to a paginated highlights collection.
#[async_trait]
pub trait HighlightSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Fetch one page of the highlights listing.
    ///
    /// `page` is 1-based; `None` omits the parameter and lets the server
    /// return its first page.
    async fn list_highlights(
        &self,
        credential: &Credential,
        page: Option<u64>,
        page_size: u32,
    ) -> Result<HighlightPage, SourceError>;

    /// Fetch the parent book record of a highlight
    async fn get_book(
        &self,
        credential: &Credential,
        book_id: u64,
    ) -> Result<BookDetails, SourceError>;
}

/// How the hosting layer should react to a [`SourceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The key is missing or rejected; ask the user for a new one
    Credential,
    /// Network, server or payload problem; a later attempt may succeed
    Retryable,
    /// The result belonged to a replaced key and was dropped
    Superseded,
}

/// Errors that can occur when retrieving highlights
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// No API key is configured
    #[error("No Readwise API key configured")]
    CredentialMissing,

    /// The service refused the key (401/403)
    #[error("Readwise rejected the API key (HTTP {status})")]
    CredentialInvalid { status: u16 },

    /// Network failure or a non-success status other than 401/403
    #[error("Transport error{}: {}", status_suffix(.status), .message)]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The API key was replaced while the request was in flight
    #[error("API key changed before the request completed")]
    CredentialChanged,
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (HTTP {})", code))
        .unwrap_or_default()
}

impl SourceError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => SourceError::CredentialInvalid { status },
            _ => SourceError::Transport {
                status: Some(status),
                message: message.into(),
            },
        }
    }

    /// A network-layer failure with no HTTP status
    pub fn network(message: impl Into<String>) -> Self {
        SourceError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::CredentialMissing | SourceError::CredentialInvalid { .. } => {
                ErrorKind::Credential
            }
            SourceError::Transport { .. } | SourceError::Decode(_) => ErrorKind::Retryable,
            SourceError::CredentialChanged => ErrorKind::Superseded,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return SourceError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => SourceError::from_status(status.as_u16(), err.to_string()),
            None => SourceError::network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(format!("JSON: {}", err))
    }
}
