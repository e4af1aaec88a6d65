//! Host-side state for a quote display.
//!
//! [`QuoteBoard`] is the collaborator that owns the last quote shown and
//! turns retrieval errors into user-facing guidance. The sampler itself
//! only returns values; publishing them is this type's job.

use crate::models::Quote;
use crate::sampler::QuoteSampler;
use crate::sources::{ErrorKind, SourceError};
use crate::utils::PALETTE_SIZE;

/// Shown when no API key is configured
pub const MISSING_KEY_MESSAGE: &str =
    "Add your Readwise API key (--api-key, READWISE_API_KEY or the config file) to see highlights.";

/// Shown when the service rejects the API key
pub const INVALID_KEY_MESSAGE: &str =
    "Readwise rejected your API key. Check it at https://readwise.io/access_token.";

/// Shown for network, server and payload failures
pub const RETRY_LATER_MESSAGE: &str = "Could not load a highlight right now. Will try again later.";

/// What caused a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First load after start-up or a key change
    Initial,
    /// Explicit user request
    Manual,
    /// Periodic timer
    Timer,
}

/// What the display should show besides the quote itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardStatus {
    /// Nothing fetched yet
    Loading,
    /// `current()` holds the latest quote
    Showing,
    /// The key is missing or invalid
    NeedsKey(String),
    /// A retryable failure occurred
    Unavailable(String),
}

impl BoardStatus {
    /// Map a retrieval error; `None` means the error should be ignored
    pub fn from_error(err: &SourceError) -> Option<Self> {
        match (err.kind(), err) {
            (ErrorKind::Credential, SourceError::CredentialMissing) => {
                Some(BoardStatus::NeedsKey(MISSING_KEY_MESSAGE.to_string()))
            }
            (ErrorKind::Credential, _) => {
                Some(BoardStatus::NeedsKey(INVALID_KEY_MESSAGE.to_string()))
            }
            (ErrorKind::Retryable, _) => {
                Some(BoardStatus::Unavailable(RETRY_LATER_MESSAGE.to_string()))
            }
            (ErrorKind::Superseded, _) => None,
        }
    }

    /// The guidance message, if this status carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            BoardStatus::NeedsKey(msg) | BoardStatus::Unavailable(msg) => Some(msg),
            BoardStatus::Loading | BoardStatus::Showing => None,
        }
    }
}

/// Last known quote plus display status for one sampler.
#[derive(Debug)]
pub struct QuoteBoard {
    sampler: QuoteSampler,
    current: Option<Quote>,
    status: BoardStatus,
    palette_index: usize,
}

impl QuoteBoard {
    pub fn new(sampler: QuoteSampler) -> Self {
        Self {
            sampler,
            current: None,
            status: BoardStatus::Loading,
            palette_index: 0,
        }
    }

    pub fn sampler(&self) -> &QuoteSampler {
        &self.sampler
    }

    /// The quote currently on display
    pub fn current(&self) -> Option<&Quote> {
        self.current.as_ref()
    }

    pub fn status(&self) -> &BoardStatus {
        &self.status
    }

    /// Accent slot, advanced after each successful non-initial refresh
    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    /// Run one retrieval and publish its outcome.
    ///
    /// On failure the previous quote stays on display. A result discarded
    /// because the key changed mid-flight leaves the board untouched.
    pub async fn refresh(&mut self, trigger: RefreshTrigger) -> &BoardStatus {
        match self.sampler.fetch_random_quote().await {
            Ok(quote) => {
                self.current = Some(quote);
                self.status = BoardStatus::Showing;
                if trigger != RefreshTrigger::Initial {
                    self.palette_index = (self.palette_index + 1) % PALETTE_SIZE;
                }
            }
            Err(e) => {
                tracing::warn!("Error fetching quote on {:?} refresh: {}", trigger, e);
                if let Some(status) = BoardStatus::from_error(&e) {
                    self.status = status;
                }
            }
        }
        &self.status
    }

    /// Push a new API key.
    ///
    /// When the key actually changes, the displayed quote is cleared so
    /// nothing fetched under the old key stays visible. Returns whether it
    /// changed; the caller decides when to refresh.
    pub fn set_credential(&mut self, raw: &str) -> bool {
        if !self.sampler.update_credential(raw) {
            return false;
        }
        self.current = None;
        self.status = BoardStatus::Loading;
        true
    }
}
