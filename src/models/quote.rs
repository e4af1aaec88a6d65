//! The quote handed to the display layer.

use serde::{Deserialize, Serialize};

/// Author shown when neither the highlight nor its book names one
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Source shown when neither the highlight nor its book has a title
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Placeholder text when the library has no highlights
pub const EMPTY_LIBRARY_TEXT: &str = "No highlights available in your library.";

/// Placeholder text when the sampled page came back empty
pub const EMPTY_PAGE_TEXT: &str = "Could not fetch a random highlight.";

/// A highlight with resolved attribution.
///
/// `author` and `source` are always populated for real highlights; they are
/// empty only on the placeholder quotes returned for an empty library or an
/// empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
    pub source: String,
}

impl Quote {
    pub fn new(
        text: impl Into<String>,
        author: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            source: source.into(),
        }
    }

    /// Build a quote, substituting the unknown placeholders for missing fields
    pub fn attributed(text: impl Into<String>, author: Option<String>, title: Option<String>) -> Self {
        Self {
            text: text.into(),
            author: author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            source: title.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        }
    }

    /// Placeholder for a library with zero highlights
    pub fn empty_library() -> Self {
        Self::new(EMPTY_LIBRARY_TEXT, "", "")
    }

    /// Placeholder for a sampled page that contained no highlights
    pub fn empty_page() -> Self {
        Self::new(EMPTY_PAGE_TEXT, "", "")
    }

    /// Whether this is one of the empty-state placeholders
    pub fn is_placeholder(&self) -> bool {
        self.author.is_empty() && self.source.is_empty()
    }
}
