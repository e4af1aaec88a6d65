//! Wire types for the Readwise v2 highlights and books endpoints.

use serde::{Deserialize, Serialize};

/// One highlight as returned in a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightItem {
    /// The highlighted passage
    pub text: String,

    /// Title of the book or article, when the listing includes it
    #[serde(default)]
    pub title: Option<String>,

    /// Author of the book or article, when the listing includes it
    #[serde(default)]
    pub author: Option<String>,

    /// Identifier of the parent book record
    #[serde(default)]
    pub book_id: Option<u64>,
}

impl HighlightItem {
    /// Create a highlight with only its text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
            author: None,
            book_id: None,
        }
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the parent book id
    pub fn book_id(mut self, book_id: u64) -> Self {
        self.book_id = Some(book_id);
        self
    }

    /// Whether attribution is incomplete and a parent record can fill it
    pub fn wants_book_lookup(&self) -> bool {
        (self.author.is_none() || self.title.is_none()) && self.book_id.is_some()
    }
}

/// A page of the highlights listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightPage {
    /// Total number of highlights in the library
    pub count: u64,

    /// Highlights on this page
    pub results: Vec<HighlightItem>,
}

impl HighlightPage {
    pub fn new(count: u64, results: Vec<HighlightItem>) -> Self {
        Self { count, results }
    }
}

/// Parent book record, used to fill in missing attribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
}
