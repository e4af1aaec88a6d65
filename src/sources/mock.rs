//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::models::{BookDetails, Credential, HighlightItem, HighlightPage};
use crate::sources::{HighlightSource, SourceError};

/// A request observed by [`MockSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    List { page: Option<u64>, page_size: u32 },
    Book(u64),
}

/// An in-memory highlight library that records every request.
///
/// Listings are served by slicing the configured highlights into pages.
#[derive(Debug, Default)]
pub struct MockSource {
    highlights: Mutex<Vec<HighlightItem>>,
    reported_count: Mutex<Option<u64>>,
    books: Mutex<HashMap<u64, BookDetails>>,
    list_error: Mutex<Option<SourceError>>,
    book_error: Mutex<Option<SourceError>>,
    page_gate: Mutex<Option<Arc<Notify>>>,
    count_gate: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockSource {
    /// Create an empty mock library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock library holding the given highlights.
    pub fn with_highlights(highlights: Vec<HighlightItem>) -> Self {
        let source = Self::new();
        source.set_highlights(highlights);
        source
    }

    pub fn set_highlights(&self, highlights: Vec<HighlightItem>) {
        *self.highlights.lock().unwrap() = highlights;
    }

    /// Report this total instead of the real number of highlights.
    pub fn set_reported_count(&self, count: u64) {
        *self.reported_count.lock().unwrap() = Some(count);
    }

    pub fn add_book(&self, book_id: u64, title: &str, author: &str) {
        self.books.lock().unwrap().insert(
            book_id,
            BookDetails {
                title: title.to_string(),
                author: author.to_string(),
            },
        );
    }

    /// Fail every listing request with this error.
    pub fn fail_listings(&self, error: SourceError) {
        *self.list_error.lock().unwrap() = Some(error);
    }

    /// Fail every book request with this error.
    pub fn fail_books(&self, error: SourceError) {
        *self.book_error.lock().unwrap() = Some(error);
    }

    /// Hold page requests (those with a page number) until the returned
    /// handle is notified.
    pub fn gate_pages(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.page_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold the next count request (no page number) until the returned
    /// handle is notified. Later count requests are not held.
    pub fn gate_next_count(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.count_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of listing requests made without a page number.
    pub fn count_requests(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::List { page: None, .. }))
            .count()
    }

    pub fn book_requests(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Book(_)))
            .count()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HighlightSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn list_highlights(
        &self,
        credential: &Credential,
        page: Option<u64>,
        page_size: u32,
    ) -> Result<HighlightPage, SourceError> {
        self.record(MockCall::List { page, page_size });

        let gate = match page {
            Some(_) => self.page_gate.lock().unwrap().clone(),
            None => self.count_gate.lock().unwrap().take(),
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if credential.is_absent() {
            return Err(SourceError::CredentialMissing);
        }
        if let Some(error) = self.list_error.lock().unwrap().clone() {
            return Err(error);
        }

        let highlights = self.highlights.lock().unwrap();
        let size = page_size.max(1) as usize;
        let start = (page.unwrap_or(1).max(1) as usize - 1).saturating_mul(size);
        let results = highlights
            .iter()
            .skip(start)
            .take(size)
            .cloned()
            .collect();
        let count = self
            .reported_count
            .lock()
            .unwrap()
            .unwrap_or(highlights.len() as u64);

        Ok(HighlightPage::new(count, results))
    }

    async fn get_book(
        &self,
        credential: &Credential,
        book_id: u64,
    ) -> Result<BookDetails, SourceError> {
        self.record(MockCall::Book(book_id));

        if credential.is_absent() {
            return Err(SourceError::CredentialMissing);
        }
        if let Some(error) = self.book_error.lock().unwrap().clone() {
            return Err(error);
        }

        self.books
            .lock()
            .unwrap()
            .get(&book_id)
            .cloned()
            .ok_or_else(|| SourceError::from_status(404, format!("No book {}", book_id)))
    }
}

/// Helper to build `count` highlights with no attribution.
pub fn make_highlights(count: usize) -> Vec<HighlightItem> {
    (1..=count)
        .map(|i| HighlightItem::new(format!("Highlight {}", i)))
        .collect()
}
