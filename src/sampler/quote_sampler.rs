//! Quote retrieval.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard};

use super::CountCache;
use crate::config::Config;
use crate::models::{BookDetails, Credential, Quote};
use crate::sources::{HighlightSource, ReadwiseSource, SourceError};

/// Highlights requested per page when sampling
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Number of pages needed to hold `count` items
pub fn total_pages(count: u64, page_size: u32) -> u64 {
    count.div_ceil(u64::from(page_size.max(1)))
}

/// Draw a 1-based page number uniformly from `1..=max(1, total_pages)`
pub fn pick_page<R: Rng + ?Sized>(rng: &mut R, total_pages: u64) -> u64 {
    rng.gen_range(1..=total_pages.max(1))
}

#[derive(Debug)]
struct KeyState {
    credential: Credential,
    /// Bumped on every credential change
    generation: u64,
}

/// Draws random highlights from a [`HighlightSource`].
///
/// The sampler owns the current API key and the collection-size cache.
/// Retrievals take `&self`, so a host may replace the key while a retrieval
/// is still in flight; such a retrieval then fails with
/// [`SourceError::CredentialChanged`] instead of returning a quote fetched
/// under the old key.
#[derive(Debug)]
pub struct QuoteSampler {
    source: Arc<dyn HighlightSource>,
    page_size: u32,
    key: Mutex<KeyState>,
    count: CountCache,
}

impl QuoteSampler {
    pub fn new(source: Arc<dyn HighlightSource>, credential: impl Into<Credential>) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            key: Mutex::new(KeyState {
                credential: credential.into(),
                generation: 0,
            }),
            count: CountCache::new(),
        }
    }

    /// Build a sampler over the Readwise API from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let source = ReadwiseSource::from_config(&config.api)?;
        Ok(Self::new(Arc::new(source), config.api.credential())
            .with_page_size(config.sampling.page_size))
    }

    /// Set the page size used for sampling (minimum 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn source(&self) -> &dyn HighlightSource {
        self.source.as_ref()
    }

    fn key(&self) -> MutexGuard<'_, KeyState> {
        self.key.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current credential
    pub fn credential(&self) -> Credential {
        self.key().credential.clone()
    }

    /// The cached collection size for the current credential
    pub fn cached_count(&self) -> Option<u64> {
        let credential = self.credential();
        self.count.get(&credential)
    }

    /// Replace the API key.
    ///
    /// The new value is trimmed. Returns `false` and changes nothing when it
    /// equals the current key. Otherwise the key is replaced and the count
    /// cache reset; no retrieval is started.
    pub fn update_credential(&self, raw: &str) -> bool {
        let credential = Credential::new(raw);
        let mut key = self.key();
        if key.credential == credential {
            return false;
        }

        key.credential = credential;
        key.generation += 1;
        drop(key);

        self.count.reset();
        tracing::info!("API key updated; cached highlight count cleared");
        true
    }

    fn snapshot(&self) -> (Credential, u64) {
        let key = self.key();
        (key.credential.clone(), key.generation)
    }

    /// Hand back `quote` only if the key is unchanged since `generation`
    fn finish(&self, generation: u64, quote: Quote) -> Result<Quote, SourceError> {
        if self.key().generation != generation {
            tracing::debug!("Discarding quote fetched under a replaced API key");
            return Err(SourceError::CredentialChanged);
        }
        Ok(quote)
    }

    /// `CredentialChanged` if the key was replaced since `generation`, else `err`
    fn stale_or(&self, generation: u64, err: SourceError) -> SourceError {
        if self.key().generation != generation {
            tracing::debug!("Discarding error from a replaced API key: {}", err);
            return SourceError::CredentialChanged;
        }
        err
    }

    /// Total number of highlights in the library, cached per key
    pub async fn fetch_count(&self) -> Result<u64, SourceError> {
        let (credential, _) = self.snapshot();
        self.count
            .ensure_count(self.source.as_ref(), &credential)
            .await
    }

    /// Retrieve one random highlight as a [`Quote`].
    ///
    /// An empty library or an empty sampled page is not an error: both
    /// return a placeholder quote (see [`Quote::is_placeholder`]).
    pub async fn fetch_random_quote(&self) -> Result<Quote, SourceError> {
        let (credential, generation) = self.snapshot();
        if credential.is_absent() {
            return Err(SourceError::CredentialMissing);
        }

        let count = self
            .count
            .ensure_count(self.source.as_ref(), &credential)
            .await
            .map_err(|e| self.stale_or(generation, e))?;

        if count == 0 {
            tracing::info!("No highlights available in the library");
            return self.finish(generation, Quote::empty_library());
        }

        let pages = total_pages(count, self.page_size);
        let page = pick_page(&mut rand::thread_rng(), pages);
        tracing::debug!("Fetching page {}/{} from {}", page, pages, self.source.name());

        let listing = self
            .source
            .list_highlights(&credential, Some(page), self.page_size)
            .await
            .map_err(|e| self.stale_or(generation, e))?;

        let picked = listing.results.choose(&mut rand::thread_rng()).cloned();
        let Some(item) = picked else {
            tracing::warn!("Page {} came back without highlights", page);
            return self.finish(generation, Quote::empty_page());
        };

        let book = match item.book_id {
            Some(book_id) if item.wants_book_lookup() => {
                self.lookup_book(&credential, book_id).await
            }
            _ => None,
        };

        let mut author = item.author;
        let mut title = item.title;
        if let Some(book) = book {
            author = author.or(Some(book.author));
            title = title.or(Some(book.title));
        }

        let quote = Quote::attributed(item.text, author, title);
        let quote = self.finish(generation, quote)?;
        tracing::info!("Quote ready from page {}/{}", page, pages);
        Ok(quote)
    }

    /// Best-effort parent record lookup; every failure becomes `None`
    async fn lookup_book(&self, credential: &Credential, book_id: u64) -> Option<BookDetails> {
        tracing::debug!("Highlight missing attribution; looking up book {}", book_id);
        match self.source.get_book(credential, book_id).await {
            Ok(book) => Some(book),
            Err(e) => {
                tracing::warn!(
                    "Book lookup for {} failed, using fallback attribution: {}",
                    book_id,
                    e
                );
                None
            }
        }
    }
}
