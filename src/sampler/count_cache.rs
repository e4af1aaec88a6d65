//! Memoized collection size.

use std::sync::{Mutex, MutexGuard};

use crate::models::Credential;
use crate::sources::{HighlightSource, SourceError};

#[derive(Debug, Clone)]
struct CachedCount {
    credential: Credential,
    count: u64,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<CachedCount>,
    /// Bumped by every reset
    epoch: u64,
}

/// Caches the total number of highlights for one API key.
///
/// An entry only answers for the key it was fetched with, so a count that
/// lands after the key was replaced is never served for the new key. A
/// fetch that was started before the last [`CountCache::reset`] is not
/// stored either, so it cannot displace the entry for the current key.
#[derive(Debug, Default)]
pub struct CountCache {
    slot: Mutex<Slot>,
}

impl CountCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cached count for `credential`, if any
    pub fn get(&self, credential: &Credential) -> Option<u64> {
        self.slot()
            .entry
            .as_ref()
            .filter(|cached| &cached.credential == credential)
            .map(|cached| cached.count)
    }

    /// Whether any count is cached
    pub fn is_set(&self) -> bool {
        self.slot().entry.is_some()
    }

    /// Forget the cached count
    pub fn reset(&self) {
        let mut slot = self.slot();
        slot.entry = None;
        slot.epoch += 1;
    }

    fn epoch(&self) -> u64 {
        self.slot().epoch
    }

    /// Store `count` unless the cache was reset after `epoch`
    fn store(&self, epoch: u64, credential: &Credential, count: u64) -> bool {
        let mut slot = self.slot();
        if slot.epoch != epoch {
            return false;
        }
        slot.entry = Some(CachedCount {
            credential: credential.clone(),
            count,
        });
        true
    }

    /// Return the collection size, fetching it on a cache miss.
    ///
    /// A miss issues one listing request with `page_size=1` and reads its
    /// `count` field. Errors from the source propagate unchanged.
    pub async fn ensure_count(
        &self,
        source: &dyn HighlightSource,
        credential: &Credential,
    ) -> Result<u64, SourceError> {
        if credential.is_absent() {
            return Err(SourceError::CredentialMissing);
        }

        if let Some(count) = self.get(credential) {
            tracing::debug!("Using cached highlight count: {}", count);
            return Ok(count);
        }

        let epoch = self.epoch();
        tracing::debug!("Fetching total highlight count from {}", source.name());
        let page = source.list_highlights(credential, None, 1).await?;

        if self.store(epoch, credential, page.count) {
            tracing::info!("Total highlight count fetched and cached: {}", page.count);
        } else {
            tracing::debug!("Cache was reset during the count request; not storing");
        }
        Ok(page.count)
    }
}
