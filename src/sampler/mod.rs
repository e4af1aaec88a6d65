//! Random highlight sampling over a paginated collection.
//!
//! The highlights API has no "random item" endpoint, so a quote is drawn in
//! two steps: pick a page uniformly from `1..=ceil(count / page_size)`, then
//! pick an item uniformly from that page. The collection size comes from a
//! [`CountCache`] that costs one `page_size=1` request per API key.

mod count_cache;
mod quote_sampler;

pub use count_cache::CountCache;
pub use quote_sampler::{pick_page, total_pages, QuoteSampler, DEFAULT_PAGE_SIZE};
