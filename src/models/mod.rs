//! Core data models: the published quote, the credential, and the wire
//! shapes returned by the highlights API.

mod credential;
mod highlight;
mod quote;

pub use credential::Credential;
pub use highlight::{BookDetails, HighlightItem, HighlightPage};
pub use quote::{Quote, EMPTY_LIBRARY_TEXT, EMPTY_PAGE_TEXT, UNKNOWN_AUTHOR, UNKNOWN_SOURCE};
