//! # Readwise Display
//!
//! Shows a random highlight from a Readwise library, with author and source
//! attribution, for a display surface such as a terminal.
//!
//! ## Architecture
//!
//! - [`models`]: Quote, Credential and the highlights API wire types
//! - [`sources`]: the [`HighlightSource`] seam, the Readwise HTTP source and a mock
//! - [`sampler`]: collection-size cache and the random quote sampler
//! - [`board`]: host-side holder of the last quote and its display status
//! - [`utils`]: HTTP client and terminal rendering
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! use readwise_display::config::load_env_config;
//! use readwise_display::sampler::QuoteSampler;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sampler = QuoteSampler::from_config(&load_env_config()?)?;
//! let quote = sampler.fetch_random_quote().await?;
//! println!("{}\n- {}, {}", quote.text, quote.author, quote.source);
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod config;
pub mod models;
pub mod sampler;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use board::{BoardStatus, QuoteBoard, RefreshTrigger};
pub use models::{Credential, Quote};
pub use sampler::QuoteSampler;
pub use sources::{HighlightSource, ReadwiseSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
