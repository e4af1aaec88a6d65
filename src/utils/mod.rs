//! Utility modules shared by the library and the binary.
//!
//! - [`HttpClient`]: shared reqwest client with an optional timeout
//! - [`render_plain`], [`render_styled`], [`render_json`]: quote rendering
//!   for terminals and pipes

mod display;
mod http;

pub use display::{
    is_terminal, render_json, render_plain, render_styled, wrap_text, DEFAULT_WIDTH, PALETTE_SIZE,
};
pub use http::HttpClient;
