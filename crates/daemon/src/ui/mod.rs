//! User-facing surfaces of the PassView daemon.
//!
//! This module holds the single-page browser client served at `/` and the
//! signal handling that ends the process gracefully.

pub mod signal;

pub use signal::SignalHandler;

/// The embedded browser client.
pub const INDEX_HTML: &str = include_str!("index.html");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_uses_api() {
        assert!(INDEX_HTML.starts_with("<!DOCTYPE html>"));
        assert!(INDEX_HTML.contains("/api/tree"));
        assert!(INDEX_HTML.contains("/api/search"));
        assert!(INDEX_HTML.contains("/api/decrypt"));
    }
}
