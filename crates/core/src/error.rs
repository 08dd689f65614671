//! Error types for lens operations.
//!
//! This module defines the main error type [`LensError`] which represents
//! all possible errors that can occur during content extraction, fetching,
//! and parsing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations.
///
/// # Example
///
/// ```rust
/// use lens_core::{LensError, parse};
///
/// match parse("<html><body><p>too short</p></body></html>") {
///     Ok(article) => println!("{}", article.text_content),
///     Err(LensError::NoContent) => println!("nothing worth reading here"),
///     Err(e) => println!("error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum LensError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and other
    /// HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Server answered with a non-success status code.
    #[error("Request failed with status {0}")]
    HttpStatus(u16),

    /// HTML parsing errors.
    ///
    /// Returned when HTML cannot be parsed into a working tree, often due to
    /// a document with no usable body element.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// No article content could be extracted from the document.
    ///
    /// This is the "no article" sentinel: the page's scorable text was below
    /// the baseline, no candidate survived scoring, or the cleaned result
    /// failed the yield check. The caller's document is left untouched.
    #[error("No article content could be extracted from the document")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for LensError.
pub type Result<T> = std::result::Result<T, LensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LensError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = LensError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_no_content_error() {
        let err = LensError::NoContent;
        assert!(err.to_string().contains("No article content"));
    }
}
