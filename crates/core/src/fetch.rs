//! Page fetching.
//!
//! The network pieces live behind the `fetch` feature; file and stdin input
//! are always available so the library stays useful offline.

use std::io::Read;
use std::path::Path;

use crate::{LensError, Result};

/// Configuration for HTTP fetching.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header sent with requests.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: format!("lens/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One fetched page: status, the ETag header if the server sent one, and
/// the body text.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub body: String,
}

impl PageResponse {
    /// Whether the response is usable. A 304 counts as success since the
    /// duplicate-page check wants to see it.
    pub fn is_success(&self) -> bool {
        (self.status >= 200 && self.status < 300) || self.status == 304 || (self.status == 0 && !self.body.is_empty())
    }
}

/// Fetches a page, returning its status, ETag and body.
///
/// # Errors
///
/// Returns [`LensError::Timeout`] when the request exceeds the configured
/// timeout and [`LensError::HttpError`] for other transport failures.
#[cfg(feature = "fetch")]
pub async fn fetch_page(url: &str, config: &FetchConfig) -> Result<PageResponse> {
    use std::time::Duration;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .user_agent(&config.user_agent)
        .build()?;

    let response = client
        .get(url)
        .header("Accept", "text/html")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                LensError::Timeout { timeout: config.timeout }
            } else {
                LensError::HttpError(e)
            }
        })?;

    let status = response.status().as_u16();
    let etag = response
        .headers()
        .get(reqwest::header::ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;

    Ok(PageResponse { status, etag, body })
}

/// Fetches a URL and returns its body as HTML.
///
/// # Errors
///
/// Returns [`LensError::HttpStatus`] when the server answers with a
/// non-success status, besides the transport failures of [`fetch_page`].
#[cfg(feature = "fetch")]
pub async fn fetch_html(url: &str, config: &FetchConfig) -> Result<String> {
    let response = fetch_page(url, config).await?;
    if !response.is_success() {
        return Err(LensError::HttpStatus(response.status));
    }
    Ok(response.body)
}

/// Reads HTML from a local file.
pub fn fetch_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(LensError::FileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Reads HTML from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.starts_with("lens/"));
    }

    #[test]
    fn test_response_success_range() {
        let ok = PageResponse { status: 200, etag: None, body: String::new() };
        assert!(ok.is_success());
        let not_modified = PageResponse { status: 304, etag: None, body: String::new() };
        assert!(not_modified.is_success());
        let missing = PageResponse { status: 404, etag: None, body: String::new() };
        assert!(!missing.is_success());
        let local = PageResponse { status: 0, etag: None, body: "<html></html>".to_string() };
        assert!(local.is_success());
    }

    #[test]
    fn test_fetch_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<html><body>hi</body></html>").unwrap();
        let html = fetch_file(file.path()).unwrap();
        assert!(html.contains("hi"));
    }

    #[test]
    fn test_fetch_file_missing() {
        let err = fetch_file(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(matches!(err, LensError::FileNotFound(_)));
    }
}
