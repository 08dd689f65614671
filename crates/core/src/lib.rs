//! # lens-core
//!
//! Extracts the readable article from an HTML page: the main content block
//! is found by scoring paragraph density, link density and class/id hints,
//! then cleaned of chrome and junk. Multi-page articles are followed via
//! their next-page links and merged into a single document, and article
//! links can be rewritten into numbered footnotes.
//!
//! ## Quick start
//!
//! ```rust
//! use lens_core::Reader;
//!
//! # fn main() -> lens_core::Result<()> {
//! let html = std::fs::read_to_string("../../tests/fixtures/article.html")?;
//! let article = Reader::new().parse(&html)?;
//! println!("{}", article.title.unwrap_or_default());
//! println!("{} words", article.word_count);
//! # Ok(())
//! # }
//! ```
//!
//! Fetching from the network (with the default `fetch` feature):
//!
//! ```rust,no_run
//! # async fn example() -> lens_core::Result<()> {
//! let article = lens_core::fetch_and_parse("https://example.com/story").await?;
//! println!("{}", article.content);
//! # Ok(())
//! # }
//! ```

pub mod article;
pub mod clean;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod footnotes;
pub mod pagination;
pub mod patterns;
pub mod reader;
pub mod score;
pub mod text;
pub mod tree;

pub use article::{Article, ArticleBuilder, derive_title};
pub use error::{LensError, Result};
pub use fetch::{FetchConfig, PageResponse};
pub use footnotes::FootnoteRewriter;
pub use pagination::{DEFAULT_MAX_PAGES, Session, find_base_url};
pub use reader::{Reader, ReaderConfig, is_probably_readable, parse, parse_with_url};
pub use score::Flags;
pub use tree::{NodeData, NodeId, Tree};

#[cfg(feature = "fetch")]
pub use fetch::{fetch_html, fetch_page};
#[cfg(feature = "fetch")]
pub use reader::fetch_and_parse;
