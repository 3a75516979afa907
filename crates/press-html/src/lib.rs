//! Press HTML Parser
//!
//! HTML5 parsing built on html5ever. Malformed markup is repaired by the
//! tree builder (unclosed tags are closed at end of input, misnested tags
//! are rearranged); only an empty document is rejected.

mod parser;

pub use parser::HtmlParser;

use press_dom::Document;
use thiserror::Error;

/// Parse an HTML string into a [`Document`]
pub fn parse(html: &str) -> Result<Document> {
    HtmlParser::new().parse(html)
}

/// Markup parse errors
#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HtmlError>;
