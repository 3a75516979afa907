//! Press CSS Parser & Style System
//!
//! Stylesheet parsing (lightningcss), selector matching, the cascade and
//! computed styles, plus `@page` rules for paged output.

mod cascade;
mod computed;
mod page;
mod parser;
mod selector;
mod shorthand;
mod ua;
pub mod values;

pub use cascade::{StyleResolver, StyledDocument};
pub use computed::{
    BorderStyle, ComputedStyle, Display, Edges, FontSlant, LineHeight, ListStyleType, TextAlign,
    TextDecoration, TextTransform, WhiteSpace,
};
pub use page::{ContentPart, MarginBox, MarginBoxPosition, PageGeometry, PageSetup, PageSize, parse_page_size};
pub use parser::CssParser;
pub use selector::{Selector, Specificity};
pub use ua::user_agent_stylesheet;
pub use values::{Color, Dimension, Length, LengthUnit};

use thiserror::Error;

/// Parse a CSS stylesheet
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    CssParser::new().parse(css)
}

/// Where a rule came from; later origins win ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    UserAgent,
    Author,
    Inline,
}

/// Parsed stylesheet
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    pub pages: Vec<PageRule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.pages.is_empty()
    }
}

/// Style rule: selectors plus their declarations
#[derive(Debug, Clone)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// `@page` rule with its margin boxes
#[derive(Debug, Clone, Default)]
pub struct PageRule {
    pub declarations: Vec<Declaration>,
    pub margin_boxes: Vec<(MarginBoxPosition, Vec<Declaration>)>,
}

/// CSS declaration (longhand property: value)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }
}

/// CSS parsing error
#[derive(Debug, Clone, Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },
}
