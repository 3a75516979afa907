//! Element kinds
//!
//! The set of elements the pipeline understands is closed; anything else is
//! kept as [`ElementKind::Other`] and styled purely by the cascade.

/// Kind of an element, derived from its tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Html,
    Head,
    Body,
    Title,
    Meta,
    Link,
    Style,
    Script,
    Div,
    P,
    Span,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Ul,
    Ol,
    Li,
    A,
    Img,
    Br,
    Hr,
    Strong,
    B,
    Em,
    I,
    U,
    S,
    Small,
    Code,
    Pre,
    Blockquote,
    Section,
    Article,
    Header,
    Footer,
    Nav,
    Main,
    Aside,
    Figure,
    Figcaption,
    Table,
    Thead,
    Tbody,
    Tr,
    Td,
    Th,
    Other(String),
}

impl ElementKind {
    /// Map a tag name (any case) to its kind
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "html" => Self::Html,
            "head" => Self::Head,
            "body" => Self::Body,
            "title" => Self::Title,
            "meta" => Self::Meta,
            "link" => Self::Link,
            "style" => Self::Style,
            "script" => Self::Script,
            "div" => Self::Div,
            "p" => Self::P,
            "span" => Self::Span,
            "h1" => Self::H1,
            "h2" => Self::H2,
            "h3" => Self::H3,
            "h4" => Self::H4,
            "h5" => Self::H5,
            "h6" => Self::H6,
            "ul" => Self::Ul,
            "ol" => Self::Ol,
            "li" => Self::Li,
            "a" => Self::A,
            "img" => Self::Img,
            "br" => Self::Br,
            "hr" => Self::Hr,
            "strong" => Self::Strong,
            "b" => Self::B,
            "em" => Self::Em,
            "i" => Self::I,
            "u" => Self::U,
            "s" => Self::S,
            "small" => Self::Small,
            "code" => Self::Code,
            "pre" => Self::Pre,
            "blockquote" => Self::Blockquote,
            "section" => Self::Section,
            "article" => Self::Article,
            "header" => Self::Header,
            "footer" => Self::Footer,
            "nav" => Self::Nav,
            "main" => Self::Main,
            "aside" => Self::Aside,
            "figure" => Self::Figure,
            "figcaption" => Self::Figcaption,
            "table" => Self::Table,
            "thead" => Self::Thead,
            "tbody" => Self::Tbody,
            "tr" => Self::Tr,
            "td" => Self::Td,
            "th" => Self::Th,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical lowercase tag name
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Html => "html",
            Self::Head => "head",
            Self::Body => "body",
            Self::Title => "title",
            Self::Meta => "meta",
            Self::Link => "link",
            Self::Style => "style",
            Self::Script => "script",
            Self::Div => "div",
            Self::P => "p",
            Self::Span => "span",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::A => "a",
            Self::Img => "img",
            Self::Br => "br",
            Self::Hr => "hr",
            Self::Strong => "strong",
            Self::B => "b",
            Self::Em => "em",
            Self::I => "i",
            Self::U => "u",
            Self::S => "s",
            Self::Small => "small",
            Self::Code => "code",
            Self::Pre => "pre",
            Self::Blockquote => "blockquote",
            Self::Section => "section",
            Self::Article => "article",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Nav => "nav",
            Self::Main => "main",
            Self::Aside => "aside",
            Self::Figure => "figure",
            Self::Figcaption => "figcaption",
            Self::Table => "table",
            Self::Thead => "thead",
            Self::Tbody => "tbody",
            Self::Tr => "tr",
            Self::Td => "td",
            Self::Th => "th",
            Self::Other(name) => name,
        }
    }

    /// Elements whose content is never rendered
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            Self::Head | Self::Title | Self::Meta | Self::Link | Self::Style | Self::Script
        )
    }

    /// Void elements never have children
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Img | Self::Br | Self::Hr | Self::Meta | Self::Link)
    }

    /// Heading level (1-6), if this is a heading
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            _ => None,
        }
    }
}
