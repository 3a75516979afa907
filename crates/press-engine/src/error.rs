//! Render errors
//!
//! Every component error ends up as a [`RenderError`]: a coarse kind the
//! HTTP layer can map to a status code, the pipeline stage it came from,
//! and a one-line summary.

use std::fmt;

use press_css::CssError;
use press_html::HtmlError;
use press_layout::LayoutError;
use press_render::PaintError;
use press_text::TextError;
use serde::Serialize;

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Layout,
    Paint,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Layout => "layout",
            Self::Paint => "paint",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    FontResolution,
    LayoutOverflow,
    CapacityExceeded,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::FontResolution => "FontResolution",
            Self::LayoutOverflow => "LayoutOverflow",
            Self::CapacityExceeded => "CapacityExceeded",
            Self::Timeout => "Timeout",
            Self::Internal => "Internal",
        }
    }

    /// HTTP status for this kind
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::CapacityExceeded => 503,
            Self::Timeout => 504,
            Self::FontResolution | Self::LayoutOverflow | Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}{}: {message}", .stage.map(|s| format!(" in {s} stage")).unwrap_or_default())]
pub struct RenderError {
    pub kind: ErrorKind,
    pub stage: Option<Stage>,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapacityExceeded, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }
}

impl From<HtmlError> for RenderError {
    fn from(err: HtmlError) -> Self {
        let kind = match err {
            HtmlError::EmptyDocument => ErrorKind::InvalidInput,
            HtmlError::Io(_) => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string()).at(Stage::Parse)
    }
}

impl From<CssError> for RenderError {
    fn from(err: CssError) -> Self {
        Self::invalid_input(err.to_string()).at(Stage::Parse)
    }
}

impl From<TextError> for RenderError {
    fn from(err: TextError) -> Self {
        let kind = match err {
            TextError::FontResolution { .. } => ErrorKind::FontResolution,
            TextError::FontParsing(_) | TextError::ShapingFailed(_) => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string()).at(Stage::Layout)
    }
}

impl From<LayoutError> for RenderError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::InvalidGeometry { .. } => Self::invalid_input(err.to_string()).at(Stage::Layout),
            LayoutError::DeadlineExceeded => Self::timeout(err.to_string()).at(Stage::Layout),
        }
    }
}

impl From<PaintError> for RenderError {
    fn from(err: PaintError) -> Self {
        let kind = match err {
            PaintError::DeadlineExceeded => ErrorKind::Timeout,
            PaintError::NoPages | PaintError::ImageDecode { .. } => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string()).at(Stage::Paint)
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_stage() {
        let err = RenderError::invalid_input("bad size").at(Stage::Layout);
        assert_eq!(err.to_string(), "InvalidInput in layout stage: bad size");
        assert_eq!(RenderError::timeout("slow").to_string(), "Timeout: slow");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(RenderError::invalid_input("x").http_status(), 400);
        assert_eq!(RenderError::capacity_exceeded("x").http_status(), 503);
        assert_eq!(RenderError::timeout("x").http_status(), 504);
        assert_eq!(RenderError::internal("x").http_status(), 500);
    }

    #[test]
    fn test_component_errors_carry_stage() {
        let err: RenderError = HtmlError::EmptyDocument.into();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.stage, Some(Stage::Parse));

        let err: RenderError = PaintError::NoPages.into();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.stage, Some(Stage::Paint));

        let err: RenderError = PaintError::DeadlineExceeded.into();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.stage, Some(Stage::Paint));

        let err: RenderError = LayoutError::DeadlineExceeded.into();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.stage, Some(Stage::Layout));

        let err: RenderError = TextError::FontResolution {
            families: vec!["Nope".into()],
            weight: 400,
        }
        .into();
        assert_eq!(err.kind, ErrorKind::FontResolution);
    }
}
