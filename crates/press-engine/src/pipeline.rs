//! The render pipeline: parse, lay out, paint
//!
//! Runs synchronously on the calling thread. Each stage moves the job to
//! its next state. The job's deadline is checked between stages and inside
//! image loading, layout and paint, so a slow render is abandoned without
//! producing partial output.

use press_css::{StyleResolver, StyledDocument, parse_stylesheet};
use press_layout::LayoutEngine;
use press_render::{PaintOptions, Painter};
use press_text::FontContext;

use crate::config::Config;
use crate::error::{RenderError, Result, Stage};
use crate::fetch::Fetcher;
use crate::job::{JobState, RenderJob};
use crate::options::RenderOptions;
use crate::RenderOutput;

/// Parse markup and style it with its embedded `<style>` blocks followed
/// by `stylesheet`
pub fn parse(markup: &str, stylesheet: Option<&str>) -> Result<StyledDocument> {
    parse_with_warnings(markup, stylesheet, &mut Vec::new())
}

fn parse_with_warnings(markup: &str, stylesheet: Option<&str>, warnings: &mut Vec<String>) -> Result<StyledDocument> {
    if markup.trim().is_empty() {
        return Err(RenderError::invalid_input("markup is empty").at(Stage::Parse));
    }
    let document = press_html::parse(markup)?;

    let mut resolver = StyleResolver::new();
    for (i, css) in document.style_sheets().iter().enumerate() {
        match parse_stylesheet(css) {
            Ok(sheet) => resolver.add_stylesheet(sheet),
            Err(e) => {
                tracing::warn!("ignoring <style> block {}: {}", i + 1, e);
                warnings.push(format!("<style> block {} ignored: {e}", i + 1));
            }
        }
    }
    if let Some(css) = stylesheet.filter(|css| !css.trim().is_empty()) {
        resolver.add_stylesheet(parse_stylesheet(css)?);
    }
    Ok(resolver.resolve(document))
}

/// Render with default configuration, system fonts and no deadline
pub fn render(markup: &str, stylesheet: Option<&str>, options: &RenderOptions) -> Result<RenderOutput> {
    let pipeline = Pipeline::new(&Config::default());
    let mut job = RenderJob::new(markup, stylesheet.map(str::to_string), options.clone());
    pipeline.run(&mut job)
}

/// Everything a job needs besides its own input
#[derive(Debug, Clone)]
pub struct Pipeline {
    fonts: FontContext,
    fetcher: Fetcher,
    default_page: press_css::PageGeometry,
    compress: bool,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_fonts(config, FontContext::global())
    }

    pub fn with_fonts(config: &Config, fonts: FontContext) -> Self {
        Self {
            fonts,
            fetcher: Fetcher::new(config),
            default_page: config.page,
            compress: config.compress,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Run `job` to completion or failure
    pub fn run(&self, job: &mut RenderJob) -> Result<RenderOutput> {
        tracing::info!("job {}: rendering {} bytes of markup", job.id(), job.markup.len());
        match self.execute(job) {
            Ok(output) => {
                job.advance(JobState::Completed)?;
                tracing::info!(
                    "job {}: {} page(s), {} bytes in {:?}",
                    job.id(),
                    output.page_count,
                    output.bytes.len(),
                    job.elapsed()
                );
                Ok(output)
            }
            Err(e) => Err(job.fail(e)),
        }
    }

    fn execute(&self, job: &mut RenderJob) -> Result<RenderOutput> {
        if job.markup.trim().is_empty() {
            return Err(RenderError::invalid_input("markup is empty").at(Stage::Parse));
        }
        job.options
            .geometry(self.default_page)
            .map_err(|e| e.at(Stage::Layout))?;
        let mut warnings = Vec::new();

        job.advance(JobState::Parsing)?;
        let mut styled = parse_with_warnings(&job.markup, job.stylesheet.as_deref(), &mut warnings)?;
        job.check_deadline()?;

        job.advance(JobState::LayingOut)?;
        let base = if styled.page_setup().geometry == press_css::PageGeometry::default() {
            self.default_page
        } else {
            styled.page_setup().geometry
        };
        let geometry = job.options.geometry(base)?;
        styled.set_page_geometry(geometry);

        let (resources, fetch_warnings) = self.fetcher.collect_until(styled.document(), job.deadline());
        warnings.extend(fetch_warnings);
        job.check_deadline()?;

        let mut engine = LayoutEngine::new(&self.fonts).with_images(&resources);
        if let Some(deadline) = job.deadline() {
            engine = engine.with_deadline(deadline);
        }
        let layout = engine.layout(&styled, geometry)?;
        for overflow in &layout.overflows {
            tracing::warn!("job {}: node {:?} taller than a page ({:.1}pt)", job.id(), overflow.node, overflow.height);
        }
        warnings.extend(layout.warnings.iter().cloned());
        job.check_deadline()?;

        job.advance(JobState::Painting)?;
        let options = PaintOptions {
            compress: job.options.compress.unwrap_or(self.compress),
            title: job.options.title.clone().or_else(|| styled.title()),
        };
        let mut painter = Painter::new(options);
        if let Some(deadline) = job.deadline() {
            painter = painter.with_deadline(deadline);
        }
        let bytes = painter.paint(&layout.pages, &resources)?;
        job.check_deadline()?;

        Ok(RenderOutput {
            bytes,
            page_count: layout.page_count(),
            content_type: RenderOutput::CONTENT_TYPE,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::time::Instant;

    fn pipeline() -> Pipeline {
        Pipeline::with_fonts(&Config::default(), FontContext::builtin_only()).with_fetcher(Fetcher::offline())
    }

    fn job(markup: &str) -> RenderJob {
        RenderJob::new(markup, None, RenderOptions::default())
    }

    #[test]
    fn test_parse_applies_request_stylesheet_last() {
        let styled = parse("<style>p { color: red }</style><p>x</p>", Some("p { color: blue }")).unwrap();
        let p = styled.tree().descendants(styled.tree().root()).into_iter().find(|n| {
            styled.tree().element(*n).is_some_and(|e| e.tag_name() == "p")
        });
        let style = styled.style(p.unwrap()).unwrap();
        assert_eq!(style.color, press_css::Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_empty_markup_is_invalid_input() {
        let err = parse("   \n", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let mut job = job("");
        let err = pipeline().run(&mut job).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.stage, Some(Stage::Parse));
        assert_eq!(job.state(), JobState::Failed);
    }

    #[test]
    fn test_completed_job() {
        let mut job = job("<h1>Report</h1><p>Body text.</p>");
        let output = pipeline().run(&mut job).unwrap();
        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(output.page_count, 1);
        assert_eq!(output.content_type, "application/pdf");
        assert!(output.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_invalid_page_options_fail_before_parsing() {
        let options: RenderOptions = serde_json::from_str(r#"{"page": {"size": [10, 10], "margins": 20}}"#).unwrap();
        let mut job = RenderJob::new("<p>x</p>", None, options);
        let err = pipeline().run(&mut job).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.stage, Some(Stage::Layout));
        assert_eq!(job.state(), JobState::Failed);
    }

    #[test]
    fn test_expired_deadline_times_out() {
        let mut job = job("<p>late</p>").with_deadline(Instant::now());
        let err = pipeline().run(&mut job).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.stage, Some(Stage::Parse));
    }

    #[test]
    fn test_page_rule_used_when_options_silent() {
        let markup = "<style>@page { size: letter }</style><p>x</p>";
        let mut job = job(markup);
        let output = pipeline().run(&mut job).unwrap();
        assert!(String::from_utf8_lossy(&output.bytes).contains("/MediaBox [0 0 612 792]"));
    }
}
