//! Press Engine
//!
//! The render service: markup and CSS in, PDF bytes out.
//!
//! # Pipeline
//! - Parse markup (html5ever) and cascade styles
//! - Fetch referenced images
//! - Lay out into pages
//! - Paint the pages as PDF
//!
//! Jobs run on a bounded [`WorkerPool`]; a full pool rejects new work with
//! `CapacityExceeded` instead of queueing without limit.
//!
//! # Example
//! ```rust,ignore
//! use press_engine::{Config, RenderOptions, RenderService};
//!
//! let service = RenderService::new(Config::default())?;
//! let output = service.render("<h1>Hello</h1>".into(), None, RenderOptions::default())?;
//! std::fs::write("hello.pdf", &output.bytes)?;
//! ```

mod config;
mod error;
mod job;
mod options;
mod service;
pub mod ebook;
pub mod fetch;
pub mod pipeline;
pub mod pool;

pub use config::{Config, ConfigError};
pub use ebook::EbookRequest;
pub use error::{ErrorKind, RenderError, Result, Stage};
pub use fetch::Fetcher;
pub use job::{JobProgress, JobState, RenderJob};
pub use options::{MarginOption, PageOptions, PageSizeOption, RenderOptions};
pub use pipeline::{Pipeline, parse, render};
pub use pool::{PoolStats, WorkerPool};
pub use service::RenderService;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A finished render
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub content_type: &'static str,
    /// Problems repaired along the way
    pub warnings: Vec<String>,
}

impl RenderOutput {
    pub const CONTENT_TYPE: &'static str = "application/pdf";

    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }
}
