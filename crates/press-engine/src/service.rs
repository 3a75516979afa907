//! Render Service
//!
//! Accepts render requests, runs them on the worker pool and waits for the
//! result up to the configured job timeout.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

use press_text::FontContext;

use crate::config::Config;
use crate::ebook::{self, EbookRequest};
use crate::error::{RenderError, Result};
use crate::job::RenderJob;
use crate::options::RenderOptions;
use crate::pipeline::Pipeline;
use crate::pool::{PoolStats, WorkerPool};
use crate::RenderOutput;

/// Thread-safe entry point for rendering
#[derive(Debug)]
pub struct RenderService {
    config: Config,
    pool: WorkerPool,
    pipeline: Arc<Pipeline>,
}

impl RenderService {
    /// Service using the process-wide font library
    pub fn new(config: Config) -> std::io::Result<Self> {
        let pipeline = Pipeline::new(&config);
        Self::with_pipeline(config, pipeline)
    }

    /// Service resolving fonts through `fonts`
    pub fn with_fonts(config: Config, fonts: FontContext) -> std::io::Result<Self> {
        let pipeline = Pipeline::with_fonts(&config, fonts);
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: Config, pipeline: Pipeline) -> std::io::Result<Self> {
        let pool = WorkerPool::new(config.workers, config.queue_depth)?;
        tracing::info!(
            "render service ready: {} workers, queue depth {}, job timeout {:?}",
            pool.worker_count(),
            config.queue_depth,
            config.job_timeout
        );
        Ok(Self {
            config,
            pool,
            pipeline: Arc::new(pipeline),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Render `markup` with an optional extra stylesheet
    ///
    /// Fails fast with `CapacityExceeded` when the pool is full, and with
    /// `Timeout` when the job does not finish within the job timeout.
    pub fn render(&self, markup: String, stylesheet: Option<String>, options: RenderOptions) -> Result<RenderOutput> {
        let timeout = self.config.job_timeout;
        let job = RenderJob::new(markup, stylesheet, options).with_deadline(Instant::now() + timeout);
        let id = job.id();
        let progress = job.progress();

        let (tx, rx) = mpsc::channel();
        let pipeline = Arc::clone(&self.pipeline);
        self.pool.try_submit(move || {
            let mut job = job;
            let result = pipeline.run(&mut job);
            // The caller may have given up already
            let _ = tx.send(result);
        })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let stage = progress.stage();
                tracing::warn!("job {} timed out after {:?} in {} stage", id, timeout, stage);
                Err(RenderError::timeout(format!("render did not finish within {} ms", timeout.as_millis())).at(stage))
            }
            Err(RecvTimeoutError::Disconnected) => Err(RenderError::internal("render worker stopped unexpectedly")),
        }
    }

    /// Build the e-book document for `request` and render it
    pub fn render_ebook(&self, request: &EbookRequest) -> Result<RenderOutput> {
        request.validate()?;
        let markup = ebook::build_html(request);
        let options = RenderOptions {
            title: Some(request.outline.course_title.clone()),
            ..RenderOptions::default()
        };
        self.render(markup, None, options)
    }
}
