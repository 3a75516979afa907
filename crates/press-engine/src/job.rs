//! Render jobs and their lifecycle

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{ErrorKind, RenderError, Result, Stage};
use crate::options::RenderOptions;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a render job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Received,
    Parsing,
    LayingOut,
    Painting,
    Completed,
    Failed,
}

impl JobState {
    /// Whether `next` may follow this state
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Completed | Failed, _) => false,
            (_, Failed) => true,
            (Received, Parsing) | (Parsing, LayingOut) | (LayingOut, Painting) | (Painting, Completed) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stage errors raised in this state belong to
    pub fn stage(self) -> Option<Stage> {
        match self {
            Self::Parsing => Some(Stage::Parse),
            Self::LayingOut => Some(Stage::Layout),
            Self::Painting => Some(Stage::Paint),
            _ => None,
        }
    }
}

/// Last pipeline stage a job entered, readable from other threads
#[derive(Debug, Clone, Default)]
pub struct JobProgress(Arc<AtomicU8>);

impl JobProgress {
    const PARSE: u8 = 0;
    const LAYOUT: u8 = 1;
    const PAINT: u8 = 2;

    fn record(&self, stage: Stage) {
        let code = match stage {
            Stage::Parse => Self::PARSE,
            Stage::Layout => Self::LAYOUT,
            Stage::Paint => Self::PAINT,
        };
        self.0.store(code, Ordering::Release);
    }

    /// Stage the job is in or stopped in; a job still waiting for a worker
    /// reports `Parse`
    pub fn stage(&self) -> Stage {
        match self.0.load(Ordering::Acquire) {
            Self::LAYOUT => Stage::Layout,
            Self::PAINT => Stage::Paint,
            _ => Stage::Parse,
        }
    }
}

/// One request to render markup
#[derive(Debug)]
pub struct RenderJob {
    id: u64,
    pub markup: String,
    pub stylesheet: Option<String>,
    pub options: RenderOptions,
    state: JobState,
    created: Instant,
    deadline: Option<Instant>,
    progress: JobProgress,
}

impl RenderJob {
    pub fn new(markup: impl Into<String>, stylesheet: Option<String>, options: RenderOptions) -> Self {
        Self {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            markup: markup.into(),
            stylesheet,
            options,
            state: JobState::Received,
            created: Instant::now(),
            deadline: None,
            progress: JobProgress::default(),
        }
    }

    /// Abort between stages once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Handle for watching the job's stage after it moves to a worker
    pub fn progress(&self) -> JobProgress {
        self.progress.clone()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.created.elapsed()
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn advance(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(RenderError::internal(format!(
                "job {} cannot move from {:?} to {:?}",
                self.id, self.state, next
            )));
        }
        tracing::debug!("job {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        if let Some(stage) = next.stage() {
            self.progress.record(stage);
        }
        Ok(())
    }

    /// Mark the job failed; returns the error with the current stage attached
    pub fn fail(&mut self, mut err: RenderError) -> RenderError {
        if err.stage.is_none() {
            err.stage = self.state.stage();
        }
        if !self.state.is_terminal() {
            self.state = JobState::Failed;
        }
        match err.kind {
            ErrorKind::InvalidInput => tracing::info!("job {} rejected: {}", self.id, err),
            _ => tracing::warn!("job {} failed after {:?}: {}", self.id, self.elapsed(), err),
        }
        err
    }

    /// Timeout error when the deadline has passed
    pub fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                let mut err = RenderError::timeout(format!("job {} exceeded its time limit", self.id));
                err.stage = self.state.stage();
                Err(err)
            }
            _ => Ok(()),
        }
    }
}
