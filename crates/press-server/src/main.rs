//! press-server binary
//!
//! Settings come from defaults, then `PRESS_*`/`PORT` environment
//! variables, then the flags below.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use press_engine::{Config, RenderService};
use press_server::PressServer;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "press-server", version, about = "Render HTML and CSS to PDF over HTTP")]
struct Cli {
    /// Interface to listen on
    #[arg(long, env = "PRESS_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Render worker threads (default: one per CPU core)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Jobs allowed to wait for a worker
    #[arg(long)]
    queue_depth: Option<usize>,

    /// Time limit per render, in milliseconds
    #[arg(long)]
    job_timeout_ms: Option<u64>,

    /// Time limit per remote image, in milliseconds
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    /// Directory relative image paths are read from
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// Refuse http(s) image URLs
    #[arg(long)]
    no_remote: bool,

    /// Write uncompressed content streams
    #[arg(long)]
    no_compress: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(depth) = self.queue_depth {
            config.queue_depth = depth;
        }
        if let Some(ms) = self.job_timeout_ms {
            config.job_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.fetch_timeout_ms {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(dir) = &self.asset_dir {
            config.asset_dir = Some(dir.clone());
        }
        if self.no_remote {
            config.allow_remote = false;
        }
        if self.no_compress {
            config.compress = false;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.apply(Config::from_env().context("invalid environment configuration")?);
    config.validate().context("invalid configuration")?;

    let fonts = press_text::FontLibrary::global();
    tracing::info!("font library ready: {} faces", fonts.len());

    let addr = format!("{}:{}", cli.host, config.port);
    let service = RenderService::new(config).context("failed to start render workers")?;
    let server = PressServer::bind(&addr, service)?;
    server.run()?;
    Ok(())
}
