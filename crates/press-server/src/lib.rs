//! Press Server
//!
//! Single-port HTTP front end for the render service (tiny_http).
//!
//! # Endpoints
//! - `POST /render`: JSON `{html, css, page, options}` or a `text/html` body
//! - `POST /ebook`: e-book outline and lesson content
//! - `GET /health`: status and worker pool load
//!
//! Requests are served by a fixed set of handler threads, one more than
//! the render service can hold, so a full service is reported as 503
//! rather than leaving connections waiting in the accept queue.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use press_engine::RenderService;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("failed to start handler thread: {0}")]
    Thread(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// A bound, not yet serving, HTTP server
pub struct PressServer {
    http: Arc<tiny_http::Server>,
    service: Arc<RenderService>,
    threads: usize,
}

impl std::fmt::Debug for PressServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressServer")
            .field("addr", &self.local_addr())
            .field("threads", &self.threads)
            .finish()
    }
}

impl PressServer {
    /// Bind `addr` (for example `0.0.0.0:8080`, or port 0 for any free port)
    pub fn bind(addr: &str, service: RenderService) -> Result<Self> {
        let http = tiny_http::Server::http(addr).map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        let threads = service.config().capacity() + 1;
        Ok(Self {
            http: Arc::new(http),
            service: Arc::new(service),
            threads,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.http.server_addr().to_ip()
    }

    /// Start the handler threads and return immediately
    pub fn spawn(self) -> Result<ServerHandle> {
        let addr = self.local_addr();
        let handles = (0..self.threads)
            .map(|i| {
                let http = Arc::clone(&self.http);
                let service = Arc::clone(&self.service);
                thread::Builder::new()
                    .name(format!("press-http-{i}"))
                    .spawn(move || serve(&http, &service))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        match addr {
            Some(addr) => tracing::info!("listening on http://{} with {} handler threads", addr, handles.len()),
            None => tracing::info!("listening with {} handler threads", handles.len()),
        }
        Ok(ServerHandle {
            http: self.http,
            handles,
            addr,
        })
    }

    /// Serve until the process exits
    pub fn run(self) -> Result<()> {
        let handle = self.spawn()?;
        handle.join();
        Ok(())
    }
}

fn serve(http: &tiny_http::Server, service: &RenderService) {
    loop {
        match http.recv() {
            Ok(request) => routes::handle(service, request),
            Err(e) => {
                tracing::debug!("handler stopping: {}", e);
                break;
            }
        }
    }
}

/// Running server
pub struct ServerHandle {
    http: Arc<tiny_http::Server>,
    handles: Vec<JoinHandle<()>>,
    addr: Option<SocketAddr>,
}

impl ServerHandle {
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Stop accepting requests and wait for in-flight ones
    pub fn shutdown(self) {
        for _ in &self.handles {
            self.http.unblock();
        }
        self.join();
    }

    fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("HTTP handler thread panicked");
            }
        }
    }
}
