//! Image fetching
//!
//! Collects the `<img>` sources of a document into a [`ResourceSet`] before
//! layout. Sources may be `data:` URIs, `http(s)` URLs (blocking reqwest with
//! a timeout) or paths inside the configured asset directory. A source that
//! cannot be loaded becomes a warning and the image is left out.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use press_dom::{Document, ElementKind};
use press_render::ResourceSet;
use reqwest::blocking::Client;

use crate::config::Config;

/// Largest image accepted from any source
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Image loading errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unsupported source scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("remote images are disabled")]
    RemoteDisabled,

    #[error("no asset directory configured")]
    NoAssetDir,

    #[error("path escapes the asset directory")]
    OutsideAssetDir,

    #[error("malformed data URI: {0}")]
    DataUri(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(u16),

    #[error("image larger than 20 MiB")]
    TooLarge,

    #[error("job time limit reached before the image was loaded")]
    DeadlineExceeded,

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Decode(#[from] press_render::PaintError),
}

/// Loads image bytes for a render
#[derive(Debug, Clone)]
pub struct Fetcher {
    asset_dir: Option<PathBuf>,
    client: Option<Client>,
    timeout: Duration,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self {
            asset_dir: None,
            client: None,
            timeout: Config::default().fetch_timeout,
        }
    }
}

impl Fetcher {
    /// Fetcher for `data:` URIs only
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn new(config: &Config) -> Self {
        let client = if config.allow_remote {
            match Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(config.fetch_timeout)
                .build()
            {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("remote images disabled, HTTP client unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self {
            asset_dir: config.asset_dir.clone(),
            client,
            timeout: config.fetch_timeout,
        }
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    /// Load every image referenced by `document`; returns the images and
    /// one warning per source that failed
    pub fn collect(&self, document: &Document) -> (ResourceSet, Vec<String>) {
        self.collect_until(document, None)
    }

    /// Like [`Fetcher::collect`], but sources not yet loaded when
    /// `deadline` passes are skipped, and remote requests are cut short at
    /// the deadline
    pub fn collect_until(&self, document: &Document, deadline: Option<Instant>) -> (ResourceSet, Vec<String>) {
        let tree = document.tree();
        let mut resources = ResourceSet::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for node in tree.descendants(tree.root()) {
            let Some(src) = tree
                .element(node)
                .filter(|e| e.kind == ElementKind::Img)
                .and_then(|e| e.get_attr("src"))
            else {
                continue;
            };
            if src.trim().is_empty() || !seen.insert(src.to_string()) {
                continue;
            }

            let loaded = self
                .load_until(src, deadline)
                .and_then(|bytes| resources.insert_bytes(src, &bytes).map_err(FetchError::from));
            if let Err(e) = loaded {
                let shown: String = src.chars().take(64).collect();
                tracing::warn!("skipping image {:?}: {}", shown, e);
                warnings.push(format!("image {shown:?} skipped: {e}"));
            }
        }
        (resources, warnings)
    }

    /// Raw bytes of one source
    pub fn load(&self, src: &str) -> Result<Vec<u8>, FetchError> {
        self.load_until(src, None)
    }

    fn load_until(&self, src: &str, deadline: Option<Instant>) -> Result<Vec<u8>, FetchError> {
        let timeout = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return Err(FetchError::DeadlineExceeded);
                }
                left.min(self.timeout)
            }
            None => self.timeout,
        };

        let src = src.trim();
        match url::Url::parse(src) {
            Ok(url) => match url.scheme() {
                "data" => decode_data_uri(src),
                "http" | "https" => self.load_remote(url.as_str(), timeout),
                other => Err(FetchError::UnsupportedScheme(other.to_string())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => self.load_asset(src),
            Err(e) => Err(FetchError::UnsupportedScheme(e.to_string())),
        }
    }

    fn load_remote(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::RemoteDisabled)?;
        tracing::debug!("fetching {} (timeout {:?})", url, timeout);

        let response = client.get(url).timeout(timeout).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if response.content_length().is_some_and(|len| len > MAX_IMAGE_BYTES) {
            return Err(FetchError::TooLarge);
        }
        let mut bytes = Vec::new();
        response.take(MAX_IMAGE_BYTES + 1).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > MAX_IMAGE_BYTES {
            return Err(FetchError::TooLarge);
        }
        Ok(bytes)
    }

    fn load_asset(&self, src: &str) -> Result<Vec<u8>, FetchError> {
        let dir = self.asset_dir.as_ref().ok_or(FetchError::NoAssetDir)?;
        let relative = Path::new(src.trim_start_matches('/'));
        if relative.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(FetchError::OutsideAssetDir);
        }

        let path = dir.join(relative);
        if fs::metadata(&path)?.len() > MAX_IMAGE_BYTES {
            return Err(FetchError::TooLarge);
        }
        Ok(fs::read(path)?)
    }
}

/// Payload of a `data:` URI
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, FetchError> {
    let rest = uri
        .get(..5)
        .filter(|p| p.eq_ignore_ascii_case("data:"))
        .map(|_| &uri[5..])
        .ok_or_else(|| FetchError::DataUri("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError::DataUri("missing comma".into()))?;

    if header.to_ascii_lowercase().ends_with(";base64") {
        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| FetchError::DataUri(e.to_string()))
    } else {
        Ok(percent_encoding::percent_decode_str(payload).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("press-fetch-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn document(html: &str) -> Document {
        press_html::parse(html).unwrap()
    }

    #[test]
    fn test_base64_data_uri() {
        let bytes = png(3, 2);
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        assert_eq!(Fetcher::offline().load(&uri).unwrap(), bytes);
    }

    #[test]
    fn test_percent_encoded_data_uri() {
        assert_eq!(decode_data_uri("data:,a%20b").unwrap(), b"a b");
        // incomplete escapes are kept literally
        assert_eq!(decode_data_uri("data:,bad%2").unwrap(), b"bad%2");
        assert!(decode_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn test_asset_dir() {
        let dir = temp_dir("assets");
        fs::write(dir.join("cover.png"), png(4, 4)).unwrap();
        let fetcher = Fetcher::offline().with_asset_dir(&dir);
        assert!(fetcher.load("cover.png").is_ok());
        assert!(fetcher.load("/cover.png").is_ok());
        assert!(matches!(fetcher.load("../etc/passwd"), Err(FetchError::OutsideAssetDir)));
        assert!(matches!(fetcher.load("missing.png"), Err(FetchError::Io(_))));
    }

    #[test]
    fn test_without_asset_dir() {
        assert!(matches!(Fetcher::offline().load("cover.png"), Err(FetchError::NoAssetDir)));
    }

    #[test]
    fn test_remote_disabled_and_unsupported_schemes() {
        assert!(matches!(
            Fetcher::offline().load("https://example.com/a.png"),
            Err(FetchError::RemoteDisabled)
        ));
        assert!(matches!(
            Fetcher::offline().load("ftp://example.com/a.png"),
            Err(FetchError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_remote_fetch() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let body = png(5, 5);
        let served = body.clone();
        let handle = std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(tiny_http::Response::from_data(served));
            }
        });

        let config = Config {
            fetch_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        let bytes = Fetcher::new(&config).load(&format!("http://127.0.0.1:{port}/logo.png")).unwrap();
        assert_eq!(bytes, body);
        handle.join().unwrap();
    }

    #[test]
    fn test_unsized_remote_body_is_capped() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                // no Content-Length, so the body is sent chunked
                let body = std::io::repeat(0).take(MAX_IMAGE_BYTES + 4096);
                let response = tiny_http::Response::new(tiny_http::StatusCode(200), Vec::new(), body, None, None);
                let _ = request.respond(response);
            }
        });

        let err = Fetcher::new(&Config::default())
            .load(&format!("http://127.0.0.1:{port}/huge.png"))
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge), "{err}");
        handle.join().unwrap();
    }

    #[test]
    fn test_collect_stops_at_deadline() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png(2, 2)));
        let doc = document(&format!(r#"<img src="{uri}">"#));
        let (resources, warnings) = Fetcher::offline().collect_until(&doc, Some(Instant::now()));
        assert!(resources.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("time limit"));
    }

    #[test]
    fn test_collect_keeps_good_images_and_warns() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png(2, 2)));
        let html = format!(r#"<img src="{uri}"><img src="{uri}"><img src="data:image/png;base64,AAAA"><img src="">"#);
        let (resources, warnings) = Fetcher::offline().collect(&document(&html));
        assert_eq!(resources.len(), 1);
        assert!(resources.contains(&uri));
        assert_eq!(warnings.len(), 1);
    }
}
