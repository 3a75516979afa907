//! Request routing
//!
//! Maps HTTP requests onto the render service and service results onto
//! responses. Errors are JSON bodies carrying only the error kind, the
//! failing stage and a one-line summary.

use std::io::{Cursor, Read};
use std::time::Instant;

use press_engine::ebook::secure_filename;
use press_engine::{EbookRequest, PageOptions, RenderError, RenderOptions, RenderOutput, RenderService};
use serde::Deserialize;
use serde_json::json;
use tiny_http::{Header, Method, Request, Response};

/// Largest request body accepted
pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// JSON body of `POST /render`
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub html: String,
    #[serde(default)]
    pub css: Option<String>,
    #[serde(default)]
    pub page: Option<PageOptions>,
    #[serde(default)]
    pub options: RenderOptions,
}

impl RenderRequest {
    fn into_parts(self) -> (String, Option<String>, RenderOptions) {
        let mut options = self.options;
        if self.page.is_some() {
            options.page = self.page;
        }
        (self.html, self.css, options)
    }
}

/// Answer one request
pub fn handle(service: &RenderService, mut request: Request) {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or_default().to_string();

    let response = match (&method, path.as_str()) {
        (Method::Get, "/health") => health(service),
        (Method::Post, "/render") => render(service, &mut request),
        (Method::Post, "/ebook") => ebook(service, &mut request),
        (_, "/health" | "/render" | "/ebook") => error_response(405, "InvalidInput", None, "method not allowed"),
        _ => error_response(404, "InvalidInput", None, "no such endpoint"),
    };

    let status = response.status_code().0;
    tracing::info!("{} {} -> {} in {:?}", method, path, status, started.elapsed());
    if let Err(e) = request.respond(response) {
        tracing::warn!("failed to send response for {} {}: {}", method, path, e);
    }
}

fn health(service: &RenderService) -> HttpResponse {
    let body = json!({
        "status": "ok",
        "version": press_engine::VERSION,
        "pool": service.stats(),
    });
    json_response(200, &body)
}

fn render(service: &RenderService, request: &mut Request) -> HttpResponse {
    let is_html = header_value(request, "Content-Type").is_some_and(|v| v.to_ascii_lowercase().starts_with("text/html"));
    let body = match read_body(request) {
        Ok(body) => body,
        Err(e) => return render_error(&e),
    };

    let (markup, css, options) = if is_html {
        (body, None, RenderOptions::default())
    } else {
        match serde_json::from_str::<RenderRequest>(&body) {
            Ok(req) => req.into_parts(),
            Err(e) => return render_error(&RenderError::invalid_input(format!("invalid JSON body: {e}"))),
        }
    };

    match service.render(markup, css, options) {
        Ok(output) => pdf_response(output, None),
        Err(e) => render_error(&e),
    }
}

fn ebook(service: &RenderService, request: &mut Request) -> HttpResponse {
    let body = match read_body(request) {
        Ok(body) => body,
        Err(e) => return render_error(&e),
    };
    let ebook: EbookRequest = match serde_json::from_str(&body) {
        Ok(ebook) => ebook,
        Err(e) => return render_error(&RenderError::invalid_input(format!("invalid e-book request: {e}"))),
    };

    match service.render_ebook(&ebook) {
        Ok(output) => {
            let mut name = secure_filename(&ebook.outline.course_title);
            if name.is_empty() {
                name = "ebook".to_string();
            }
            pdf_response(output, Some(&format!("{name}.pdf")))
        }
        Err(e) => render_error(&e),
    }
}

/// Request body as UTF-8, bounded by [`MAX_BODY_BYTES`]
fn read_body(request: &mut Request) -> Result<String, RenderError> {
    if request.body_length().is_some_and(|len| len as u64 > MAX_BODY_BYTES) {
        return Err(RenderError::invalid_input("request body too large"));
    }
    let mut bytes = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| RenderError::invalid_input(format!("failed to read body: {e}")))?;
    if bytes.len() as u64 > MAX_BODY_BYTES {
        return Err(RenderError::invalid_input("request body too large"));
    }
    String::from_utf8(bytes).map_err(|_| RenderError::invalid_input("request body is not UTF-8"))
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str().to_string())
}

fn pdf_response(output: RenderOutput, attachment: Option<&str>) -> HttpResponse {
    let page_count = output.page_count.to_string();
    let warnings = output.warnings.len().to_string();
    let mut response = Response::from_data(output.bytes).with_status_code(200);
    response = with_header(response, "Content-Type", output.content_type);
    response = with_header(response, "X-Page-Count", &page_count);
    response = with_header(response, "X-Render-Warnings", &warnings);
    if let Some(filename) = attachment {
        response = with_header(response, "Content-Disposition", &format!("attachment; filename=\"{filename}\""));
    }
    response
}

fn render_error(err: &RenderError) -> HttpResponse {
    error_response(err.http_status(), err.kind.as_str(), err.stage.map(|s| s.as_str()), &err.message)
}

fn error_response(status: u16, kind: &str, stage: Option<&str>, message: &str) -> HttpResponse {
    let body = json!({
        "error": {
            "kind": kind,
            "stage": stage,
            "message": message,
        }
    });
    json_response(status, &body)
}

fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    let response = Response::from_data(body.to_string().into_bytes()).with_status_code(status);
    with_header(response, "Content-Type", "application/json")
}

fn with_header(response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => {
            tracing::warn!("dropping invalid header {}: {:?}", name, value);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_request_page_overrides_options() {
        let req: RenderRequest = serde_json::from_str(
            r#"{"html": "<p>x</p>", "page": {"size": "A5"}, "options": {"page": {"size": "A3"}, "title": "T"}}"#,
        )
        .unwrap();
        let (html, css, options) = req.into_parts();
        assert_eq!(html, "<p>x</p>");
        assert!(css.is_none());
        assert_eq!(options.title.as_deref(), Some("T"));
        assert!(matches!(
            options.page.unwrap().size,
            Some(press_engine::PageSizeOption::Css(ref s)) if s == "A5"
        ));
    }

    #[test]
    fn test_error_body_shape() {
        let err = RenderError::invalid_input("markup is empty").at(press_engine::Stage::Parse);
        let response = render_error(&err);
        assert_eq!(response.status_code().0, 400);
    }

    #[test]
    fn test_html_field_required() {
        assert!(serde_json::from_str::<RenderRequest>(r#"{"css": "p {}"}"#).is_err());
    }
}
