//! One-line access log for `/api` requests.

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Longest log line emitted, in characters.
pub const MAX_LOG_LINE: usize = 80;

/// `METHOD path status in Nms`, followed by ` :: body` when a JSON body was
/// captured, cut to [`MAX_LOG_LINE`] characters with a trailing ellipsis.
pub fn format_log_line(
    method: &str,
    path: &str,
    status: u16,
    elapsed_ms: u128,
    json_body: Option<&str>,
) -> String {
    let mut line = format!("{} {} {} in {}ms", method, path, status, elapsed_ms);
    if let Some(body) = json_body {
        line.push_str(" :: ");
        line.push_str(body);
    }
    if line.chars().count() > MAX_LOG_LINE {
        let mut cut: String = line.chars().take(MAX_LOG_LINE - 1).collect();
        cut.push('…');
        cut
    } else {
        line
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

pub async fn log_api_requests(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !path.starts_with("/api") {
        return next.run(req).await;
    }
    let method = req.method().clone();
    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if !is_json(&response) {
        tracing::info!(
            "{}",
            format_log_line(method.as_str(), &path, status, elapsed_ms, None)
        );
        return response;
    }

    // JSON bodies are already fully built in memory.
    let (mut parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let captured = String::from_utf8_lossy(&bytes);
            tracing::info!(
                "{}",
                format_log_line(method.as_str(), &path, status, elapsed_ms, Some(&*captured))
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!("{} {} body capture failed: {}", method, path, e);
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::empty())
        }
    }
}
