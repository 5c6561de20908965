//! Reverse proxy to the front-end dev server.
//!
//! Requests under the configured prefix are forwarded with the prefix
//! stripped. reqwest speaks `http` 0.2 while axum speaks `http` 1, so method,
//! headers and status cross the boundary as strings, bytes and `u16`.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::AppError;

/// Upper bound on a buffered request body.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Headers that describe one connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_forwardable(name: &str) -> bool {
    !name.eq_ignore_ascii_case("host") && !HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

#[derive(Debug, Clone)]
pub struct DevProxy {
    client: reqwest::Client,
    target: String,
    prefix: String,
}

impl DevProxy {
    pub fn new(target: &str, prefix: &str) -> Self {
        // The dev server is local; system proxy settings must not apply.
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Dev proxy client fell back to defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            target: target.trim_end_matches('/').to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Upstream URL for an incoming path and query, prefix removed.
    pub fn upstream_url(&self, path_and_query: &str) -> String {
        let rest = path_and_query
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(path_and_query);
        if rest.is_empty() {
            format!("{}/", self.target)
        } else if rest.starts_with('?') {
            format!("{}/{}", self.target, rest)
        } else {
            format!("{}{}", self.target, rest)
        }
    }

    /// Forward one request and relay the upstream response.
    pub async fn forward(&self, req: Request) -> Result<Response, AppError> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| parts.uri.path());
        let url = self.upstream_url(path_and_query);

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
            .map_err(|e| AppError::InvalidInput(format!("unsupported method: {}", e)))?;
        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::InvalidInput(format!("unreadable request body: {}", e)))?;

        let mut upstream = self.client.request(method, &url);
        for (name, value) in parts.headers.iter() {
            if is_forwardable(name.as_str()) {
                upstream = upstream.header(name.as_str(), value.as_bytes());
            }
        }

        tracing::debug!("proxy {} {} -> {}", parts.method, path_and_query, url);
        let resp = upstream
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("{}: {}", self.target, e)))?;

        let mut relayed = Response::builder().status(resp.status().as_u16());
        for (name, value) in resp.headers().iter() {
            if is_forwardable(name.as_str()) {
                relayed = relayed.header(name.as_str(), value.as_bytes());
            }
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::Upstream(format!("{}: {}", self.target, e)))?;

        relayed.body(Body::from(bytes)).map_err(|e| {
            AppError::Internal(anyhow::Error::new(e).context("relaying upstream response"))
        })
    }
}

/// Shown when the dev server cannot be reached.
pub fn unavailable_page(detail: &str) -> Response {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Codec link lost</title>
  <style>
    body {{ background: #0a0f0a; color: #4afa4a; font-family: monospace; text-align: center; padding-top: 15vh; }}
    button {{ background: none; border: 1px solid #4afa4a; color: #4afa4a; padding: 0.5em 1.5em; font: inherit; cursor: pointer; }}
    pre {{ color: #2a8a2a; white-space: pre-wrap; }}
  </style>
</head>
<body>
  <h1>NO SIGNAL</h1>
  <p>The front-end dev server is not responding. It may still be starting.</p>
  <pre>{}</pre>
  <button onclick="window.location.reload()">Retry</button>
</body>
</html>"#,
        escape_html(detail)
    );
    (StatusCode::BAD_GATEWAY, Html(html)).into_response()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
