//! HTTP response handlers.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response};

use crate::reload;
use crate::utils::mime;

/// Respond with a static file, injecting the reload client into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);
    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type, ws_port);
    send(request, 200, content_type, body)
}

/// Respond with the embedded reload client.
pub fn respond_reload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = reload::client_js(ws_port).into_bytes();
    send(request, 200, mime::types::JAVASCRIPT, body)
}

/// Respond with a plain 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send(request, 404, mime::types::PLAIN, b"404 not found".to_vec())
}

fn send(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", content_type)
                .map_err(|()| anyhow::anyhow!("invalid content-type header"))?,
        );
    request.respond(response)?;
    Ok(())
}

/// Inject the reload client when the body is HTML and watch is enabled.
fn maybe_inject_reload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_reload_script(&body),
        _ => body,
    }
}

/// Insert the client `<script>` before `</body>`, appending when absent.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let script = reload::client_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
    } else {
        // no </body>, browsers handle a trailing script gracefully
        result.extend_from_slice(content);
        result.extend_from_slice(script_bytes);
    }
    result
}
