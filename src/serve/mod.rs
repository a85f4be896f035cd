//! Development server.
//!
//! Serves the intermediate root over HTTP with a fallback to the
//! distribution root (binary assets live there) and the public root, remaps
//! `/node_modules` to the project's dependency directory, and injects the
//! live-reload client into HTML responses. Runs until externally terminated;
//! Ctrl+C unblocks the accept loop for a clean exit.

mod response;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tiny_http::{Request, Server};

use crate::config::{BuildConfig, cfg};
use crate::context::PageContext;
use crate::{log, pipeline, reload, watch};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Exit code for an interrupted run: 128 + SIGINT.
const SIGINT_EXIT: i32 = 130;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for unblocking the accept loop on shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        } else {
            // no accept loop to unblock; an interrupted clean/build is a failure
            std::process::exit(SIGINT_EXIT);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Run the development pipeline, then serve with watch + live reload.
pub fn serve(config: &BuildConfig) -> Result<()> {
    // Compile everything once before binding (dev pipeline, no clean)
    let ctx = PageContext::from_config(config);
    pipeline::development().run(config, &ctx)?;

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let _ = SERVER.set(Arc::clone(&server));
    log!("serve"; "http://{}", addr);

    let ws_port = if config.serve.watch {
        let handle = reload::start(config.serve.ws_port)?;
        let port = handle.port();
        watch::spawn(cfg(), handle)?;
        Some(port)
    } else {
        None
    };

    run_request_loop(&server, ws_port);
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Blocking request loop on a small thread pool so one slow transfer does not
/// stall the rest.
fn run_request_loop(server: &Server, ws_port: Option<u16>) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        if is_shutdown() {
            break;
        }
        pool.spawn(move || {
            let config = cfg();
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, config: &BuildConfig, ws_port: Option<u16>) -> Result<()> {
    let url = request.url().to_string();

    // Reload client is served from memory
    if let Some(port) = ws_port {
        if url == reload::CLIENT_ROUTE {
            return response::respond_reload_js(request, port);
        }
    }

    // Fixed remap: browser-loadable dependencies
    if let Some(rest) = url.strip_prefix("/node_modules/") {
        let deps_root = config.root_join("node_modules");
        if let Some(path) = resolve_path(rest, &deps_root) {
            return response::respond_file(request, &path, ws_port);
        }
        return response::respond_not_found(request);
    }

    // Document root is the intermediate root; binary assets fall back to the
    // distribution root, verbatim files to the public root.
    for root in [&config.build.temp, &config.build.dist, &config.build.public] {
        if let Some(path) = resolve_path(&url, root) {
            return response::respond_file(request, &path, ws_port);
        }
    }

    response::respond_not_found(request)
}

/// Resolve a URL to a file under `serve_root`, handling `index.html` for
/// directories. Rejects traversal via canonicalize + prefix check.
fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Normalize URL: strip query string, trim slashes.
fn normalize_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_path_basics() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(root.join("assets/app.js"), "x").unwrap();

        // directory resolves to index.html
        let resolved = resolve_path("/", root).unwrap();
        assert!(resolved.ends_with("index.html"));

        // nested file with query string
        let resolved = resolve_path("/assets/app.js?v=1", root).unwrap();
        assert!(resolved.ends_with("assets/app.js"));

        // missing file
        assert!(resolve_path("/nope.css", root).is_none());
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("docroot");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "s").unwrap();

        assert!(resolve_path("/../secret.txt", &root).is_none());
    }

    #[test]
    fn test_interrupt_exit_code_is_failure() {
        // 128 + SIGINT, never success
        assert_eq!(SIGINT_EXIT, 130);
        assert_ne!(SIGINT_EXIT, 0);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/a/b/?x=1"), "a/b");
        assert_eq!(normalize_url("/"), "");
    }
}
