//! Live reload over WebSocket.
//!
//! A small server accepts browser clients on a dedicated port; the watcher
//! broadcasts a JSON reload message after a successful rebuild. Dead clients
//! are pruned on send failure.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tungstenite::{WebSocket, protocol::Message};

use crate::{debug, log};

/// URL the dev server serves the embedded client from.
pub const CLIENT_ROUTE: &str = "/__pagewright/reload.js";

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Browser-side reload client. `{{ws_port}}` is substituted at serve time.
const CLIENT_JS: &str = r#"(() => {
  const connect = () => {
    const ws = new WebSocket("ws://localhost:{{ws_port}}");
    ws.onmessage = (event) => {
      const msg = JSON.parse(event.data);
      if (msg.type === "reload") location.reload();
    };
    ws.onclose = () => setTimeout(connect, 1000);
  };
  connect();
})();
"#;

/// Render the reload client for the bound WebSocket port.
pub fn client_js(ws_port: u16) -> String {
    CLIENT_JS.replace("{{ws_port}}", &ws_port.to_string())
}

/// The `<script>` tag injected into served HTML.
pub fn client_tag() -> String {
    format!("<script src=\"{CLIENT_ROUTE}\"></script>")
}

/// Message sent to browsers on rebuild.
#[derive(Serialize)]
struct ReloadMessage {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Handle to the running reload server: broadcast + bound port.
#[derive(Clone)]
pub struct ReloadHandle {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    port: u16,
}

impl ReloadHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send a reload notification to every connected client.
    pub fn broadcast(&self) {
        let payload = serde_json::to_string(&ReloadMessage { kind: "reload" })
            .expect("reload message serializes");

        let mut clients = self.clients.lock();
        let count = clients.len();
        if count == 0 {
            debug!("reload"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match ws.send(Message::Text(payload.clone().into())) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "broadcast to {} clients", count);
    }
}

/// Start the WebSocket server, retrying the next port if in use.
///
/// The acceptor runs on its own thread for the life of the process; there is
/// no stop transition.
pub fn start(base_port: u16) -> Result<ReloadHandle> {
    let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    let clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>> = Arc::new(Mutex::new(Vec::new()));

    let accept_clients = Arc::clone(&clients);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => match tungstenite::accept(stream) {
                    Ok(ws) => {
                        debug!("reload"; "client connected");
                        accept_clients.lock().push(ws);
                    }
                    Err(e) => debug!("reload"; "handshake failed: {}", e),
                },
                Err(e) => {
                    log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    debug!("reload"; "ws://localhost:{}", port);
    Ok(ReloadHandle { clients, port })
}

/// Try binding to port, retry with incremented port if in use.
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{port}")) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind reload server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_js_substitutes_port() {
        let js = client_js(35729);
        assert!(js.contains("ws://localhost:35729"));
        assert!(!js.contains("{{ws_port}}"));
    }

    #[test]
    fn test_reload_message_shape() {
        let payload = serde_json::to_string(&ReloadMessage { kind: "reload" }).unwrap();
        assert_eq!(payload, "{\"type\":\"reload\"}");
    }
}
