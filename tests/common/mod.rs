//! Scripted local HTTP server used by the integration tests.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

/// How long the server waits for the next scripted request before giving up.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string, e.g. `/sensors?network=pima`.
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct MockServer {
    base_url: String,
    handle: JoinHandle<Vec<Recorded>>,
}

impl MockServer {
    /// Answers the next `script.len()` requests in order with the given
    /// status and JSON body, recording each one.
    pub fn start(script: Vec<(u16, &'static str)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("mock server should bind");
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock server should listen on TCP")
            .port();

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in script {
                let mut request = match server.recv_timeout(RECV_TIMEOUT) {
                    Ok(Some(request)) => request,
                    _ => break,
                };

                let mut text = String::new();
                let _ = request.as_reader().read_to_string(&mut text);
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());

                seen.push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization,
                    body: text,
                });

                let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("static header is valid");
                let _ = request.respond(
                    Response::from_string(body)
                        .with_status_code(status)
                        .with_header(content_type),
                );
            }
            seen
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the script to run out (or time out) and returns what was received.
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().expect("mock server thread panicked")
    }
}
