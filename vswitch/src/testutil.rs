//! Minimal HTTP server for exercising the real client in tests.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

type Route = (String, u16, Vec<u8>);

/// One-thread HTTP/1.1 server answering every connection once.
pub(crate) struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Answer every path with `status` and `body`.
    pub(crate) fn respond(status: u16, body: &[u8]) -> Self {
        Self::start(Vec::new(), Some((status, body.to_vec())))
    }

    /// Answer the listed paths; anything else gets 404.
    pub(crate) fn routes(routes: &[(&str, u16, &[u8])]) -> Self {
        let routes = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), *status, body.to_vec()))
            .collect();
        Self::start(routes, None)
    }

    fn start(routes: Vec<Route>, fallback: Option<(u16, Vec<u8>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve(stream, &routes, fallback.as_ref(), &recorded);
            }
        });

        Self { port, requests }
    }

    /// Base URL of the server.
    pub(crate) fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Head of the first request received.
    pub(crate) fn request(&self) -> String {
        self.requests.lock().unwrap().first().cloned().unwrap_or_default()
    }
}

fn serve(
    mut stream: TcpStream,
    routes: &[Route],
    fallback: Option<&(u16, Vec<u8>)>,
    recorded: &Mutex<Vec<String>>,
) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => return,
        }
    }
    let head = String::from_utf8_lossy(&head).to_string();
    let mut parts = head.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    recorded.lock().unwrap().push(head);

    let (status, body) = routes
        .iter()
        .find(|(route, _, _)| *route == path)
        .map(|(_, status, body)| (*status, body.clone()))
        .or_else(|| fallback.cloned())
        .unwrap_or((404, Vec::new()));

    let mut response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    )
    .into_bytes();
    if method != "HEAD" {
        response.extend_from_slice(&body);
    }
    stream.write_all(&response).ok();
    stream.flush().ok();
}
