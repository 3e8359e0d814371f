//! Minimal HTTP/1.1 catalog server for integration tests
//!
//! Serves canned responses per `METHOD /path`, one connection at a time, and
//! records every request it sees.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use lineage_sync::config::RunConfig;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct CatalogServer {
    addr: Option<SocketAddr>,
    routes: Arc<Mutex<HashMap<String, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl CatalogServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `route` ("GET /api/v3/catalog"). The last queued
    /// response for a route is repeated forever.
    pub fn route(self, route: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back((status, body.into()));
        self
    }

    pub fn start(mut self) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        self.addr = Some(listener.local_addr().expect("read local addr"));

        let routes = Arc::clone(&self.routes);
        let requests = Arc::clone(&self.requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &routes, &requests);
            }
        });
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr.expect("server started"))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// Self-hosted config pointing at this server, tuned for fast tests
    pub fn config(&self) -> RunConfig {
        let mut config = RunConfig {
            url: self.url(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            show_progress: false,
            request_timeout_secs: 5,
            ..Default::default()
        };
        config.retry.initial_delay_ms = 1;
        config.retry.max_delay_ms = 5;
        config
    }
}

fn handle(
    stream: TcpStream,
    routes: &Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(_) => return,
    };
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() || request_line.is_empty() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: headers.get("authorization").cloned(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, payload) = {
        let mut routes = routes.lock().unwrap();
        match routes.get_mut(&format!("{} {}", method, path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => (404, r#"{"errorMessage":"not found"}"#.to_string()),
        }
    };

    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    );
    let _ = writer.write_all(response.as_bytes());
    let _ = writer.flush();
}
