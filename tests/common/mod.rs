//! Common test utilities: an in-process mock of the KServe v1 surface.
//!
//! The mock binds an ephemeral port and answers the two routes the probe
//! uses: `GET /v1/models/iris-classifier` and
//! `POST /v1/models/iris-classifier:predict`. Behaviors are scripted per
//! instance; request counters let tests assert the short-circuit
//! property.

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Scripted behavior of the mock endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Healthy metadata; predict classifies by petal length.
    Healthy,
    /// Metadata route answers 503; predict would work.
    HealthDown,
    /// Healthy metadata; predict answers 200 with an empty list.
    EmptyPredictions,
    /// Healthy metadata; predict answers 500.
    PredictError,
}

/// Handle to a running mock endpoint.
pub struct MockEndpoint {
    addr: String,
    predict_calls: Arc<AtomicUsize>,
}

impl MockEndpoint {
    /// Spawn a mock server thread on an ephemeral port.
    pub fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr").to_string();
        let predict_calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&predict_calls);
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => handle_connection(stream, behavior, &counter),
                    Err(_) => break,
                }
            }
        });

        Self {
            addr,
            predict_calls,
        }
    }

    /// Base URL of the running mock.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of predict calls the mock has served.
    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

fn handle_connection(stream: TcpStream, behavior: Behavior, predict_calls: &Arc<AtomicUsize>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    // Drain headers, keeping Content-Length.
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    break;
                }
                if let Some(value) = line
                    .to_ascii_lowercase()
                    .strip_prefix("content-length:")
                    .map(str::trim)
                    .map(ToString::to_string)
                {
                    content_length = value.parse().unwrap_or(0);
                }
            }
            Err(_) => return,
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body).is_err() {
        return;
    }

    let (status, response_body) = route(&method, &path, &body, behavior, predict_calls);

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
        response_body.len()
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn route(
    method: &str,
    path: &str,
    body: &[u8],
    behavior: Behavior,
    predict_calls: &Arc<AtomicUsize>,
) -> (&'static str, String) {
    match (method, path) {
        ("GET", "/v1/models/iris-classifier") => match behavior {
            Behavior::HealthDown => ("503 Service Unavailable", json!({"error": "model not ready"}).to_string()),
            _ => (
                "200 OK",
                json!({"name": "iris-classifier", "spec": {"version": "v1"}}).to_string(),
            ),
        },
        ("POST", "/v1/models/iris-classifier:predict") => {
            predict_calls.fetch_add(1, Ordering::SeqCst);
            match behavior {
                Behavior::PredictError => (
                    "500 Internal Server Error",
                    json!({"error": "inference failed"}).to_string(),
                ),
                Behavior::EmptyPredictions => ("200 OK", json!({"predictions": []}).to_string()),
                _ => {
                    let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
                    let predictions: Vec<i64> = parsed
                        .get("instances")
                        .and_then(Value::as_array)
                        .map(|instances| instances.iter().map(classify).collect())
                        .unwrap_or_default();
                    ("200 OK", json!({ "predictions": predictions }).to_string())
                }
            }
        }
        _ => ("404 Not Found", json!({"error": "no such route"}).to_string()),
    }
}

/// Petal-length rule: matches the trained model on the reference samples.
fn classify(instance: &Value) -> i64 {
    let petal_length = instance
        .get(2)
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    if petal_length < 2.5 {
        0
    } else if petal_length < 4.9 {
        1
    } else {
        2
    }
}
