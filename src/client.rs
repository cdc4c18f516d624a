//! Blocking HTTP client for a deployed iris-classifier endpoint.
//!
//! Speaks the KServe v1 surface: `GET /v1/models/{name}` for readiness and
//! `POST /v1/models/{name}:predict` with an `{"instances": [...]}`
//! envelope. One reusable client instance serves all calls of a probe
//! run. Calls are synchronous with explicit timeouts (10 s metadata, 30 s
//! predict); failures become result records, never retries.

use crate::dataset::N_FEATURES;
use crate::error::{PipelineError, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Model name segment of the endpoint routes.
pub const MODEL_NAME: &str = "iris-classifier";

/// Timeout for the metadata (health) request.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for prediction requests.
const PREDICT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<[f64; N_FEATURES]>,
}

/// How a call failed, when it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection failure, timeout or DNS error.
    Network,
    /// Non-200 HTTP status.
    Protocol,
    /// HTTP 200 with missing or empty predictions list.
    EmptyPredictions,
}

/// Outcome of one single-instance prediction call.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub success: bool,
    pub input: [f64; N_FEATURES],
    pub predicted_class: Option<i64>,
    pub expected_class: Option<u8>,
    /// Only set when an expected class was supplied.
    pub correct: Option<bool>,
    /// Absent for transport failures where no round trip completed.
    pub latency_ms: Option<f64>,
    pub response: Option<Value>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
}

/// Outcome of one batch prediction call.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub success: bool,
    pub input_count: usize,
    pub prediction_count: usize,
    pub predictions: Vec<i64>,
    pub latency_ms: Option<f64>,
    pub avg_latency_per_sample: Option<f64>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
}

/// Latency statistics over the successful calls of a performance run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

/// Aggregate of a performance run.
///
/// `stats` is `None` when every call failed.
#[derive(Debug, Clone)]
pub struct PerfSummary {
    pub total_requests: usize,
    pub successes: usize,
    pub failures: usize,
    /// Percentage of successful calls, rounded to 2 decimals.
    pub success_rate: f64,
    pub stats: Option<LatencyStats>,
}

/// Client for one deployed endpoint; reused across all calls of a run.
pub struct EndpointClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl EndpointClient {
    /// Build a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns a `Network` error if the underlying client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("iris-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn metadata_url(&self) -> String {
        format!("{}/v1/models/{MODEL_NAME}", self.base_url)
    }

    fn predict_url(&self) -> String {
        format!("{}/v1/models/{MODEL_NAME}:predict", self.base_url)
    }

    /// Check that the endpoint is reachable and the model is ready.
    ///
    /// True only on HTTP 200; every other outcome is reported to the
    /// console and returns false.
    pub fn health_check(&self) -> bool {
        println!("Performing health check...");

        let response = self
            .http
            .get(self.metadata_url())
            .timeout(HEALTH_TIMEOUT)
            .send();

        match response {
            Ok(resp) if resp.status().as_u16() == 200 => {
                let metadata: Value = resp.json().unwrap_or(Value::Null);
                let version = metadata
                    .get("spec")
                    .and_then(|s| s.get("version"))
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                println!("Model '{MODEL_NAME}' is ready (version: {version})");
                true
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().unwrap_or_default();
                println!("Health check failed: HTTP {status}");
                println!("  Response: {body}");
                false
            }
            Err(e) => {
                println!("Health check failed: {e}");
                false
            }
        }
    }

    /// Issue one single-instance prediction and time it.
    ///
    /// Never returns an error: every failure mode is folded into the
    /// outcome record, with the kind distinguishing transport, protocol
    /// and empty-predictions cases.
    pub fn predict_one(&self, sample: [f64; N_FEATURES], expected: Option<u8>) -> PredictionOutcome {
        let payload = PredictRequest {
            instances: vec![sample],
        };

        let start = Instant::now();
        let response = self
            .http
            .post(self.predict_url())
            .timeout(PREDICT_TIMEOUT)
            .json(&payload)
            .send();

        match response {
            Ok(resp) => {
                let latency_ms = round2(start.elapsed().as_secs_f64() * 1000.0);
                let status = resp.status().as_u16();

                if status != 200 {
                    let body = resp.text().unwrap_or_default();
                    return PredictionOutcome {
                        success: false,
                        input: sample,
                        predicted_class: None,
                        expected_class: expected,
                        correct: None,
                        latency_ms: Some(latency_ms),
                        response: None,
                        failure: Some(FailureKind::Protocol),
                        error: Some(format!("HTTP {status}: {body}")),
                    };
                }

                let body: Value = match resp.json() {
                    Ok(v) => v,
                    Err(e) => {
                        return PredictionOutcome {
                            success: false,
                            input: sample,
                            predicted_class: None,
                            expected_class: expected,
                            correct: None,
                            latency_ms: Some(latency_ms),
                            response: None,
                            failure: Some(FailureKind::EmptyPredictions),
                            error: Some(format!("unparseable response: {e}")),
                        }
                    }
                };

                match extract_predictions(&body).first().copied() {
                    Some(predicted) => PredictionOutcome {
                        success: true,
                        input: sample,
                        predicted_class: Some(predicted),
                        expected_class: expected,
                        correct: expected.map(|e| i64::from(e) == predicted),
                        latency_ms: Some(latency_ms),
                        response: Some(body),
                        failure: None,
                        error: None,
                    },
                    None => PredictionOutcome {
                        success: false,
                        input: sample,
                        predicted_class: None,
                        expected_class: expected,
                        correct: None,
                        latency_ms: Some(latency_ms),
                        response: Some(body),
                        failure: Some(FailureKind::EmptyPredictions),
                        error: Some("no predictions in response".to_string()),
                    },
                }
            }
            Err(e) => PredictionOutcome {
                success: false,
                input: sample,
                predicted_class: None,
                expected_class: expected,
                correct: None,
                latency_ms: None,
                response: None,
                failure: Some(FailureKind::Network),
                error: Some(format!("request failed: {e}")),
            },
        }
    }

    /// Issue one batch prediction over N instances.
    ///
    /// Does not check per-sample correctness; reports counts and the
    /// per-sample share of the call latency.
    pub fn predict_batch(&self, samples: &[[f64; N_FEATURES]]) -> BatchOutcome {
        println!("Testing batch prediction with {} samples...", samples.len());

        let payload = PredictRequest {
            instances: samples.to_vec(),
        };

        let start = Instant::now();
        let response = self
            .http
            .post(self.predict_url())
            .timeout(PREDICT_TIMEOUT)
            .json(&payload)
            .send();

        match response {
            Ok(resp) => {
                let latency_ms = round2(start.elapsed().as_secs_f64() * 1000.0);
                let status = resp.status().as_u16();

                if status != 200 {
                    let body = resp.text().unwrap_or_default();
                    return BatchOutcome {
                        success: false,
                        input_count: samples.len(),
                        prediction_count: 0,
                        predictions: Vec::new(),
                        latency_ms: Some(latency_ms),
                        avg_latency_per_sample: None,
                        failure: Some(FailureKind::Protocol),
                        error: Some(format!("HTTP {status}: {body}")),
                    };
                }

                let body: Value = resp.json().unwrap_or(Value::Null);
                let predictions = extract_predictions(&body);

                BatchOutcome {
                    success: true,
                    input_count: samples.len(),
                    prediction_count: predictions.len(),
                    predictions,
                    latency_ms: Some(latency_ms),
                    avg_latency_per_sample: Some(round2(latency_ms / samples.len() as f64)),
                    failure: None,
                    error: None,
                }
            }
            Err(e) => BatchOutcome {
                success: false,
                input_count: samples.len(),
                prediction_count: 0,
                predictions: Vec::new(),
                latency_ms: None,
                avg_latency_per_sample: None,
                failure: Some(FailureKind::Network),
                error: Some(format!("request failed: {e}")),
            },
        }
    }

    /// Run `num_requests` sequential single predictions with the fixed
    /// representative sample and aggregate their latencies.
    pub fn performance_test(&self, num_requests: usize, sample: [f64; N_FEATURES]) -> PerfSummary {
        println!("Running performance test with {num_requests} requests...");

        let mut latencies = Vec::with_capacity(num_requests);
        let mut failures = 0usize;

        for i in 0..num_requests {
            let outcome = self.predict_one(sample, None);
            match (outcome.success, outcome.latency_ms) {
                (true, Some(latency)) => latencies.push(latency),
                _ => {
                    failures += 1;
                    let detail = outcome.error.unwrap_or_else(|| "unknown error".to_string());
                    println!("  Request {} failed: {detail}", i + 1);
                }
            }
        }

        summarize_latencies(num_requests, &latencies, failures)
    }
}

/// The `predictions` list of a response body, leniently parsed.
///
/// Missing field and empty list are equivalent (both are the semantic
/// failure case for single predictions).
fn extract_predictions(body: &Value) -> Vec<i64> {
    body.get("predictions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
                .collect()
        })
        .unwrap_or_default()
}

/// Build the performance summary from collected latency samples.
#[must_use]
pub fn summarize_latencies(total: usize, latencies: &[f64], failures: usize) -> PerfSummary {
    let successes = latencies.len();
    let success_rate = if total == 0 {
        0.0
    } else {
        round2(successes as f64 / total as f64 * 100.0)
    };

    if latencies.is_empty() {
        return PerfSummary {
            total_requests: total,
            successes: 0,
            failures,
            success_rate: 0.0,
            stats: None,
        };
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = latencies.iter().sum::<f64>() / successes as f64;
    let stats = LatencyStats {
        mean_ms: round2(mean),
        min_ms: sorted[0],
        max_ms: sorted[sorted.len() - 1],
        p95_ms: percentile(&sorted, 95),
        p99_ms: percentile(&sorted, 99),
    };

    PerfSummary {
        total_requests: total,
        successes,
        failures,
        success_rate,
        stats: Some(stats),
    }
}

/// Nearest-rank percentile over pre-sorted samples.
fn percentile(sorted: &[f64], p: usize) -> f64 {
    let idx = (sorted.len() * p / 100).min(sorted.len() - 1);
    sorted[idx]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
