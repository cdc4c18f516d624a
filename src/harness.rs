//! Comprehensive endpoint test orchestration.
//!
//! Fixed order: health check, per-species single predictions, one batch
//! prediction, one performance run. A failed health check aborts before
//! any prediction call. The result is a single pass/fail boolean; the
//! binary maps it to the process exit code.

use crate::client::{EndpointClient, PerfSummary};
use crate::dataset::{N_FEATURES, REFERENCE_SAMPLES};

/// Mean latency above this fails the run (non-fatal to execution).
pub const LATENCY_BUDGET_MS: f64 = 100.0;

/// The representative sample for performance runs (versicolor).
const PERF_SAMPLE: [f64; N_FEATURES] = REFERENCE_SAMPLES[1].1;

/// Run the full test suite against a deployed endpoint.
///
/// Returns true only when the health check passes, every per-species
/// prediction is correct, the batch call succeeds, the performance run
/// produced statistics and mean latency stays within the budget.
pub fn run_comprehensive(client: &EndpointClient, performance_requests: usize) -> bool {
    println!("=== Comprehensive API Test Suite ===\n");

    let mut all_passed = true;

    if !client.health_check() {
        println!("Health check failed - aborting tests");
        return false;
    }
    println!();

    println!("Testing individual predictions...");
    for (species, sample, expected) in REFERENCE_SAMPLES {
        let outcome = client.predict_one(sample, Some(expected));

        if outcome.success {
            let correct = outcome.correct.unwrap_or(false);
            let mark = if correct { "ok" } else { "WRONG" };
            println!(
                "  {species}: {mark} - predicted {}, expected {expected} ({}ms)",
                outcome.predicted_class.unwrap_or(-1),
                outcome.latency_ms.unwrap_or(0.0)
            );
            if !correct {
                all_passed = false;
            }
        } else {
            println!(
                "  {species}: failed - {}",
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            );
            all_passed = false;
        }
    }
    println!();

    let samples: Vec<[f64; N_FEATURES]> =
        REFERENCE_SAMPLES.iter().map(|(_, s, _)| *s).collect();
    let batch = client.predict_batch(&samples);

    if batch.success {
        println!(
            "Batch prediction: {} predictions in {}ms",
            batch.prediction_count,
            batch.latency_ms.unwrap_or(0.0)
        );
        println!(
            "  Average latency per sample: {}ms",
            batch.avg_latency_per_sample.unwrap_or(0.0)
        );
    } else {
        println!(
            "Batch prediction failed: {}",
            batch.error.unwrap_or_else(|| "unknown error".to_string())
        );
        all_passed = false;
    }
    println!();

    let perf = client.performance_test(performance_requests, PERF_SAMPLE);
    if !report_performance(&perf) {
        all_passed = false;
    }

    println!("\n==================================================");
    if all_passed {
        println!("All tests passed");
    } else {
        println!("Some tests failed - check the results above");
    }

    all_passed
}

/// Print the performance section; false when the run fails the suite.
fn report_performance(perf: &PerfSummary) -> bool {
    match &perf.stats {
        Some(stats) => {
            println!("Performance test results:");
            println!("  Success rate: {}%", perf.success_rate);
            println!("  Average latency: {}ms", stats.mean_ms);
            println!("  95th percentile: {}ms", stats.p95_ms);
            println!("  99th percentile: {}ms", stats.p99_ms);

            if stats.mean_ms > LATENCY_BUDGET_MS {
                println!("  Average latency exceeds the {LATENCY_BUDGET_MS}ms budget");
                false
            } else {
                println!("  Latency within the {LATENCY_BUDGET_MS}ms budget");
                true
            }
        }
        None => {
            println!("Performance test failed: all requests failed");
            false
        }
    }
}
