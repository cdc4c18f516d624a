//! Probe binary: runs the comprehensive test suite against a deployed
//! iris-classifier endpoint.
//!
//! Exits 0 when every check passes, 1 otherwise.

use clap::Parser;
use iris_pipeline::client::EndpointClient;
use iris_pipeline::harness;
use std::process;

#[derive(Parser)]
#[command(name = "iris-probe")]
#[command(about = "Test a deployed iris-classifier endpoint")]
#[command(version)]
struct Args {
    /// Base URL of the inference service
    #[arg(long, default_value = "https://iris-classifier.ml.hashfoundry.local")]
    url: String,

    /// Number of requests for the performance test
    #[arg(long, default_value = "10")]
    performance_requests: usize,
}

fn main() {
    let args = Args::parse();

    let client = match EndpointClient::new(&args.url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            process::exit(1);
        }
    };

    let passed = harness::run_comprehensive(&client, args.performance_requests);
    process::exit(if passed { 0 } else { 1 });
}
