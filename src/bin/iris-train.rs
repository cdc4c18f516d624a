//! Trainer binary: runs the full pipeline and writes `model.bin` plus
//! `metadata.json` into the current directory.
//!
//! Takes no arguments. Exits 0 on pipeline success, 1 on any error.

use std::process;

fn main() {
    if let Err(e) = iris_pipeline::trainer::run(".") {
        eprintln!("Error during training: {e}");
        process::exit(1);
    }
}
