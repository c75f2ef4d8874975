//! Command-line entry point: snippet on stdin, JSON step array on stdout.
//! Diagnostics go to stderr so stdout stays machine-readable.

use std::io::Read;

use tracing_subscriber::EnvFilter;

use stepscope::trace_source;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut code = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut code) {
        tracing::error!(error = %e, "failed to read snippet from stdin");
        println!("[{{\"error\": \"Error: could not read input\"}}]");
        return;
    }

    let steps = trace_source(&code);
    match serde_json::to_string_pretty(&steps) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize trace");
            println!("[{{\"error\": \"Error: could not serialize trace\"}}]");
        }
    }
}
