//! Two workers logging through namespaced channels
//!
//! ```bash
//! DEBUG='worker:*' cargo run --example worker
//! DEBUG='worker:*,-worker:b' cargo run --example worker
//! NSDEBUG_TRACE=1 DEBUG='*' cargo run --example worker
//! ```

use anyhow::{anyhow, Result};
use nsdebug::Arg;
use serde_json::json;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for the library's own diagnostics
fn init_tracing(trace: bool) {
    if trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn work_a() -> Result<()> {
    let a = nsdebug::debug("worker:a");
    for round in 0..3 {
        a.log(vec![Arg::from("doing lots of uninteresting work")])?;
        thread::sleep(Duration::from_millis(100 * (round + 1)));
    }
    Ok(())
}

fn work_b() -> Result<()> {
    let b = nsdebug::debug("worker:b");
    for round in 0..3 {
        b.log(vec![
            Arg::from("round %j state %o"),
            Arg::from(round),
            Arg::from(json!({ "queued": 3 - round, "done": round })),
        ])?;
        thread::sleep(Duration::from_millis(150));
    }

    let failure = anyhow!("connection reset while flushing batch");
    b.log(vec![Arg::from(failure)])?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing(std::env::var_os("NSDEBUG_TRACE").is_some());

    let handles = [thread::spawn(work_a), thread::spawn(work_b)];
    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("worker thread panicked"))??;
    }

    let previous = nsdebug::disable();
    nsdebug::debug("worker:a").log(vec![Arg::from("not shown")])?;
    nsdebug::enable(&previous)?;
    nsdebug::debug("worker:a").log(vec![Arg::from("restored %s"), Arg::from(previous)])?;
    Ok(())
}
