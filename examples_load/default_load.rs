use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use lambda_log_sink::context::{self, InvocationContext};
use lambda_log_sink::init::init_tracing;
use lambda_log_sink::noop_sink::NoopSink;
use lambda_log_sink::render::Renderer;
use lambda_log_sink::text_sink::to_text_line;
use lambda_log_sink::{Level, Logger};

/// Measures the cost of enrichment and rendering without any I/O, then the
/// extra cost of reshaping into text lines.
#[tokio::main]
async fn main() {
    let logger = Arc::new(Logger::new(Level::Info, Arc::new(NoopSink)));
    init_tracing(Arc::clone(&logger));

    let ctx = InvocationContext::new()
        .with_request_id("8476a536-e9f4-11e8-9739-2dfe598c3fcd")
        .with_trace_header("Root=1-5759e988-bd862e3fe1be46a994272793;Sampled=1")
        .with_fields([("service", "load")]);

    let n: u64 = 100_000;
    let start = Instant::now();

    context::scope(ctx.clone(), async {
        for i in 0..n {
            error!(iteration = i, "default load test error");
        }
    })
    .await;

    let elapsed = start.elapsed();
    println!("tracing bridge: sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    let renderer = Renderer::new();
    let record = lambda_log_sink::LogRecord::now(
        Level::Error,
        "default load test error",
        lambda_log_sink::enrich::derive_attributes(&ctx),
    );
    let start = Instant::now();
    for _ in 0..n {
        let encoded = renderer.render(&record).expect("render");
        let _ = to_text_line(&encoded).expect("reshape");
    }

    let elapsed = start.elapsed();
    println!("render + text: {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
