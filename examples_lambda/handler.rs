use std::sync::Arc;

use lambda_log_sink::context::{self, InvocationContext};
use lambda_log_sink::init::init_tracing;
use lambda_log_sink::{attrs, Logger, NO_ATTRS};
use tracing::{info, warn};

/// Simulates a few invocations of a handler. Try running it with
/// `AWS_LAMBDA_LOG_FORMAT=JSON` or `AWS_LAMBDA_LOG_LEVEL=DEBUG`.
#[tokio::main]
async fn main() {
    let logger = Arc::new(Logger::from_env());
    init_tracing(Arc::clone(&logger));

    let invocations = [
        ("c6af9ac6-7b61-11e6-9a41-93e8deadbeef", "alice"),
        ("d1d1c2b4-7b61-11e6-9a41-93e8deadbeef", "bob"),
    ];

    for (request_id, user) in invocations {
        let ctx = InvocationContext::from_env()
            .with_request_id(request_id)
            .with_trace_header("Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1")
            .with_fields([("user", user)]);

        logger.info(&ctx, "invocation started", attrs!["cold_start" => request_id.starts_with('c')]);
        logger.debug(&ctx, "loading profile", NO_ATTRS);

        context::scope(ctx.clone(), handle(user)).await;

        logger.info(&ctx, "invocation finished", NO_ATTRS);
    }
}

async fn handle(user: &str) {
    info!(items = 3, "fetched cart");
    if user == "bob" {
        warn!(retry_in_ms = 250, "inventory service throttled");
    }
}
