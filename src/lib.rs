//! Structured logging for AWS Lambda handlers.
//!
//! Every call writes one record enriched with the invocation's request id,
//! X-Ray trace id and any fields attached to the [`InvocationContext`].
//! Records are either written as JSON or reshaped into the Lambda text
//! format by [`TextAdapter`](text_sink::TextAdapter).
//!
//! ```
//! use lambda_log_sink::{attrs, InvocationContext, Logger, LoggerConfig};
//!
//! let logger = Logger::from_config(&LoggerConfig::default(), std::io::sink());
//! let ctx = InvocationContext::new()
//!     .with_request_id("abc-123")
//!     .with_fields([("tenant", "acme")]);
//!
//! logger.info(&ctx, "started", attrs!["k" => "v"]);
//! ```

pub mod record;
pub mod context;
pub mod enrich;
pub mod render;
pub mod sink;
pub mod raw_sink;
pub mod text_sink;
pub mod noop_sink;
pub mod format;
pub mod logger;
pub mod layer;

pub mod env;
pub mod init;

pub use context::{FieldCarrier, InvocationContext};
pub use init::LoggerConfig;
pub use logger::{LogError, Logger, NO_ATTRS};
pub use record::{Level, LogRecord};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
