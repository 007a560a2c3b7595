//! Environment variable names read by this crate.
//!
//! These are purely helpers; [`crate::logger::Logger`] itself takes its
//! settings as explicit values and never touches the environment.

/// Minimum level: `DEBUG`, `INFO`, `WARN` or `ERROR`. Anything else means `INFO`.
pub const LOG_LEVEL_ENV: &str = "AWS_LAMBDA_LOG_LEVEL";

/// Output format: `JSON` selects raw structured output, anything else text.
pub const LOG_FORMAT_ENV: &str = "AWS_LAMBDA_LOG_FORMAT";

/// X-Ray trace header of the current invocation, set by the Lambda runtime.
pub const TRACE_ID_ENV: &str = "_X_AMZN_TRACE_ID";
