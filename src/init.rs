use crate::env::{LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use crate::format::{parse_format, OutputFormat};
use crate::layer::LambdaLogLayer;
use crate::logger::Logger;
use crate::record::Level;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Startup settings of a [`Logger`].
///
/// **Fields**
/// - `level`: minimum [`Level`] that is written; `INFO` by default.
/// - `format`: [`OutputFormat`] of every line; text by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level: Level,
    pub format: OutputFormat,
}

impl LoggerConfig {
    /// Read `AWS_LAMBDA_LOG_LEVEL` and `AWS_LAMBDA_LOG_FORMAT` from the
    /// process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LoggerConfig {
            level: Level::from_setting(lookup(LOG_LEVEL_ENV).as_deref()),
            format: parse_format(lookup(LOG_FORMAT_ENV).as_deref()),
        }
    }
}

/// Error returned by [`try_init_tracing`].
#[derive(thiserror::Error, Debug)]
#[error("a global tracing subscriber is already installed")]
pub struct InitError(#[from] tracing::subscriber::SetGlobalDefaultError);

/// Install a [`Registry`] with a [`LambdaLogLayer`] as the global `tracing`
/// subscriber, so `tracing` events anywhere in the process are written by
/// `logger`.
pub fn try_init_tracing(logger: Arc<Logger>) -> Result<(), InitError> {
    let subscriber = Registry::default().with(LambdaLogLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Like [`try_init_tracing`] but panics if a subscriber is already set.
///
/// This is the recommended entrypoint for handler binaries, which install
/// exactly one subscriber during cold start.
pub fn init_tracing(logger: Arc<Logger>) {
    try_init_tracing(logger).expect("set global subscriber");
}
