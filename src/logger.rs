use crate::context::InvocationContext;
use crate::enrich::derive_attributes;
use crate::format::make_sink;
use crate::init::LoggerConfig;
use crate::record::{Attr, Level, LogRecord};
use crate::render::Renderer;
use crate::sink::{LogSink, SinkError};
use serde_json::Value;
use std::io::{self, Write};
use std::sync::Arc;

/// Shorthand for an empty call-site attribute list.
pub const NO_ATTRS: [Attr; 0] = [];

/// Error returned by [`Logger::log`].
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to render record: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Level-gated logger that enriches every record with invocation context.
///
/// A `Logger` is an ordinary value: construct one per process (or per test)
/// and pass it to whatever needs it. Its threshold, renderer and sink never
/// change after construction, so `&Logger` can be shared across threads.
#[derive(Clone)]
pub struct Logger {
    level: Level,
    renderer: Renderer,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger with the Lambda key names.
    pub fn new(level: Level, sink: Arc<dyn LogSink>) -> Self {
        Self::with_renderer(level, Renderer::default(), sink)
    }

    pub fn with_renderer(level: Level, renderer: Renderer, sink: Arc<dyn LogSink>) -> Self {
        Logger {
            level,
            renderer,
            sink,
        }
    }

    /// Build a logger writing to `writer` in the configured format.
    pub fn from_config<W>(config: &LoggerConfig, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::new(config.level, make_sink(config.format, writer))
    }

    /// Build a logger writing to stdout.
    pub fn stdout(config: &LoggerConfig) -> Self {
        Self::from_config(config, io::stdout())
    }

    /// Build a stdout logger from `AWS_LAMBDA_LOG_LEVEL` and `AWS_LAMBDA_LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self::stdout(&LoggerConfig::from_env())
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether a call at `level` would produce output.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Emit one record, reporting failures to the caller.
    ///
    /// Attributes are ordered call-site first, then `requestId`, `traceId`
    /// and the context's fields. Calls below the threshold return `Ok(())`
    /// without touching the sink.
    pub fn log<I, K, V>(
        &self,
        ctx: &InvocationContext,
        level: Level,
        message: &str,
        attrs: I,
    ) -> Result<(), LogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut attributes: Vec<Attr> = attrs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        attributes.extend(derive_attributes(ctx));

        if !self.enabled(level) {
            return Ok(());
        }

        let record = LogRecord::now(level, message, attributes);
        let encoded = self.renderer.render(&record)?;
        self.sink.write(&encoded)?;
        Ok(())
    }

    pub fn debug<I, K, V>(&self, ctx: &InvocationContext, message: &str, attrs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.emit(ctx, Level::Debug, message, attrs);
    }

    pub fn info<I, K, V>(&self, ctx: &InvocationContext, message: &str, attrs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.emit(ctx, Level::Info, message, attrs);
    }

    pub fn warning<I, K, V>(&self, ctx: &InvocationContext, message: &str, attrs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.emit(ctx, Level::Warn, message, attrs);
    }

    pub fn error<I, K, V>(&self, ctx: &InvocationContext, message: &str, attrs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.emit(ctx, Level::Error, message, attrs);
    }

    /// Fire-and-forget wrapper around [`log`](Self::log).
    fn emit<I, K, V>(&self, ctx: &InvocationContext, level: Level, message: &str, attrs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if let Err(e) = self.log(ctx, level, message, attrs) {
            eprintln!("failed to write log record: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::noop_sink::NoopSink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        records: Mutex<Vec<Vec<u8>>>,
        calls: AtomicUsize,
    }

    impl LogSink for Capture {
        fn write(&self, encoded: &[u8]) -> Result<usize, SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().push(encoded.to_vec());
            Ok(encoded.len())
        }
    }

    impl Capture {
        fn json(&self) -> Vec<serde_json::Map<String, Value>> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .map(|r| serde_json::from_slice(r).unwrap())
                .collect()
        }
    }

    #[test]
    fn below_threshold_never_reaches_sink() {
        for threshold in Level::ALL {
            for level in Level::ALL {
                let capture = Arc::new(Capture::default());
                let logger = Logger::new(threshold, capture.clone());

                logger.log(&InvocationContext::new(), level, "m", NO_ATTRS).unwrap();

                let expected = usize::from(level >= threshold);
                assert_eq!(
                    capture.calls.load(Ordering::SeqCst),
                    expected,
                    "threshold {threshold} level {level}"
                );
            }
        }
    }

    #[test]
    fn call_site_attributes_come_first() {
        let capture = Arc::new(Capture::default());
        let logger = Logger::new(Level::Debug, capture.clone());
        let ctx = InvocationContext::new()
            .with_request_id("req-1")
            .with_trace_header("Root=1-t;Sampled=1")
            .with_fields([("tenant", "acme")]);

        logger.debug(&ctx, "hello", attrs!["k" => "v"]);

        let records = capture.json();
        let keys: Vec<_> = records[0].keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["timestamp", "level", "message", "k", "requestId", "traceId", "tenant"]
        );
        assert_eq!(records[0]["level"], "DEBUG");
        assert_eq!(records[0]["traceId"], "1-t");
    }

    #[test]
    fn convenience_methods_use_their_level() {
        let capture = Arc::new(Capture::default());
        let logger = Logger::new(Level::Debug, capture.clone());
        let ctx = InvocationContext::new();

        logger.debug(&ctx, "d", NO_ATTRS);
        logger.info(&ctx, "i", NO_ATTRS);
        logger.warning(&ctx, "w", NO_ATTRS);
        logger.error(&ctx, "e", NO_ATTRS);

        let levels: Vec<_> = capture
            .json()
            .iter()
            .map(|r| r["level"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(levels, ["DEBUG", "INFO", "WARN", "ERROR"]);
    }

    #[test]
    fn error_without_request_id_omits_key() {
        let capture = Arc::new(Capture::default());
        let logger = Logger::new(Level::Info, capture.clone());

        logger.error(&InvocationContext::new(), "boom", NO_ATTRS);

        let record = &capture.json()[0];
        assert_eq!(record["message"], "boom");
        assert_eq!(record["level"], "ERROR");
        assert!(!record.contains_key("requestId"));
    }

    #[test]
    fn sink_errors_are_returned_by_log() {
        struct Broken;
        impl LogSink for Broken {
            fn write(&self, _: &[u8]) -> Result<usize, SinkError> {
                Err(SinkError::Write {
                    written: 0,
                    source: io::ErrorKind::BrokenPipe.into(),
                })
            }
        }

        let logger = Logger::new(Level::Info, Arc::new(Broken));
        let err = logger
            .log(&InvocationContext::new(), Level::Info, "m", NO_ATTRS)
            .unwrap_err();
        assert!(matches!(err, LogError::Sink(SinkError::Write { .. })));

        // The fire-and-forget variant swallows it.
        logger.info(&InvocationContext::new(), "m", NO_ATTRS);
    }

    #[test]
    fn enabled_matches_threshold() {
        let logger = Logger::new(Level::Warn, Arc::new(NoopSink));
        assert!(!logger.enabled(Level::Debug));
        assert!(!logger.enabled(Level::Info));
        assert!(logger.enabled(Level::Warn));
        assert!(logger.enabled(Level::Error));
    }
}
