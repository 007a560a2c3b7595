use crate::raw_sink::RawSink;
use crate::sink::LogSink;
use crate::text_sink::TextAdapter;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

/// Output encodings that can be selected via `AWS_LAMBDA_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line, passed through unchanged.
    Json,
    /// Tab-separated prefix followed by the remaining fields as JSON.
    #[default]
    Text,
}

impl OutputFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Text => "Text",
        }
    }
}

/// Resolve a configuration value. Only the exact value `JSON` selects
/// [`OutputFormat::Json`]; anything else, including no value, is text.
pub fn parse_format(value: Option<&str>) -> OutputFormat {
    match value {
        Some("JSON") => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_format(Some(s)))
    }
}

/// Create the sink implementing `format` on top of `writer`.
///
/// This is the main entry point for applications that pick the encoding
/// at startup instead of constructing sinks manually.
pub fn make_sink<W>(format: OutputFormat, writer: W) -> Arc<dyn LogSink>
where
    W: Write + Send + 'static,
{
    match format {
        OutputFormat::Json => Arc::new(RawSink::new(writer)),
        OutputFormat::Text => Arc::new(TextAdapter::new(writer)),
    }
}
