use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A single call-site or context attribute.
pub type Attr = (String, Value);

/// Severity of a [`LogRecord`].
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Debug < Info < Warn < Error`, which is what the threshold check uses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// External name as it appears on the wire and in `AWS_LAMBDA_LOG_LEVEL`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Resolve a configuration value, falling back to [`Level::Info`] for
    /// unset or unrecognized values.
    pub fn from_setting(value: Option<&str>) -> Level {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of `DEBUG`, `INFO`, `WARN`, `ERROR`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// One accepted emission, owned by the call stack until it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    /// Call-site attributes followed by context-derived ones, in emission order.
    pub attributes: Vec<Attr>,
}

impl LogRecord {
    /// Build a record stamped with the current instant.
    pub fn now(level: Level, message: impl Into<String>, attributes: Vec<Attr>) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            attributes,
        }
    }
}

/// Build a `Vec<Attr>` from `key => value` pairs.
///
/// ```
/// use lambda_log_sink::attrs;
///
/// let attrs = attrs!["user" => "alice", "attempt" => 3];
/// assert_eq!(attrs.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        ::std::vec::Vec::<$crate::record::Attr>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$((::std::string::String::from($key), $crate::__private::Value::from($value))),+]
    };
}
