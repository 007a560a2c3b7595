//! JSON encoding of [`LogRecord`]s.

use crate::record::LogRecord;
use chrono::SecondsFormat;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Internal key of the record timestamp before replacement.
pub const TIME_KEY: &str = "time";
/// Internal key of the record level. Not renamed by the Lambda table.
pub const LEVEL_KEY: &str = "level";
/// Internal key of the record message before replacement.
pub const MESSAGE_KEY: &str = "msg";

/// Hook applied to the three framework keys of every record. Caller
/// attributes never go through it.
pub type ReplaceKey = fn(&'static str) -> &'static str;

/// Key names used by Lambda advanced logging: `time` becomes `timestamp`
/// and `msg` becomes `message`.
pub fn lambda_keys(key: &'static str) -> &'static str {
    match key {
        TIME_KEY => "timestamp",
        MESSAGE_KEY => "message",
        other => other,
    }
}

/// Leaves every key as is.
pub fn internal_keys(key: &'static str) -> &'static str {
    key
}

/// Turns a [`LogRecord`] into one newline-terminated JSON object.
#[derive(Clone, Copy)]
pub struct Renderer {
    replace_key: ReplaceKey,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            replace_key: lambda_keys,
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replace_key(replace_key: ReplaceKey) -> Self {
        Renderer { replace_key }
    }

    /// External name of one of the framework keys.
    pub fn key(&self, internal: &'static str) -> &'static str {
        (self.replace_key)(internal)
    }

    /// Encode `record` into a fresh buffer.
    ///
    /// The whole object is materialized before it is returned so a sink can
    /// hand it to the writer in one piece.
    pub fn render(&self, record: &LogRecord) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::with_capacity(128 + 32 * record.attributes.len());
        serde_json::to_writer(
            &mut buf,
            &Encoded {
                record,
                renderer: self,
            },
        )?;
        buf.push(b'\n');
        Ok(buf)
    }
}

struct Encoded<'a> {
    record: &'a LogRecord,
    renderer: &'a Renderer,
}

impl Serialize for Encoded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.record;
        let timestamp = record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        // Written as a map rather than through serde_json::Map so caller keys
        // that collide with the framework keys are emitted verbatim instead of
        // replacing them.
        let mut map = serializer.serialize_map(Some(3 + record.attributes.len()))?;
        map.serialize_entry(self.renderer.key(TIME_KEY), &timestamp)?;
        map.serialize_entry(self.renderer.key(LEVEL_KEY), &record.level)?;
        map.serialize_entry(self.renderer.key(MESSAGE_KEY), &record.message)?;
        for (key, value) in &record.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
