//! Sink that reshapes rendered JSON into the Lambda text log format:
//!
//! ```text
//! timestamp<TAB>requestId<TAB>level<TAB>message[ {"remaining":"fields"}]
//! ```
//!
//! Every field the JSON record carried survives: the four prefix columns
//! are taken out and everything else is re-encoded after the message.

use crate::enrich::REQUEST_ID_KEY;
use crate::sink::{write_locked, LogSink, SinkError};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

const TIMESTAMP_KEY: &str = "timestamp";
const LEVEL_KEY: &str = "level";
const MESSAGE_KEY: &str = "message";

/// Column value used when the record has no string `requestId`.
pub const MISSING_REQUEST_ID: &str = "-";

/// Converts each JSON record into one text line before writing it.
pub struct TextAdapter<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextAdapter<W> {
    pub fn new(writer: W) -> Self {
        TextAdapter {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TextAdapter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LogSink for TextAdapter<W> {
    fn write(&self, encoded: &[u8]) -> Result<usize, SinkError> {
        // Build the whole line before taking the lock.
        let line = to_text_line(encoded)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        write_locked(&mut *writer, &line)
    }
}

/// Reshape one JSON object into a newline-terminated text line.
///
/// The record is decoded with duplicate keys kept, so a caller attribute
/// named like a prefix column cannot replace the framework value. The
/// renderer writes `timestamp`, `level` and `message` ahead of every
/// attribute, so their first occurrence fills the prefix; the context
/// `requestId` follows the call-site attributes, so its last occurrence does.
/// Every other entry, shadowing duplicates included, goes to the JSON tail.
pub fn to_text_line(encoded: &[u8]) -> Result<Vec<u8>, SinkError> {
    let Entries(mut fields) = serde_json::from_slice(encoded).map_err(SinkError::Decode)?;

    let timestamp = take_first(&mut fields, TIMESTAMP_KEY);
    let request_id = take_last(&mut fields, REQUEST_ID_KEY);
    let level = take_first(&mut fields, LEVEL_KEY);
    let message = take_first(&mut fields, MESSAGE_KEY);

    let request_id = match &request_id {
        Some(Value::String(id)) => id.as_str(),
        _ => MISSING_REQUEST_ID,
    };

    let mut line = format!(
        "{}\t{}\t{}\t{}",
        column(timestamp.as_ref()),
        request_id,
        column(level.as_ref()),
        column(message.as_ref()),
    )
    .into_bytes();

    if !fields.is_empty() {
        line.push(b' ');
        serde_json::to_writer(&mut line, &Remaining(&fields)).map_err(SinkError::Encode)?;
    }
    line.push(b'\n');

    Ok(line)
}

/// Object entries in wire order, duplicates included.
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(8));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

struct Remaining<'a>(&'a [(String, Value)]);

impl Serialize for Remaining<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn take_first(fields: &mut Vec<(String, Value)>, key: &str) -> Option<Value> {
    let i = fields.iter().position(|(k, _)| k == key)?;
    Some(fields.remove(i).1)
}

fn take_last(fields: &mut Vec<(String, Value)>, key: &str) -> Option<Value> {
    let i = fields.iter().rposition(|(k, _)| k == key)?;
    Some(fields.remove(i).1)
}

/// Text of a prefix column: strings verbatim, other values as compact JSON,
/// absent values as an empty column.
fn column(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(other) => Cow::Owned(other.to_string()),
        None => Cow::Borrowed(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(input: &str) -> String {
        String::from_utf8(to_text_line(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn prefix_only_when_nothing_remains() {
        let out = line(r#"{"timestamp":"t0","level":"INFO","message":"hi","requestId":"r1"}"#);
        assert_eq!(out, "t0\tr1\tINFO\thi\n");
    }

    #[test]
    fn remaining_fields_follow_as_json() {
        let out = line(
            r#"{"timestamp":"t0","level":"INFO","message":"started","k":"v","requestId":"abc-123","n":1}"#,
        );
        assert_eq!(out, "t0\tabc-123\tINFO\tstarted {\"k\":\"v\",\"n\":1}\n");
    }

    #[test]
    fn missing_request_id_becomes_dash() {
        let out = line(r#"{"timestamp":"t0","level":"ERROR","message":"boom"}"#);
        assert_eq!(out, "t0\t-\tERROR\tboom\n");
    }

    #[test]
    fn non_string_request_id_becomes_dash_and_is_dropped() {
        let out = line(r#"{"timestamp":"t0","level":"INFO","message":"m","requestId":42}"#);
        assert_eq!(out, "t0\t-\tINFO\tm\n");
    }

    #[test]
    fn nested_values_survive() {
        let out = line(
            r#"{"timestamp":"t0","level":"DEBUG","message":"m","obj":{"a":[1,true,null]},"f":1.5}"#,
        );
        let (prefix, tail) = out.trim_end().split_once(' ').unwrap();
        assert_eq!(prefix, "t0\t-\tDEBUG\tm");
        let tail: Value = serde_json::from_str(tail).unwrap();
        assert_eq!(tail, json!({"obj": {"a": [1, true, null]}, "f": 1.5}));
    }

    #[test]
    fn caller_keys_cannot_replace_prefix_columns() {
        let out = line(
            r#"{"timestamp":"t0","level":"INFO","message":"real","level":"ERROR","message":"fake","timestamp":"t9"}"#,
        );
        let (prefix, tail) = out.trim_end().split_once(' ').unwrap();
        assert_eq!(prefix, "t0\t-\tINFO\treal");
        assert_eq!(tail, r#"{"level":"ERROR","message":"fake","timestamp":"t9"}"#);
    }

    #[test]
    fn context_request_id_wins_over_call_site_one() {
        let out = line(
            r#"{"timestamp":"t0","level":"INFO","message":"m","requestId":"caller","requestId":"ctx"}"#,
        );
        assert_eq!(out, "t0\tctx\tINFO\tm {\"requestId\":\"caller\"}\n");
    }

    #[test]
    fn invalid_json_is_rejected_without_output() {
        let sink = TextAdapter::new(Vec::new());
        let err = sink.write(b"{\"timestamp\":").unwrap_err();

        assert!(matches!(err, SinkError::Decode(_)));
        assert_eq!(err.written(), 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn non_object_is_rejected() {
        let err = to_text_line(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, SinkError::Decode(_)));
    }

    #[test]
    fn write_reports_line_length() {
        let sink = TextAdapter::new(Vec::new());
        let n = sink
            .write(b"{\"timestamp\":\"t\",\"level\":\"WARN\",\"message\":\"m\"}\n")
            .unwrap();

        let out = sink.into_inner();
        assert_eq!(n, out.len());
        assert_eq!(out, b"t\t-\tWARN\tm\n");
    }

    struct FailingWriter {
        accept: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accept == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.accept);
            self.accept -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error_carries_landed_bytes() {
        let sink = TextAdapter::new(FailingWriter { accept: 4 });
        let err = sink
            .write(b"{\"timestamp\":\"t0\",\"level\":\"INFO\",\"message\":\"hello\"}")
            .unwrap_err();

        match err {
            SinkError::Write { written, source } => {
                assert_eq!(written, 4);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
