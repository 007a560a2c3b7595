use crate::sink::{LogSink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the logger itself without any
/// I/O, and for tests that don't care about output.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _encoded: &[u8]) -> Result<usize, SinkError> {
        Ok(0)
    }
}
