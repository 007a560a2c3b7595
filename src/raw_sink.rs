use crate::sink::{write_locked, LogSink, SinkError};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Passes rendered JSON through to the writer unchanged.
pub struct RawSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> RawSink<W> {
    pub fn new(writer: W) -> Self {
        RawSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RawSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LogSink for RawSink<W> {
    fn write(&self, encoded: &[u8]) -> Result<usize, SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        write_locked(&mut *writer, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_bytes_through() {
        let sink = RawSink::new(Vec::new());
        let n = sink.write(b"{\"message\":\"hi\"}\n").unwrap();

        assert_eq!(n, 17);
        assert_eq!(sink.into_inner(), b"{\"message\":\"hi\"}\n");
    }

    #[test]
    fn does_not_validate_input() {
        let sink = RawSink::new(Vec::new());
        sink.write(b"not json").unwrap();
        assert_eq!(sink.into_inner(), b"not json");
    }
}
