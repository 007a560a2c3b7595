use std::io;

/// Synchronous destination for rendered records.
///
/// Each call receives exactly one complete JSON object as produced by
/// [`crate::render::Renderer::render`]. Implementations must write the
/// result in one piece so concurrent emissions never interleave.
pub trait LogSink: Send + Sync {
    /// Write a single encoded record.
    ///
    /// **Returns**
    /// - `Ok(n)` with the number of bytes that reached the underlying
    ///   stream (which may differ from `encoded.len()` when the sink
    ///   reshapes the record).
    /// - `Err(..)` if the record could not be decoded, re-encoded or
    ///   written. No partial line is produced for decode or encode errors.
    fn write(&self, encoded: &[u8]) -> Result<usize, SinkError>;
}

/// Error type returned by [`LogSink::write`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("record is not a JSON object: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to re-encode remaining fields: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("write failed after {written} bytes: {source}")]
    Write {
        written: usize,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Bytes of the record that reached the stream before the failure.
    pub fn written(&self) -> usize {
        match self {
            SinkError::Write { written, .. } => *written,
            SinkError::Decode(_) | SinkError::Encode(_) => 0,
        }
    }
}

/// Write `buf` fully while the caller holds the writer lock.
///
/// Loops only on short writes; an ordinary stream takes the whole line in a
/// single call.
pub(crate) fn write_locked<W: io::Write + ?Sized>(
    writer: &mut W,
    buf: &[u8],
) -> Result<usize, SinkError> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                return Err(SinkError::Write {
                    written,
                    source: io::ErrorKind::WriteZero.into(),
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => return Err(SinkError::Write { written, source }),
        }
    }
    writer
        .flush()
        .map_err(|source| SinkError::Write { written, source })?;
    Ok(written)
}
