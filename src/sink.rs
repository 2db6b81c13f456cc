//! The byte sink contract (spec §6).
//!
//! The writer never buffers a whole document; it appends to a caller-owned
//! sink. `put` is infallible within the sink's own buffer, `write` reports
//! how many bytes actually landed (a short write becomes
//! [`IonWriterError::WriteError`](crate::error::IonWriterError::WriteError)
//! at the call site), and `flush` is invoked after every value when
//! [`WriterConfig::flush_every_value`](crate::config::WriterConfig) is set.

use crate::error::{IonWriterError, IonWriterResult};
use std::io::Write;

pub trait Sink {
    fn put(&mut self, byte: u8);
    fn write(&mut self, bytes: &[u8]) -> IonWriterResult<usize>;
    fn flush(&mut self) -> IonWriterResult<()>;
}

/// Adapts any [`std::io::Write`] into a [`Sink`], the way most callers will
/// want to hand a `Vec<u8>` or a `File` straight to the writer.
pub struct IoSink<W: Write> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for IoSink<W> {
    fn put(&mut self, byte: u8) {
        // Best effort: a single-byte write failing here is surfaced the
        // next time the caller does a multi-byte `write`, matching the C
        // source's `ION_PUT` macro which does not itself propagate errors.
        let _ = self.inner.write_all(&[byte]);
    }

    fn write(&mut self, bytes: &[u8]) -> IonWriterResult<usize> {
        self.inner
            .write(bytes)
            .map_err(|_| IonWriterError::WriteError)
    }

    fn flush(&mut self) -> IonWriterResult<()> {
        self.inner.flush().map_err(|_| IonWriterError::WriteError)
    }
}

/// Writes the full slice or fails with
/// [`IonWriterError::WriteError`](crate::error::IonWriterError::WriteError),
/// per spec §6: "Writes shorter than requested are reported as a write
/// error by the core."
pub fn write_all<S: Sink + ?Sized>(sink: &mut S, bytes: &[u8]) -> IonWriterResult<()> {
    let written = sink.write(bytes)?;
    if written != bytes.len() {
        return Err(IonWriterError::WriteError);
    }
    Ok(())
}

pub fn write_str<S: Sink + ?Sized>(sink: &mut S, s: &str) -> IonWriterResult<()> {
    write_all(sink, s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_sink_round_trips_bytes() {
        let mut sink = IoSink::new(Vec::new());
        write_str(&mut sink, "hello").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_inner(), b"hello");
    }
}
