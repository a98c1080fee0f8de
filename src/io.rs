// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, Write};

// Default size of the transmission buffer. This is a rather conservative
// value, picked to make sure the entire buffer fits in a small UDP packet.
// Users may want to use a different value based on the configuration of
// the network their application runs in.
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 512;

/// Buffered writer that batches metric lines into single writes to the
/// underlying `Write` implementation.
///
/// Lines within the buffer are separated by a newline character. The
/// separator is only written between lines, so a freshly flushed buffer
/// never starts with a newline and flushed chunks never carry a trailing
/// one. When an incoming line does not fit in the remaining capacity the
/// current contents are flushed first and the line becomes the sole
/// content of the buffer. Lines are never split or truncated.
///
/// A line longer than the total capacity can never be batched: existing
/// contents are flushed and the line is handed to the underlying writer
/// as a single oversized write, surfacing whatever error that produces.
///
/// The buffer is cleared exactly once per flush attempt, regardless of
/// the write outcome. A failed flush therefore drops the batch, matching
/// the fire-and-forget semantics of the underlying transport.
///
/// This type is not thread safe, serializing access is the caller's
/// responsibility.
#[derive(Debug)]
pub(crate) struct PacketWriter<T>
where
    T: Write,
{
    inner: T,
    buf: Vec<u8>,
    capacity: usize,
}

impl<T> PacketWriter<T>
where
    T: Write,
{
    pub(crate) fn new(inner: T, capacity: usize) -> PacketWriter<T> {
        PacketWriter {
            inner,
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Gets a reference to the underlying writer.
    #[allow(dead_code)]
    pub(crate) fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Number of bytes currently held in the buffer.
    #[allow(dead_code)]
    pub(crate) fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Append one complete metric line, flushing the current contents
    /// first if the line (plus its separator) would not fit.
    pub(crate) fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        if line.len() > self.capacity {
            self.flush()?;
            return self.inner.write_all(line);
        }

        let sep = usize::from(!self.buf.is_empty());
        if self.buf.len() + sep + line.len() > self.capacity {
            self.flush()?;
        }

        if !self.buf.is_empty() {
            self.buf.push(b'\n');
        }
        self.buf.extend_from_slice(line);
        Ok(())
    }

    /// Transmit all buffered bytes as one write to the underlying writer
    /// and clear the buffer. Flushing an empty buffer is a no-op.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        let res = self.inner.write_all(&self.buf);
        self.buf.clear();
        res
    }
}

impl<T> Drop for PacketWriter<T>
where
    T: Write,
{
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::PacketWriter;
    use std::io::{self, Write};
    use std::str;

    /// A writer that fails every write, for exercising error paths.
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "write refused"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lines_are_buffered_until_flush() {
        let mut writer = PacketWriter::new(vec![], 32);

        writer.write_line(b"abc:3|g").unwrap();
        writer.write_line(b"def:4|g").unwrap();
        assert_eq!(0, writer.get_ref().len());

        writer.flush().unwrap();
        assert_eq!("abc:3|g\ndef:4|g", str::from_utf8(writer.get_ref()).unwrap());
        assert_eq!(0, writer.buffered());
    }

    #[test]
    fn test_overflow_flushes_prior_contents_only() {
        let mut writer = PacketWriter::new(vec![], 16);

        writer.write_line(b"foo:1234|c").unwrap();
        assert_eq!(0, writer.get_ref().len());

        // 10 + 1 + 10 > 16 so the first line is flushed alone and the
        // second becomes the sole content of the buffer
        writer.write_line(b"baz:5678|c").unwrap();
        assert_eq!("foo:1234|c", str::from_utf8(writer.get_ref()).unwrap());
        assert_eq!(10, writer.buffered());
    }

    #[test]
    fn test_no_leading_newline_after_flush() {
        let mut writer = PacketWriter::new(vec![], 16);

        writer.write_line(b"foo:1234|c").unwrap();
        writer.write_line(b"baz:5678|c").unwrap();
        writer.flush().unwrap();

        assert_eq!("foo:1234|cbaz:5678|c", str::from_utf8(writer.get_ref()).unwrap());
    }

    #[test]
    fn test_line_equal_to_capacity_fits() {
        let mut writer = PacketWriter::new(vec![], 8);

        writer.write_line(b"foo:42|c").unwrap();
        assert_eq!(8, writer.buffered());
        assert_eq!(0, writer.get_ref().len());
    }

    #[test]
    fn test_line_bigger_than_capacity_bypasses_buffer() {
        let mut writer = PacketWriter::new(vec![], 16);

        writer.write_line(b"short:1|c").unwrap();
        writer.write_line(b"some_really_long_metric:456|c").unwrap();

        // prior contents flushed first, then the oversized line written
        // directly with no separator
        assert_eq!(
            "short:1|csome_really_long_metric:456|c",
            str::from_utf8(writer.get_ref()).unwrap()
        );
        assert_eq!(0, writer.buffered());
    }

    #[test]
    fn test_flush_empty_buffer_is_a_noop() {
        let mut writer = PacketWriter::new(vec![], 16);
        writer.flush().unwrap();
        assert_eq!(0, writer.get_ref().len());
    }

    #[test]
    fn test_flush_empty_buffer_succeeds_on_failing_writer() {
        let mut writer = PacketWriter::new(FailingWriter, 16);
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn test_failed_flush_clears_the_buffer() {
        let mut writer = PacketWriter::new(FailingWriter, 16);

        writer.write_line(b"foo:1|c").unwrap();
        assert!(writer.flush().is_err());
        assert_eq!(0, writer.buffered());

        // the batch was dropped, a second flush is an empty no-op
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn test_buffer_flushed_when_dropped() {
        let mut buf: Vec<u8> = vec![];

        {
            let mut writer = PacketWriter::new(&mut buf, 32);
            writer.write_line(b"something:1|c").unwrap();
            assert_eq!(0, writer.get_ref().len());
        }

        assert_eq!("something:1|c", str::from_utf8(&buf).unwrap());
    }
}
