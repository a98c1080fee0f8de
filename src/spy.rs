// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use std::io::{self, Write};

/// `Write` implementation that sends a copy of each buffer written to it
/// to the `Sender` half of a channel while callers are given ownership of
/// the `Receiver` half.
///
/// This is not a general purpose writer, rather it's a writer meant for
/// verifying metrics emitted during the course of integration tests. One
/// `write` call surfaces as one message on the channel, mirroring how the
/// UDP adapter maps one write to one datagram, so tests can assert on
/// exact packet boundaries.
///
/// By default the channel used is unbounded. The channel size can be
/// limited using the `with_capacity` method.
#[derive(Debug)]
pub struct SpyWriter {
    sender: Sender<Vec<u8>>,
}

impl SpyWriter {
    pub fn new() -> (Receiver<Vec<u8>>, SpyWriter) {
        Self::with_queue_capacity(None)
    }

    pub fn with_capacity(queue: usize) -> (Receiver<Vec<u8>>, SpyWriter) {
        Self::with_queue_capacity(Some(queue))
    }

    fn with_queue_capacity(queue: Option<usize>) -> (Receiver<Vec<u8>>, SpyWriter) {
        let (tx, rx) = match queue {
            Some(sz) => bounded(sz),
            None => unbounded(),
        };

        (rx, SpyWriter { sender: tx })
    }
}

impl Write for SpyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.sender.try_send(buf.to_vec()) {
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(io::ErrorKind::Other, "channel disconnected")),
            Err(TrySendError::Full(_)) => Err(io::Error::new(io::ErrorKind::Other, "channel full")),
            Ok(()) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `Write` implementation that discards everything written to it.
///
/// Useful for disabling metric collection or unit tests.
#[derive(Debug, Clone, Default)]
pub struct NopWriter;

impl Write for NopWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NopWriter, SpyWriter};
    use std::io::Write;

    #[test]
    fn test_spy_writer_one_message_per_write() {
        let (rx, mut writer) = SpyWriter::new();
        writer.write_all(b"buz:1|c").unwrap();

        let sent = rx.recv().unwrap();
        assert_eq!(b"buz:1|c".as_slice(), sent.as_slice());
    }

    #[test]
    fn test_spy_writer_full_channel_is_an_error() {
        let (_rx, mut writer) = SpyWriter::with_capacity(1);

        assert!(writer.write(b"foo:1|c").is_ok());
        assert!(writer.write(b"foo:2|c").is_err());
    }

    #[test]
    fn test_spy_writer_disconnected_channel_is_an_error() {
        let (rx, mut writer) = SpyWriter::new();
        drop(rx);

        assert!(writer.write(b"foo:1|c").is_err());
    }

    #[test]
    fn test_nop_writer_accepts_everything() {
        let mut writer = NopWriter;
        assert_eq!(7, writer.write(b"baz:4|c").unwrap());
        assert!(writer.flush().is_ok());
    }
}
