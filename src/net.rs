// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::types::{ErrorKind, MetricError, MetricResult};

/// Attempt to convert anything implementing the `ToSocketAddrs` trait
/// into a concrete `SocketAddr` instance, returning an `InvalidInput`
/// error if the address could not be parsed.
fn get_addr<A: ToSocketAddrs>(addr: A) -> MetricResult<SocketAddr> {
    match addr.to_socket_addrs()?.next() {
        Some(addr) => Ok(addr),
        None => Err(MetricError::from((
            ErrorKind::InvalidInput,
            "No socket addresses yielded",
        ))),
    }
}

/// Adapter for writing to a `UdpSocket` via the `Write` trait.
///
/// Each call to `write` sends the entire buffer to the configured
/// address as a single datagram. Flushing is a no-op since datagrams
/// are not buffered at this layer.
#[derive(Debug)]
pub(crate) struct UdpWriter {
    addr: SocketAddr,
    socket: UdpSocket,
}

impl UdpWriter {
    /// Resolve the collector address and bind a local socket for it.
    ///
    /// The socket is left in blocking mode. UDP sends complete
    /// immediately in practice; callers that need timeouts or
    /// non-blocking behavior can configure their own socket and wrap
    /// it in a `Write` implementation instead.
    pub(crate) fn connect<A>(addr: A) -> MetricResult<UdpWriter>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(addr)?;
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(UdpWriter { addr, socket })
    }
}

impl Write for UdpWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket.send_to(buf, self.addr)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{get_addr, UdpWriter};
    use std::io::Write;

    #[test]
    fn test_get_addr_bad_address() {
        let res = get_addr("asdf");
        assert!(res.is_err());
    }

    #[test]
    fn test_get_addr_valid_address() {
        let res = get_addr("127.0.0.1:8125");
        assert!(res.is_ok());
    }

    #[test]
    fn test_udp_writer_single_datagram_per_write() {
        let mut writer = UdpWriter::connect("127.0.0.1:8125").unwrap();
        assert_eq!(7, writer.write(b"buz:1|c").unwrap());
    }
}
