// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A buffered Dogstatsd client for Rust!
//!
//! Pacer is a low-overhead, fire-and-forget way to emit application
//! metrics (counters, gauges, histograms, and unique-event sets) over the
//! UDP Dogstatsd line protocol.
//!
//! ## Features
//!
//! * Counters, gauges, histograms, durations, and set metrics with
//!   Datadog style tags and per-call sample rates.
//! * A fixed capacity transmission buffer (512 bytes by default, safe for
//!   a small UDP packet) that batches metric lines into single datagrams.
//! * Thread safe: one client instance can be shared across your whole
//!   application.
//! * No delivery guarantees, retries, or acknowledgments by design. The
//!   transport is one-way and connectionless; errors surface
//!   synchronously on the call that hit them and nothing is re-sent.
//!
//! ## Usage
//!
//! Create one client per collector endpoint and share it for the lifetime
//! of the program:
//!
//! ```rust,no_run
//! use pacer::prelude::*;
//! use pacer::Client;
//!
//! let client = Client::connect(("metrics.example.com", pacer::DEFAULT_PORT)).unwrap();
//! client.set_prefix("myprogram");
//! client.set_tags(["env:stage", "program:myprogram"]);
//!
//! client.incr("count", &[]).unwrap();
//! client.gauge("memory", 512, &[]).unwrap();
//! client.histogram("payload.size", 2048, &["route:upload"]).unwrap();
//! client.unique("users", "user-42", &[]).unwrap();
//!
//! // sample a hot counter at 10%
//! client.count("requests", 1, 0.1, &[]).unwrap();
//!
//! // flush remaining buffered lines and release the socket
//! client.close().unwrap();
//! ```
//!
//! Metric lines are held in the transmission buffer until it can no
//! longer fit the next line, so low-volume applications should call
//! `flush` (or `close` on shutdown) if prompt delivery matters.
//!
//! ## Custom sinks
//!
//! Anything implementing `std::io::Write` can serve as the byte sink;
//! each flushed chunk arrives as one `write` call. This is how the
//! `SpyWriter` captures exact datagrams in tests:
//!
//! ```rust
//! use pacer::prelude::*;
//! use pacer::{Client, SpyWriter};
//!
//! let (rx, writer) = SpyWriter::new();
//! let client = Client::from_writer(writer);
//!
//! client.gauge("memory", 512, &[]).unwrap();
//! client.incr("count", &[]).unwrap();
//! client.flush().unwrap();
//!
//! assert_eq!(b"memory:512|g\ncount:1|c".to_vec(), rx.recv().unwrap());
//! ```
//!
//! ## Implemented traits
//!
//! Each metric type is emitted via its own trait (`Counted`, `Gauged`,
//! `Histogrammed`, `Uniqued`), combined in `MetricClient`, so the client
//! can be abstracted behind a trait object and swapped for a dummy in
//! unit tests. All of these are exported in the prelude module.

#![forbid(unsafe_code)]

pub const DEFAULT_PORT: u16 = 8125;

pub use self::client::{Client, ClientBuilder, Counted, Gauged, Histogrammed, MetricClient, Uniqued};

pub use self::spy::{NopWriter, SpyWriter};

pub use self::types::{ErrorKind, MetricError, MetricResult};

mod client;
mod fmt;
mod io;
mod net;
pub mod prelude;
mod sampler;
mod spy;
mod types;
