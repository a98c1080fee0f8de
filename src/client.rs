// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::io::Write;
use std::net::ToSocketAddrs;
use std::sync::Mutex;
use std::time::Duration;

use crate::fmt::{LineFormatter, MetricType, MetricValue};
use crate::io::{PacketWriter, DEFAULT_BUFFER_SIZE};
use crate::net::UdpWriter;
use crate::sampler::Sampler;
use crate::types::{ErrorKind, MetricError, MetricResult};

/// Trait for incrementing and decrementing counters.
///
/// The `count` method accepts a sample rate in `(0.0, 1.0]` that
/// determines the probability the observation is actually emitted; the
/// convenience wrappers all emit at rate 1.0. Tags are free-form strings,
/// conventionally `key:value`, passed as an ordered slice.
///
/// # Example
///
/// ```
/// use pacer::prelude::*;
/// use pacer::{Client, NopWriter};
///
/// let client = Client::from_writer(NopWriter);
///
/// client.incr("requests", &[]).unwrap();
/// client.decr("inflight", &["route:index"]).unwrap();
/// client.count("retries", 3, 0.5, &[]).unwrap();
/// ```
pub trait Counted {
    /// Emit a counter delta at the given sample rate.
    fn count(&self, key: &str, count: i64, rate: f64, tags: &[&str]) -> MetricResult<()>;

    /// Increment the counter by `count`.
    fn incr_by(&self, key: &str, count: i64, tags: &[&str]) -> MetricResult<()> {
        self.count(key, count, 1.0, tags)
    }

    /// Decrement the counter by `count`.
    fn decr_by(&self, key: &str, count: i64, tags: &[&str]) -> MetricResult<()> {
        self.count(key, -count, 1.0, tags)
    }

    /// Increment the counter by one.
    fn incr(&self, key: &str, tags: &[&str]) -> MetricResult<()> {
        self.incr_by(key, 1, tags)
    }

    /// Decrement the counter by one.
    fn decr(&self, key: &str, tags: &[&str]) -> MetricResult<()> {
        self.decr_by(key, 1, tags)
    }
}

/// Trait for recording gauge values.
pub trait Gauged {
    /// Record an absolute gauge value.
    fn gauge(&self, key: &str, value: i64, tags: &[&str]) -> MetricResult<()>;
}

/// Trait for recording histogram samples.
pub trait Histogrammed {
    /// Record a single sample of a distribution.
    fn histogram(&self, key: &str, value: i64, tags: &[&str]) -> MetricResult<()>;

    /// Record a duration as a histogram sample in milliseconds.
    /// Fractional milliseconds are truncated.
    fn duration(&self, key: &str, value: Duration, tags: &[&str]) -> MetricResult<()> {
        self.histogram(key, value.as_millis() as i64, tags)
    }
}

/// Trait for recording unique occurrences (set metrics).
pub trait Uniqued {
    /// Record a single occurrence of an event identified by an opaque
    /// string value. Counting distinct values within a time window is
    /// the collector's job, the client just reports them.
    fn unique(&self, key: &str, value: &str, tags: &[&str]) -> MetricResult<()>;
}

/// Trait that encompasses all of the per-metric-type traits.
///
/// Useful for passing a `Client` around as a trait object so it can be
/// swapped for a dummy implementation in unit tests.
///
/// # Example
///
/// ```
/// use pacer::prelude::*;
/// use pacer::{Client, MetricClient, NopWriter};
///
/// let client: Box<dyn MetricClient> = Box::new(Client::from_writer(NopWriter));
/// client.incr("some.event", &[]).unwrap();
/// ```
pub trait MetricClient: Counted + Gauged + Histogrammed + Uniqued {}

struct ClientState {
    prefix: String,
    tags: Vec<String>,
    sampler: Sampler,
    writer: Option<PacketWriter<Box<dyn Write + Send>>>,
}

/// Client for emitting Dogstatsd metrics over UDP or an arbitrary byte
/// sink.
///
/// One instance is created per collector endpoint and shared for the
/// lifetime of the program. Metric lines are accumulated in a fixed
/// capacity buffer, newline separated, and transmitted as a single
/// datagram when an incoming line no longer fits or when `flush` is
/// called. Emission is fire-and-forget: nothing is acknowledged, retried,
/// or queued for retransmission, and a failed flush drops the batch.
///
/// All state is guarded by a single mutex held for the full duration of
/// each call, so the client is safe to share across threads and lines
/// from concurrent callers never interleave within the buffer.
///
/// # Example
///
/// ```no_run
/// use pacer::prelude::*;
/// use pacer::Client;
///
/// let client = Client::connect("metrics.example.com:8125").unwrap();
/// client.set_prefix("myprogram");
/// client.set_tags(["env:stage"]);
///
/// client.incr("count", &[]).unwrap();
/// client.gauge("memory", 512, &[]).unwrap();
/// client.close().unwrap();
/// ```
///
/// For tests or non-network use, any `Write` implementation can serve as
/// the sink:
///
/// ```
/// use pacer::prelude::*;
/// use pacer::{Client, SpyWriter};
///
/// let (rx, writer) = SpyWriter::new();
/// let client = Client::from_writer(writer);
/// client.set_prefix("myprogram");
///
/// client.gauge("memory", 512, &[]).unwrap();
/// client.flush().unwrap();
///
/// assert_eq!(b"myprogram.memory:512|g".to_vec(), rx.recv().unwrap());
/// ```
pub struct Client {
    state: Mutex<ClientState>,
}

impl Client {
    /// Create a client that sends metrics to the given collector address
    /// over UDP, using the default 512 byte transmission buffer.
    ///
    /// # Failures
    ///
    /// This method may fail if the collector address cannot be resolved
    /// or a local socket cannot be bound.
    pub fn connect<A>(addr: A) -> MetricResult<Client>
    where
        A: ToSocketAddrs,
    {
        Self::connect_with_capacity(addr, DEFAULT_BUFFER_SIZE)
    }

    /// Create a client that sends metrics to the given collector address
    /// over UDP with a custom transmission buffer capacity in bytes.
    ///
    /// For guidance on sizing the buffer see the
    /// [Statsd docs](https://github.com/etsy/statsd/blob/master/docs/metric_types.md#multi-metric-packets).
    pub fn connect_with_capacity<A>(addr: A, capacity: usize) -> MetricResult<Client>
    where
        A: ToSocketAddrs,
    {
        let writer = UdpWriter::connect(addr)?;
        Ok(Self::builder(writer).capacity(capacity).build())
    }

    /// Create a client that writes to an arbitrary byte sink instead of
    /// a UDP socket, using the default buffer capacity. Each flushed
    /// chunk is handed to the sink as one `write` call.
    pub fn from_writer<W>(writer: W) -> Client
    where
        W: Write + Send + 'static,
    {
        Self::builder(writer).build()
    }

    /// Create a builder for a client with a custom buffer capacity or
    /// sampling source.
    ///
    /// # Example
    ///
    /// ```
    /// use pacer::{Client, NopWriter};
    ///
    /// let client = Client::builder(NopWriter)
    ///     .capacity(1432)
    ///     .random_source(|| 0.5)
    ///     .build();
    /// ```
    pub fn builder<W>(writer: W) -> ClientBuilder
    where
        W: Write + Send + 'static,
    {
        ClientBuilder::new(writer)
    }

    /// Set the prefix prepended to every metric name.
    ///
    /// The stored prefix always ends with exactly one `.` separator, no
    /// matter how many trailing separators the argument carries, so
    /// setting the same prefix twice never doubles it. An empty string
    /// clears the prefix. Replaces any previous prefix and applies only
    /// to subsequent calls.
    pub fn set_prefix(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.prefix = formatted_prefix(name);
    }

    /// Replace the global tags appended to every subsequent call's tags.
    ///
    /// Global tags are encoded before per-call tags, in the order given
    /// here. Setting tags is not additive across calls and not
    /// retroactive for already buffered lines.
    pub fn set_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock().unwrap();
        state.tags = tags.into_iter().map(Into::into).collect();
    }

    /// Force transmission of any buffered lines now.
    pub fn flush(&self) -> MetricResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.writer.as_mut() {
            Some(writer) => Ok(writer.flush()?),
            None => Err(closed_error()),
        }
    }

    /// Flush any buffered lines and release the underlying sink.
    ///
    /// A flush error takes precedence over releasing the sink, which
    /// cannot fail. Closing an already closed client is a no-op; any
    /// other operation on a closed client fails with `ErrorKind::Closed`.
    pub fn close(&self) -> MetricResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.writer.take() {
            Some(mut writer) => Ok(writer.flush()?),
            None => Ok(()),
        }
    }

    fn send(&self, key: &str, val: MetricValue<'_>, type_: MetricType, rate: f64, tags: &[&str]) -> MetricResult<()> {
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(MetricError::from((
                ErrorKind::InvalidInput,
                "sample rate must be in (0.0, 1.0]",
            )));
        }

        let mut state = self.state.lock().unwrap();
        let state = &mut *state;

        if !state.sampler.sample(rate) {
            return Ok(());
        }

        let line = LineFormatter::new(&state.prefix, key, val, type_)
            .with_rate(rate)
            .with_tags(&state.tags, tags)
            .format();

        match state.writer.as_mut() {
            Some(writer) => Ok(writer.write_line(line.as_bytes())?),
            None => Err(closed_error()),
        }
    }
}

impl Counted for Client {
    fn count(&self, key: &str, count: i64, rate: f64, tags: &[&str]) -> MetricResult<()> {
        self.send(key, MetricValue::Signed(count), MetricType::Counter, rate, tags)
    }
}

impl Gauged for Client {
    fn gauge(&self, key: &str, value: i64, tags: &[&str]) -> MetricResult<()> {
        self.send(key, MetricValue::Signed(value), MetricType::Gauge, 1.0, tags)
    }
}

impl Histogrammed for Client {
    fn histogram(&self, key: &str, value: i64, tags: &[&str]) -> MetricResult<()> {
        self.send(key, MetricValue::Signed(value), MetricType::Histogram, 1.0, tags)
    }
}

impl Uniqued for Client {
    fn unique(&self, key: &str, value: &str, tags: &[&str]) -> MetricResult<()> {
        self.send(key, MetricValue::Text(value), MetricType::Set, 1.0, tags)
    }
}

impl MetricClient for Client {}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        write!(
            f,
            "Client {{ prefix: {:?}, tags: {:?}, closed: {}, writer: ..., sampler: ... }}",
            state.prefix,
            state.tags,
            state.writer.is_none()
        )
    }
}

/// Builder for creating a `Client` with a custom transmission buffer
/// capacity or sampling source.
#[must_use]
pub struct ClientBuilder {
    writer: Box<dyn Write + Send>,
    capacity: usize,
    sampler: Sampler,
}

impl ClientBuilder {
    fn new<W>(writer: W) -> ClientBuilder
    where
        W: Write + Send + 'static,
    {
        ClientBuilder {
            writer: Box::new(writer),
            capacity: DEFAULT_BUFFER_SIZE,
            sampler: Sampler::new(),
        }
    }

    /// Set the transmission buffer capacity in bytes.
    pub fn capacity(self, capacity: usize) -> Self {
        Self { capacity, ..self }
    }

    /// Replace the random source used for sampling decisions.
    ///
    /// The source must return values in `[0.0, 1.0)`. Fixed-value
    /// sources make sampled paths deterministic in tests.
    pub fn random_source<F>(self, source: F) -> Self
    where
        F: FnMut() -> f64 + Send + 'static,
    {
        Self {
            sampler: Sampler::with_source(source),
            ..self
        }
    }

    /// Construct the configured `Client`. The prefix starts empty and
    /// there are no global tags; both can be set on the client afterward.
    pub fn build(self) -> Client {
        Client {
            state: Mutex::new(ClientState {
                prefix: String::new(),
                tags: Vec::new(),
                sampler: self.sampler,
                writer: Some(PacketWriter::new(self.writer, self.capacity)),
            }),
        }
    }
}

fn closed_error() -> MetricError {
    MetricError::from((ErrorKind::Closed, "client has been closed"))
}

fn formatted_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}.", prefix.trim_end_matches('.'))
    }
}
