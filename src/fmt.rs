// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt::{self, Write};

/// Type of metric that knows its wire suffix.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Set,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricType::Counter => "c".fmt(f),
            MetricType::Gauge => "g".fmt(f),
            MetricType::Histogram => "h".fmt(f),
            MetricType::Set => "s".fmt(f),
        }
    }
}

/// Holder for metric values that knows how to display itself.
///
/// Counters, gauges, and histograms carry signed integers while set
/// metrics carry an opaque string identifier.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MetricValue<'a> {
    Signed(i64),
    Text(&'a str),
}

impl fmt::Display for MetricValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Text(v) => v.fmt(f),
        }
    }
}

/// Formatter for rendering a single observation as a Dogstatsd line.
///
/// Lines have the form `[prefix]key:value|type[|@rate][|#tag1,tag2]`.
/// The sample rate suffix is only written for rates below 1.0 and the
/// tag suffix is only written when there is at least one tag. Global
/// tags come before per-call tags, both in the order given, with no
/// deduplication and no escaping.
#[derive(Debug, Clone)]
pub(crate) struct LineFormatter<'a> {
    prefix: &'a str,
    key: &'a str,
    val: MetricValue<'a>,
    type_: MetricType,
    rate: f64,
    global_tags: &'a [String],
    tags: &'a [&'a str],
}

impl<'a> LineFormatter<'a> {
    const TAG_PREFIX: &'static str = "|#";

    // "|@0.5" - rates are written with a single fractional digit
    const RATE_SIZE: usize = 5;

    pub(crate) fn new(prefix: &'a str, key: &'a str, val: MetricValue<'a>, type_: MetricType) -> Self {
        LineFormatter {
            prefix,
            key,
            val,
            type_,
            rate: 1.0,
            global_tags: &[],
            tags: &[],
        }
    }

    pub(crate) fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub(crate) fn with_tags(mut self, global_tags: &'a [String], tags: &'a [&'a str]) -> Self {
        self.global_tags = global_tags;
        self.tags = tags;
        self
    }

    fn num_tags(&self) -> usize {
        self.global_tags.len() + self.tags.len()
    }

    fn tag_size_hint(&self) -> usize {
        let count = self.num_tags();
        if count == 0 {
            return 0;
        }

        let kv_size: usize = self.global_tags.iter().map(String::len).sum::<usize>()
            + self.tags.iter().map(|t| t.len()).sum::<usize>();

        // prefix, keys and values, commas
        Self::TAG_PREFIX.len() + kv_size + count - 1
    }

    fn write_base_metric(&self, out: &mut String) {
        let _ = write!(out, "{}{}:{}|{}", self.prefix, self.key, self.val, self.type_);
    }

    fn write_rate(&self, out: &mut String) {
        if self.rate < 1.0 {
            let _ = write!(out, "|@{:.1}", self.rate);
        }
    }

    fn write_tags(&self, out: &mut String) {
        if self.num_tags() == 0 {
            return;
        }

        out.push_str(Self::TAG_PREFIX);
        let all_tags = self.global_tags.iter().map(String::as_str).chain(self.tags.iter().copied());
        for (i, tag) in all_tags.enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(tag);
        }
    }

    pub(crate) fn format(&self) -> String {
        let base_size = self.prefix.len() + self.key.len() + 1 /* : */ + 20 /* value */ + 1 /* | */ + 1; /* type */
        let size_hint = base_size + Self::RATE_SIZE + self.tag_size_hint();

        let mut line = String::with_capacity(size_hint);
        self.write_base_metric(&mut line);
        self.write_rate(&mut line);
        self.write_tags(&mut line);
        line
    }
}
