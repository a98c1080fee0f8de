// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of Pacer for easy glob imports
//!
//! # Example
//!
//! ```
//! use pacer::prelude::*;
//! use pacer::{Client, NopWriter};
//!
//! let client = Client::from_writer(NopWriter);
//!
//! client.incr("some.counter", &[]).unwrap();
//! client.gauge("some.gauge", 45, &[]).unwrap();
//! client.histogram("some.histogram", 89, &[]).unwrap();
//! client.unique("some.set", "123", &[]).unwrap();
//! ```

pub use crate::client::{Counted, Gauged, Histogrammed, MetricClient, Uniqued};
