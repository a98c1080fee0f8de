// Pacer - A buffered Dogstatsd client for Rust!
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use rand::Rng;

/// Stochastic gate that decides whether a sampled metric is emitted.
///
/// Draws a fraction in `[0.0, 1.0)` from an injectable source, by default
/// the thread-local generator from the `rand` crate. The source does not
/// need to be cryptographically secure, only roughly uniform. Suppressed
/// metrics are indistinguishable from successfully sent ones at the API
/// boundary.
pub(crate) struct Sampler {
    source: Box<dyn FnMut() -> f64 + Send>,
}

impl Sampler {
    pub(crate) fn new() -> Sampler {
        Sampler::with_source(|| rand::thread_rng().gen())
    }

    pub(crate) fn with_source<F>(source: F) -> Sampler
    where
        F: FnMut() -> f64 + Send + 'static,
    {
        Sampler {
            source: Box::new(source),
        }
    }

    /// Decide whether a metric with the given rate should be emitted.
    ///
    /// Rates of 1.0 and above always emit without consuming a draw from
    /// the source, keeping call counts on the source deterministic for
    /// the common unsampled path.
    pub(crate) fn sample(&mut self, rate: f64) -> bool {
        if rate >= 1.0 {
            return true;
        }

        (self.source)() < rate
    }
}

#[cfg(test)]
mod tests {
    use super::Sampler;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_sampler_rate_of_one_skips_the_source() {
        let mut sampler = Sampler::with_source(|| panic!("source should not be drawn from"));
        assert!(sampler.sample(1.0));
    }

    #[test]
    fn test_sampler_emits_when_draw_below_rate() {
        let mut sampler = Sampler::with_source(|| 0.4);
        assert!(sampler.sample(0.5));
    }

    #[test]
    fn test_sampler_suppresses_when_draw_above_rate() {
        let mut sampler = Sampler::with_source(|| 0.6);
        assert!(!sampler.sample(0.5));
    }

    #[test]
    fn test_sampler_seeded_source_roughly_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut sampler = Sampler::with_source(move || rng.gen());

        let emitted = (0..1000).filter(|_| sampler.sample(0.5)).count();

        assert!(emitted > 400, "emitted {} of 1000 at rate 0.5", emitted);
        assert!(emitted < 600, "emitted {} of 1000 at rate 0.5", emitted);
    }
}
