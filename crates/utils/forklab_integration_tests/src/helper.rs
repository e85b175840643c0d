//! Helper utilities for integration tests.

use rand::distr::{Alphanumeric, SampleString as _};

/// Generates a random alphanumeric string of the specified length.
#[must_use]
pub fn random_str(len: usize) -> String {
    let mut rng = rand::rng();
    Alphanumeric.sample_string(&mut rng, len)
}
