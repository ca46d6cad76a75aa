//! Seeded uniform sampling for tree growers.
use crate::error::RandomError;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Owned random number generator.
///
/// There is no process-wide instance: whoever needs randomness owns a
/// `RandomState` (or borrows one mutably), so runs are reproducible from the seed alone.
#[derive(Clone, Debug)]
pub struct RandomState {
    rng: StdRng,
}

impl Default for RandomState {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomState {
    /// Creates a generator seeded from operating system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible generator from a seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws a real number from the uniform distribution on `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::EmptyRange`] when `low >= high` or the interval is not finite.
    pub fn uniform_real(&mut self, low: f64, high: f64) -> Result<f64, RandomError> {
        if low.is_nan() || high.is_nan() || low >= high || !(high - low).is_finite() {
            return Err(RandomError::EmptyRange { low, high });
        }
        Ok(self.rng.gen_range(low..high))
    }

    /// Draws an integer from the uniform distribution on `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::EmptyRange`] when `low >= high`.
    pub fn uniform_int(&mut self, low: i64, high: i64) -> Result<i64, RandomError> {
        if low >= high {
            return Err(RandomError::EmptyRange {
                low: low as f64,
                high: high as f64,
            });
        }
        Ok(self.rng.gen_range(low..high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_real_in_range() {
        let mut random_state = RandomState::with_seed(42);
        for _ in 0..1000 {
            let value = random_state.uniform_real(-2.0, 3.0).unwrap();
            assert!((-2.0..3.0).contains(&value));
        }
    }

    #[test]
    fn test_uniform_int_in_range() {
        let mut random_state = RandomState::new();
        let mut seen = [false; 5];
        for _ in 0..1000 {
            let value = random_state.uniform_int(10, 15).unwrap();
            assert!((10..15).contains(&value));
            seen[(value - 10) as usize] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn test_single_value_int_range() {
        let mut random_state = RandomState::with_seed(7);
        assert_eq!(random_state.uniform_int(4, 5).unwrap(), 4);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut first = RandomState::with_seed(1000);
        let mut second = RandomState::with_seed(1000);
        for _ in 0..20 {
            assert_eq!(
                first.uniform_real(0.0, 1.0).unwrap(),
                second.uniform_real(0.0, 1.0).unwrap()
            );
            assert_eq!(
                first.uniform_int(0, 100).unwrap(),
                second.uniform_int(0, 100).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_ranges() {
        let mut random_state = RandomState::default();
        assert_eq!(
            random_state.uniform_int(3, 3),
            Err(RandomError::EmptyRange {
                low: 3.0,
                high: 3.0
            })
        );
        assert!(random_state.uniform_real(1.0, 0.0).is_err());
        assert!(random_state.uniform_real(f64::NAN, 1.0).is_err());
    }
}
