use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

#[cfg(test)]
use mockall::automock;

/// Source of the gaussian noise used by the sampled pivot policy.
#[cfg_attr(test, automock)]
pub trait NoiseSource {
    /// Draws a sample from `N(0, 1)`.
    fn standard_normal(&mut self) -> f32;
}

/// Seedable standard normal noise.
#[derive(Clone, Debug)]
pub struct SeededNoise(StdRng);

impl SeededNoise {
    /// Creates a reproducible noise source.
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Creates a noise source seeded by the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Default for SeededNoise {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl NoiseSource for SeededNoise {
    fn standard_normal(&mut self) -> f32 {
        self.0.sample(StandardNormal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_noise() {
        let mut a = SeededNoise::from_seed(42);
        let mut b = SeededNoise::from_seed(42);

        for _ in 0..16 {
            assert_eq!(a.standard_normal(), b.standard_normal());
        }
    }

    #[test]
    fn test_noise_is_roughly_standard() {
        let mut noise = SeededNoise::from_seed(7);
        let samples = (0..10_000)
            .map(|_| noise.standard_normal())
            .collect::<Vec<_>>();

        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((variance - 1.).abs() < 0.1, "variance {}", variance);
    }
}
